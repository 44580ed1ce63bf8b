//! Snapshots carry everything needed to rebuild a [MaterialShape]: its extents, its dictionary
//! and its cells. Cell data is run length encoded, since most shapes are large runs of one
//! material. Encoding a snapshot to a file format is up to the caller

use crate::{
    material::{MaterialDictionary, VoxelMaterials, DEFAULT_MATERIAL_ID, EMPTY_MATERIAL_ID},
    shape::checked_extents,
    MaterialShape, Result, RunLength, Shape, ShapeError,
};

use bevy::{log::debug, prelude::IVec3};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// The cells of a snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotCells {
    /// Every set voxel has the material `id`, `set` holds a 1 for every set cell and a 0 otherwise
    Flood {
        /// The flood material id
        id: u16,
        /// Set state of every cell in index order
        set: RunLength,
    },
    /// The material id of every cell in index order, unset cells hold [EMPTY_MATERIAL_ID]
    PerVoxel(RunLength),
}

/// A serializable copy of a [MaterialShape]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialSnapshot<M> {
    /// The size of the x axis
    pub width: u32,
    /// The size of the y axis
    pub height: u32,
    /// The size of the z axis
    pub length: u32,
    /// The origin of the shape
    pub origin: [i32; 3],
    /// Every material in id order, the first one is the default material
    pub materials: Vec<M>,
    /// The voxels and their materials
    pub cells: SnapshotCells,
}

fn mismatch(reason: impl Into<String>) -> ShapeError {
    ShapeError::SnapshotMismatch(reason.into())
}

impl<M: Clone + Eq + Hash> MaterialShape<M> {
    /// Copy the shape, its dictionary and its materials into a snapshot
    pub fn snapshot(&self) -> MaterialSnapshot<M> {
        let shape = self.shape();
        let cells = match self.materials() {
            VoxelMaterials::Flood(id) => SnapshotCells::Flood {
                id: *id,
                set: RunLength::encode(
                    (0..shape.volume()).map(|idx| shape.get_index(idx) as u16),
                ),
            },
            VoxelMaterials::PerVoxel(ids) => {
                SnapshotCells::PerVoxel(RunLength::encode(ids.iter().enumerate().map(
                    |(idx, id)| match shape.get_index(idx) {
                        true if self.dictionary().get(*id).is_some() => *id,
                        true => DEFAULT_MATERIAL_ID,
                        false => EMPTY_MATERIAL_ID,
                    },
                )))
            }
        };

        MaterialSnapshot {
            width: shape.width(),
            height: shape.height(),
            length: shape.length(),
            origin: shape.origin().to_array(),
            materials: self.dictionary().iter().map(|(_, m)| m.clone()).collect(),
            cells,
        }
    }

    /// Rebuild a material shape from a snapshot, checking that the snapshot is consistent
    pub fn from_snapshot(snapshot: MaterialSnapshot<M>) -> Result<Self> {
        let [width, height, length] = checked_extents(
            snapshot.width as i64,
            snapshot.height as i64,
            snapshot.length as i64,
        )?;
        let mut shape = Shape::blank(width, height, length, IVec3::from(snapshot.origin));

        let mut materials = snapshot.materials.into_iter();
        let default_material = materials
            .next()
            .ok_or_else(|| mismatch("snapshot has no default material"))?;
        let mut dictionary = MaterialDictionary::new(default_material);
        for (expected, material) in (1..).zip(materials) {
            if dictionary.get_or_register(&material)? != expected {
                return Err(mismatch(format!("material {expected} is listed twice")));
            }
        }

        let cells = match snapshot.cells {
            SnapshotCells::Flood { id, set } => {
                if dictionary.get(id).is_none() {
                    return Err(mismatch(format!("unknown flood material id {id}")));
                }
                (set.expand(), Some(id))
            }
            SnapshotCells::PerVoxel(ids) => (ids.expand(), None),
        };
        let (values, flood) = cells;
        if values.len() != shape.volume() {
            return Err(mismatch(format!(
                "expected {} cells, got {}",
                shape.volume(),
                values.len()
            )));
        }

        let materials = match flood {
            Some(id) => {
                for (idx, value) in values.iter().enumerate() {
                    match value {
                        0 => {}
                        1 => shape.set_index(idx, true),
                        other => return Err(mismatch(format!("invalid set flag {other}"))),
                    }
                }
                VoxelMaterials::Flood(id)
            }
            None => {
                for (idx, id) in values.iter().enumerate() {
                    if *id == EMPTY_MATERIAL_ID {
                        continue;
                    }
                    if dictionary.get(*id).is_none() {
                        return Err(mismatch(format!("unknown material id {id}")));
                    }
                    shape.set_index(idx, true);
                }
                VoxelMaterials::PerVoxel(values)
            }
        };

        debug!(
            "restored {}x{}x{} material shape with {} materials",
            width,
            height,
            length,
            dictionary.len()
        );
        Ok(MaterialShape::from_parts(shape, dictionary, materials))
    }
}

#[cfg(test)]
fn sample() -> MaterialShape<String> {
    let mut shape = Shape::with_origin(3, 2, 3, IVec3::new(1, 0, 1)).unwrap();
    shape.invert();
    shape.unset(0, 1, 0, true).unwrap();
    MaterialShape::new(shape, "stone".to_string())
}

#[test]
fn test_flood_snapshot_round_trip() {
    let mut materials = sample();
    materials.flood(&"dirt".to_string()).unwrap();

    let snapshot = materials.snapshot();
    assert!(matches!(snapshot.cells, SnapshotCells::Flood { id: 1, .. }));
    assert_eq!(vec!["stone".to_string(), "dirt".to_string()], snapshot.materials);

    let restored = MaterialShape::from_snapshot(snapshot).unwrap();
    assert!(restored.is_flooded());
    assert_eq!(materials.shape(), restored.shape());
    assert_eq!(
        Some(&"dirt".to_string()),
        restored.get_material(1, 0, 1, true).unwrap()
    );
    assert_eq!(None, restored.get_material(0, 1, 0, true).unwrap());
}

#[test]
fn test_per_voxel_snapshot_round_trip() {
    let mut materials = sample();
    materials
        .set_material(-1, 0, -1, true, &"glass".to_string())
        .unwrap();
    materials
        .set_horizontal_layer(&"sand".to_string(), 1, 1)
        .unwrap();

    let snapshot = materials.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: MaterialSnapshot<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot, decoded);

    let restored = MaterialShape::from_snapshot(decoded).unwrap();
    assert_eq!(materials.shape(), restored.shape());
    for pos in materials.shape().get_shape() {
        assert_eq!(
            materials.get_material(pos.x, pos.y, pos.z, true).unwrap(),
            restored.get_material(pos.x, pos.y, pos.z, true).unwrap()
        );
    }
    assert_eq!(
        Some(&"glass".to_string()),
        restored.get_material(-1, 0, -1, true).unwrap()
    );
    assert_eq!(materials.dictionary().len(), restored.dictionary().len());
}

#[test]
fn test_snapshot_rejects_inconsistent_data() {
    let snapshot = sample().snapshot();

    let mut short = snapshot.clone();
    short.cells = SnapshotCells::PerVoxel(RunLength::repeat(0, 5));
    assert!(matches!(
        MaterialShape::from_snapshot(short),
        Err(ShapeError::SnapshotMismatch(_))
    ));

    let mut unknown = snapshot.clone();
    unknown.cells = SnapshotCells::PerVoxel(RunLength::repeat(4, 18));
    assert!(MaterialShape::from_snapshot(unknown).is_err());

    let mut duplicate = snapshot.clone();
    duplicate.materials.push("stone".to_string());
    assert!(MaterialShape::from_snapshot(duplicate).is_err());

    let mut empty = snapshot;
    empty.materials.clear();
    assert!(MaterialShape::from_snapshot(empty).is_err());
}

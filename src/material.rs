//! This module attaches materials to the voxels of a [Shape].
//!
//! Materials are stored as small ids that index into a [MaterialDictionary]. A [MaterialShape]
//! starts out in flood mode, where every set voxel shares one material and no per voxel ids are
//! stored. The first write that needs per voxel granularity complexifies it: the id array is
//! allocated and a shared backing shape is copied into a private one.

use crate::{shape::checked_extents, Result, Shape, ShapeError};

use bevy::{
    log::{debug, trace},
    prelude::IVec3,
    utils::HashMap,
};
use std::{hash::Hash, sync::Arc};

/// The id of the material a [MaterialShape] was created with
pub const DEFAULT_MATERIAL_ID: u16 = 0;
/// The per voxel id of a cell that has no material, it reads back as the default material
pub const EMPTY_MATERIAL_ID: u16 = u16::MAX;
/// The highest id the dictionary hands out
pub const MAX_MATERIAL_ID: u16 = u16::MAX - 1;

/// A bijection between material ids and materials. Ids are handed out in increasing order and
/// never reused, id 0 is the default material
#[derive(Clone, Debug)]
pub struct MaterialDictionary<M> {
    materials: Vec<M>,
    ids: HashMap<M, u16>,
}

impl<M: Clone + Eq + Hash> MaterialDictionary<M> {
    /// Create a dictionary holding only the default material
    pub fn new(default_material: M) -> Self {
        let mut ids = HashMap::default();
        ids.insert(default_material.clone(), DEFAULT_MATERIAL_ID);
        Self {
            materials: vec![default_material],
            ids,
        }
    }

    /// The material for an id
    pub fn get(&self, id: u16) -> Option<&M> {
        self.materials.get(id as usize)
    }

    /// The id of a material, if it has one
    pub fn id_of(&self, material: &M) -> Option<u16> {
        self.ids.get(material).copied()
    }

    /// The id of a material, allocating the next free id if the material is new
    pub fn get_or_register(&mut self, material: &M) -> Result<u16> {
        if let Some(id) = self.id_of(material) {
            return Ok(id);
        }
        if self.materials.len() > MAX_MATERIAL_ID as usize {
            return Err(ShapeError::DictionaryFull);
        }

        let id = self.materials.len() as u16;
        self.materials.push(material.clone());
        self.ids.insert(material.clone(), id);
        trace!("registered material id {}", id);
        Ok(id)
    }

    /// The number of registered materials, the default material included
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Always false, the default material is registered on creation
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterate over every id and its material, in id order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &M)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(id, material)| (id as u16, material))
    }
}

/// How the materials of a [MaterialShape] are stored
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoxelMaterials {
    /// Every set voxel has the material with this id
    Flood(u16),
    /// One id per cell, in [Shape::index_of] order. [EMPTY_MATERIAL_ID] marks a cleared cell
    PerVoxel(Vec<u16>),
}

/// The shape a [MaterialShape] paints on. A shared shape is copied before the first write
#[derive(Clone, Debug)]
pub enum Backing {
    /// A shape that may be used elsewhere, it is never written to
    Shared(Arc<Shape>),
    /// A private shape that is mutated in place
    Owned(Shape),
}

impl Backing {
    fn get(&self) -> &Shape {
        match self {
            Backing::Shared(shape) => shape.as_ref(),
            Backing::Owned(shape) => shape,
        }
    }

    fn make_mut(&mut self) -> &mut Shape {
        if let Backing::Shared(shape) = self {
            trace!("copying shared shape before the first write");
            *self = Backing::Owned(shape.as_ref().clone());
        }
        match self {
            Backing::Owned(shape) => shape,
            Backing::Shared(shape) => Arc::make_mut(shape),
        }
    }
}

/// A [Shape] with a material for every set voxel
#[derive(Clone, Debug)]
pub struct MaterialShape<M> {
    shape: Backing,
    dictionary: MaterialDictionary<M>,
    materials: VoxelMaterials,
}

impl<M: Clone + Eq + Hash> MaterialShape<M> {
    /// Wrap a shape, flooded with the default material
    pub fn new(shape: Shape, default_material: M) -> Self {
        Self::with_backing(Backing::Owned(shape), default_material)
    }

    /// Wrap a shared shape. It is copied the first time a voxel is set or unset
    pub fn from_shared(shape: Arc<Shape>, default_material: M) -> Self {
        Self::with_backing(Backing::Shared(shape), default_material)
    }

    fn with_backing(shape: Backing, default_material: M) -> Self {
        Self {
            shape,
            dictionary: MaterialDictionary::new(default_material),
            materials: VoxelMaterials::Flood(DEFAULT_MATERIAL_ID),
        }
    }

    pub(crate) fn from_parts(
        shape: Shape,
        dictionary: MaterialDictionary<M>,
        materials: VoxelMaterials,
    ) -> Self {
        Self {
            shape: Backing::Owned(shape),
            dictionary,
            materials,
        }
    }

    /// The shape holding which voxels are set
    pub fn shape(&self) -> &Shape {
        self.shape.get()
    }

    /// Returns true while the backing shape is still shared with someone else
    pub fn is_shared(&self) -> bool {
        matches!(self.shape, Backing::Shared(_))
    }

    /// The id to material mapping
    pub fn dictionary(&self) -> &MaterialDictionary<M> {
        &self.dictionary
    }

    /// How materials are currently stored
    pub fn materials(&self) -> &VoxelMaterials {
        &self.materials
    }

    /// The material the shape was created with
    pub fn default_material(&self) -> &M {
        &self.dictionary.materials[DEFAULT_MATERIAL_ID as usize]
    }

    /// Returns true while every set voxel shares one material without per voxel storage
    pub fn is_flooded(&self) -> bool {
        matches!(self.materials, VoxelMaterials::Flood(_))
    }

    /// The id of an existing material, or a new id for a new material
    pub fn get_or_register_material(&mut self, material: &M) -> Result<u16> {
        self.dictionary.get_or_register(material)
    }

    /// The material id of a voxel, or None if the voxel is not set
    pub fn material_id(&self, x: i32, y: i32, z: i32, relative: bool) -> Result<Option<u16>> {
        let shape = self.shape();
        let idx = shape.index_of(x, y, z, relative)?;
        if !shape.get_index(idx) {
            return Ok(None);
        }

        let id = match &self.materials {
            VoxelMaterials::Flood(id) => *id,
            VoxelMaterials::PerVoxel(ids) => ids[idx],
        };
        if self.dictionary.get(id).is_none() {
            // Cleared cells read back as the default material
            return Ok(Some(DEFAULT_MATERIAL_ID));
        }
        Ok(Some(id))
    }

    /// The material of a voxel, or None if the voxel is not set
    pub fn get_material(&self, x: i32, y: i32, z: i32, relative: bool) -> Result<Option<&M>> {
        let id = self.material_id(x, y, z, relative)?;
        Ok(id.and_then(|id| self.dictionary.get(id)))
    }

    /// Switch to per voxel ids and hand the shape and ids to `write`
    fn complexify(&mut self, write: impl FnOnce(&mut Shape, &mut [u16])) {
        let shape = self.shape.make_mut();
        let flood = VoxelMaterials::Flood(DEFAULT_MATERIAL_ID);
        let mut ids = match std::mem::replace(&mut self.materials, flood) {
            VoxelMaterials::PerVoxel(ids) => ids,
            VoxelMaterials::Flood(id) => {
                trace!("allocating material ids for {} cells", shape.volume());
                vec![id; shape.volume()]
            }
        };
        write(shape, &mut ids);
        self.materials = VoxelMaterials::PerVoxel(ids);
    }

    /// Set a voxel and give it a material
    pub fn set_material(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        relative: bool,
        material: &M,
    ) -> Result<()> {
        let idx = self.shape().index_of(x, y, z, relative)?;
        let id = self.dictionary.get_or_register(material)?;

        self.complexify(|shape, ids| {
            ids[idx] = id;
            shape.set_index(idx, true);
        });
        Ok(())
    }

    /// Unset a voxel and clear its material
    pub fn unset_material(&mut self, x: i32, y: i32, z: i32, relative: bool) -> Result<()> {
        let idx = self.shape().index_of(x, y, z, relative)?;

        self.complexify(|shape, ids| {
            ids[idx] = EMPTY_MATERIAL_ID;
            shape.set_index(idx, false);
        });
        Ok(())
    }

    /// Give every set voxel the same material and drop the per voxel ids
    pub fn flood(&mut self, material: &M) -> Result<()> {
        let id = self.dictionary.get_or_register(material)?;
        debug!("flooding shape with material id {}", id);
        self.materials = VoxelMaterials::Flood(id);
        Ok(())
    }

    /// Assign a material to every cell of the y layers `y..y + height`, set or not. Voxels keep
    /// their set state
    pub fn set_horizontal_layer(&mut self, material: &M, y: u32, height: u32) -> Result<()> {
        let shape = self.shape();
        let end = y as u64 + height as u64;
        if end > shape.height() as u64 {
            return Err(ShapeError::OutOfBounds {
                x: 0,
                y: end as i64 - 1,
                z: 0,
                width: shape.width(),
                height: shape.height(),
                length: shape.length(),
            });
        }
        if height == 0 {
            return Ok(());
        }
        let layer = shape.width() as usize * shape.length() as usize;
        let id = self.dictionary.get_or_register(material)?;

        self.complexify(|_, ids| ids[y as usize * layer..end as usize * layer].fill(id));
        debug!("filled layers {}..{} with material id {}", y, end, id);
        Ok(())
    }

    /// Flood the shape with the default material again
    pub fn reset(&mut self) {
        self.materials = VoxelMaterials::Flood(DEFAULT_MATERIAL_ID);
    }

    /// Resize the backing shape like [Shape::resize]. Per voxel ids move along with their voxels
    pub fn resize(&mut self, width: u32, height: u32, length: u32, origin: IVec3) -> Result<()> {
        let [width, height, length] = checked_extents(width as i64, height as i64, length as i64)?;

        let old = self.shape().clone();
        let shape = self.shape.make_mut();
        shape.resize(width, height, length, origin)?;

        if let VoxelMaterials::PerVoxel(ids) = &self.materials {
            let mut moved = vec![EMPTY_MATERIAL_ID; shape.volume()];
            for (idx, id) in ids.iter().enumerate() {
                let rel = old.position_of(idx) - old.origin();
                if let Ok(new_idx) = shape.index_of(rel.x, rel.y, rel.z, true) {
                    moved[new_idx] = *id;
                }
            }
            self.materials = VoxelMaterials::PerVoxel(moved);
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Block {
    Stone,
    Glass,
    Dirt,
}

#[cfg(test)]
fn filled(width: u32, height: u32, length: u32) -> Shape {
    let mut shape = Shape::new(width, height, length).unwrap();
    shape.invert();
    shape
}

#[test]
fn test_cuboid_scenario() {
    let mut shape = Shape::with_origin(3, 3, 3, IVec3::ONE).unwrap();
    shape.invert();
    let mut materials = MaterialShape::new(shape, Block::Stone);

    materials.set_material(0, 0, 0, false, &Block::Glass).unwrap();
    assert_eq!(Some(&Block::Glass), materials.get_material(0, 0, 0, false).unwrap());
    assert_eq!(Some(&Block::Stone), materials.get_material(1, 1, 1, false).unwrap());
    assert_eq!(27, materials.shape().get_shape().len());
}

#[test]
fn test_flood_never_allocates_ids() {
    let mut materials = MaterialShape::new(filled(4, 4, 4), Block::Stone);
    materials.flood(&Block::Dirt).unwrap();

    for pos in materials.shape().get_shape() {
        assert_eq!(
            Some(&Block::Dirt),
            materials.get_material(pos.x, pos.y, pos.z, true).unwrap()
        );
    }
    assert!(materials.is_flooded());
    assert_eq!(&VoxelMaterials::Flood(1), materials.materials());
}

#[test]
fn test_unset_voxel_has_no_material() {
    let mut shape = Shape::new(2, 1, 1).unwrap();
    shape.set(0, 0, 0, false).unwrap();
    let mut materials = MaterialShape::new(shape, Block::Stone);

    assert_eq!(None, materials.get_material(1, 0, 0, false).unwrap());
    materials.unset_material(0, 0, 0, false).unwrap();
    assert_eq!(None, materials.get_material(0, 0, 0, false).unwrap());
    assert!(!materials.shape().get(0, 0, 0, false).unwrap());
}

#[test]
fn test_cleared_cell_reads_as_default() {
    let mut materials = MaterialShape::new(filled(2, 1, 1), Block::Stone);
    materials.set_material(0, 0, 0, false, &Block::Glass).unwrap();
    materials.unset_material(0, 0, 0, false).unwrap();

    // Set the cell behind the material shape's back, the cleared id is still stored
    if let Backing::Owned(shape) = &mut materials.shape {
        shape.set(0, 0, 0, false).unwrap();
    }
    assert_eq!(Some(DEFAULT_MATERIAL_ID), materials.material_id(0, 0, 0, false).unwrap());
    assert_eq!(Some(&Block::Stone), materials.get_material(0, 0, 0, false).unwrap());
}

#[test]
fn test_material_ids_are_stable() {
    let mut materials = MaterialShape::new(filled(2, 2, 2), Block::Stone);
    let first = materials.get_or_register_material(&Block::Glass).unwrap();
    let size = materials.dictionary().len();
    let second = materials.get_or_register_material(&Block::Glass).unwrap();

    assert_eq!(first, second);
    assert_eq!(size, materials.dictionary().len());
    assert_eq!(DEFAULT_MATERIAL_ID, materials.get_or_register_material(&Block::Stone).unwrap());

    materials.set_material(1, 1, 1, false, &Block::Glass).unwrap();
    materials.set_material(0, 1, 1, false, &Block::Glass).unwrap();
    assert_eq!(2, materials.dictionary().len());
    assert_eq!(
        vec![(0, &Block::Stone), (1, &Block::Glass)],
        materials.dictionary().iter().collect::<Vec<_>>()
    );
}

#[test]
fn test_complexify_keeps_flood_material() {
    let mut materials = MaterialShape::new(filled(2, 2, 1), Block::Stone);
    materials.flood(&Block::Dirt).unwrap();
    materials.set_material(0, 0, 0, false, &Block::Glass).unwrap();

    assert!(!materials.is_flooded());
    assert_eq!(Some(&Block::Dirt), materials.get_material(1, 1, 0, false).unwrap());
    assert_eq!(Some(&Block::Glass), materials.get_material(0, 0, 0, false).unwrap());
}

#[test]
fn test_set_material_sets_voxel() {
    let shape = Shape::with_origin(3, 1, 3, IVec3::new(1, 0, 1)).unwrap();
    let mut materials = MaterialShape::new(shape, Block::Stone);
    materials.set_material(-1, 0, 1, true, &Block::Glass).unwrap();

    assert_eq!(vec![IVec3::new(-1, 0, 1)], materials.shape().get_shape());
    assert_eq!(Some(&Block::Glass), materials.get_material(0, 0, 2, false).unwrap());
}

#[test]
fn test_out_of_bounds_leaves_state_untouched() {
    let mut materials = MaterialShape::new(filled(2, 2, 2), Block::Stone);

    assert!(matches!(
        materials.set_material(2, 0, 0, false, &Block::Glass),
        Err(ShapeError::OutOfBounds { .. })
    ));
    assert!(materials.unset_material(0, 0, -1, false).is_err());
    assert!(materials.get_material(0, 5, 0, false).is_err());
    assert!(materials.is_flooded());
    assert_eq!(1, materials.dictionary().len());
}

#[test]
fn test_shared_shape_is_copied_on_write() {
    let shared = Arc::new(filled(2, 1, 1));
    let mut materials = MaterialShape::from_shared(shared.clone(), Block::Stone);
    assert!(materials.is_shared());

    materials.flood(&Block::Dirt).unwrap();
    assert!(materials.is_shared());

    materials.unset_material(0, 0, 0, false).unwrap();
    assert!(!materials.is_shared());
    assert!(shared.get(0, 0, 0, false).unwrap());
    assert!(!materials.shape().get(0, 0, 0, false).unwrap());
}

#[test]
fn test_horizontal_layer() {
    let mut materials = MaterialShape::new(filled(2, 3, 2), Block::Stone);
    materials.set_horizontal_layer(&Block::Glass, 1, 2).unwrap();

    for x in 0..2 {
        for z in 0..2 {
            assert_eq!(Some(&Block::Stone), materials.get_material(x, 0, z, false).unwrap());
            assert_eq!(Some(&Block::Glass), materials.get_material(x, 1, z, false).unwrap());
            assert_eq!(Some(&Block::Glass), materials.get_material(x, 2, z, false).unwrap());
        }
    }
    assert!(materials.set_horizontal_layer(&Block::Dirt, 2, 2).is_err());
    assert_eq!(2, materials.dictionary().len());
}

#[test]
fn test_reset_floods_default() {
    let mut materials = MaterialShape::new(filled(2, 2, 2), Block::Stone);
    materials.set_material(0, 0, 0, false, &Block::Glass).unwrap();
    materials.reset();

    assert!(materials.is_flooded());
    assert_eq!(Some(&Block::Stone), materials.get_material(0, 0, 0, false).unwrap());
    // Ids are never reclaimed
    assert_eq!(Some(1), materials.dictionary().id_of(&Block::Glass));
}

#[test]
fn test_resize_moves_materials() {
    let mut materials = MaterialShape::new(filled(2, 1, 1), Block::Stone);
    materials.set_material(1, 0, 0, false, &Block::Glass).unwrap();

    materials.resize(3, 1, 1, IVec3::new(1, 0, 0)).unwrap();
    assert_eq!(Some(&Block::Glass), materials.get_material(1, 0, 0, true).unwrap());
    assert_eq!(Some(&Block::Stone), materials.get_material(0, 0, 0, true).unwrap());
    assert_eq!(None, materials.get_material(-1, 0, 0, true).unwrap());
    assert!(materials.resize(3, 0, 1, IVec3::ZERO).is_err());
}

#[test]
fn test_dictionary_full() {
    let mut dictionary = MaterialDictionary::new(0u32);
    let mut last = DEFAULT_MATERIAL_ID;
    for material in 1..=MAX_MATERIAL_ID as u32 {
        last = dictionary.get_or_register(&material).unwrap();
    }
    assert_eq!(MAX_MATERIAL_ID, last);
    assert_eq!(MAX_MATERIAL_ID as usize + 1, dictionary.len());

    assert_eq!(
        Err(ShapeError::DictionaryFull),
        dictionary.get_or_register(&(u16::MAX as u32))
    );
    assert_eq!(None, dictionary.id_of(&(u16::MAX as u32)));
    // Known materials still resolve once the dictionary is full
    assert_eq!(Ok(7), dictionary.get_or_register(&7));
    assert_eq!(Ok(DEFAULT_MATERIAL_ID), dictionary.get_or_register(&0));
    assert_eq!(MAX_MATERIAL_ID as usize + 1, dictionary.len());
}

#[test]
fn test_empty_horizontal_layer_is_a_no_op() {
    let mut materials = MaterialShape::new(filled(2, 3, 2), Block::Stone);
    materials.set_horizontal_layer(&Block::Glass, 1, 0).unwrap();
    materials.set_horizontal_layer(&Block::Glass, 3, 0).unwrap();

    assert!(materials.is_flooded());
    assert_eq!(1, materials.dictionary().len());
    assert_eq!(None, materials.dictionary().id_of(&Block::Glass));
    assert!(materials.set_horizontal_layer(&Block::Glass, 4, 0).is_err());
}

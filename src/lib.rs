//! This crate holds the shape and material engine for voxel editing brushes.
//! Brushes build a [Shape] with the [factory], combine shapes with CSG operators and wrap the
//! result in a [MaterialShape] to decide what every voxel is made of. Writing the result into a
//! world is left to the caller, who walks [Shape::get_shape] and asks for each voxel's material.
//!
//! A shape is a bounded box of set and unset voxels with an origin. It is packed one bit per voxel,
//! and materials are stored as 16 bit ids next to it. A material shape that only uses one
//! material stores no per voxel ids at all.
//!
//! Positions are [IVec3](bevy::prelude::IVec3) values.

#![warn(missing_docs)]

mod error;
pub use error::{Result, ShapeError};

pub mod direction;
pub use direction::{Axis, Direction};

mod shape;
pub use shape::Shape;

pub mod factory;
pub use factory::{Primitive, ShapeGenerator};

pub mod material;
pub use material::{
    MaterialDictionary, MaterialShape, VoxelMaterials, DEFAULT_MATERIAL_ID, EMPTY_MATERIAL_ID,
};

mod rle;
pub use rle::RunLength;

mod snapshot;
pub use snapshot::{MaterialSnapshot, SnapshotCells};

pub mod validation;

#[test]
fn test_cuboid_brush_end_to_end() {
    let shape = factory::create_cuboid(1., 1., 1.).unwrap();
    assert_eq!(bevy::prelude::IVec3::ONE, shape.origin());

    let mut materials = MaterialShape::new(shape, "stone");
    materials.set_material(0, 0, 0, false, &"glass").unwrap();
    assert_eq!(Some(&"glass"), materials.get_material(0, 0, 0, false).unwrap());
    assert_eq!(Some(&"stone"), materials.get_material(1, 1, 1, false).unwrap());
    assert_eq!(27, materials.shape().get_shape().len());
}

#[test]
fn test_hollow_sphere_brush() {
    let mut shell = factory::create_sphere(3.).unwrap();
    let mut core = factory::create_sphere(2.).unwrap();
    let outer = shell.count();
    shell.subtract(&mut core).unwrap();

    // The core was grown to the shell's bounds
    assert_eq!(shell.origin(), core.origin());
    assert_eq!(outer - core.count(), shell.count());
    assert!(!shell.get(0, 0, 0, true).unwrap());
    assert!(shell.get(3, 0, 0, true).unwrap());

    let mut materials = MaterialShape::new(shell, "stone");
    materials.set_horizontal_layer(&"moss", 5, 2).unwrap();
    let positions = materials.shape().get_shape();
    assert_eq!(materials.shape().count(), positions.len());
    for pos in positions {
        let material = materials.get_material(pos.x, pos.y, pos.z, true).unwrap();
        match pos.y {
            2 | 3 => assert_eq!(Some(&"moss"), material),
            _ => assert_eq!(Some(&"stone"), material),
        }
    }
    assert_eq!(None, materials.get_material(0, 0, 0, true).unwrap());
    assert!(materials.get_material(0, 4, 0, true).is_err());
}

//! This module builds the canonical brush shapes.
//!
//! Every builder returns a fresh [Shape] with its origin at the center of the shape (or at the
//! base, along the extruded axis of a cylinder). Round shapes test one octant or quadrant and
//! mirror the result. A voxel at offset `(x, y, z)` is set iff
//! `(x/rx)² + (y/ry)² + (z/rz)² <= 1`

use crate::{
    direction::{Axis, Direction},
    shape::checked_extents,
    Result, Shape, ShapeError,
};

use bevy::prelude::IVec3;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// A trait for anything that can build a [Shape]
#[enum_dispatch]
pub trait ShapeGenerator {
    /// Build a new shape
    fn generate(&self) -> Result<Shape>;
}

/// An enum with the primitive shapes, used to store a brush choice as data without Box or dynamic
/// dispatch
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[enum_dispatch(ShapeGenerator)]
pub enum Primitive {
    /// A box
    Cuboid(Cuboid),
    /// An ellipsoid, or a sphere when all radii match
    Ellipsoid(Ellipsoid),
    /// An extruded ellipse
    EllipticalCylinder(EllipticalCylinder),
}

/// A completely filled box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Radius along x, rounded down
    pub rx: f64,
    /// Radius along y, rounded down
    pub ry: f64,
    /// Radius along z, rounded down
    pub rz: f64,
}

impl ShapeGenerator for Cuboid {
    fn generate(&self) -> Result<Shape> {
        create_cuboid(self.rx, self.ry, self.rz)
    }
}

/// An ellipsoid
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Radius along x
    pub rx: f64,
    /// Radius along y
    pub ry: f64,
    /// Radius along z
    pub rz: f64,
}

impl ShapeGenerator for Ellipsoid {
    fn generate(&self) -> Result<Shape> {
        create_ellipsoid(self.rx, self.ry, self.rz)
    }
}

/// An ellipse extruded along the axis of a direction
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EllipticalCylinder {
    /// Radius along the first axis that is not extruded (in x, y, z order)
    pub rx: f64,
    /// Radius along the second axis that is not extruded
    pub ry: f64,
    /// Number of layers along the extruded axis
    pub height: u32,
    /// Picks the extruded axis
    pub direction: Direction,
}

impl ShapeGenerator for EllipticalCylinder {
    fn generate(&self) -> Result<Shape> {
        create_elliptical_cylinder(self.rx, self.ry, self.height, self.direction)
    }
}

fn checked_radius(radius: f64) -> Result<f64> {
    if radius.is_finite() && (0.0..=u32::MAX as f64).contains(&radius) {
        Ok(radius)
    } else {
        Err(ShapeError::InvalidRadius(radius))
    }
}

fn floor_radius(radius: f64) -> Result<u32> {
    Ok(checked_radius(radius)?.floor() as u32)
}

fn ceil_radius(radius: f64) -> Result<u32> {
    Ok(checked_radius(radius)?.ceil() as u32)
}

fn diameter(radius: u32) -> i64 {
    radius as i64 * 2 + 1
}

/// The squared share of `radius` an offset uses up. A zero radius only holds the center
#[inline(always)]
fn term(offset: u32, radius: f64) -> f64 {
    if offset == 0 {
        return 0.;
    }
    let t = offset as f64 / radius;
    t * t
}

/// Build a filled box of `floor(r) * 2 + 1` voxels per axis
pub fn create_cuboid(rx: f64, ry: f64, rz: f64) -> Result<Shape> {
    let (cx, cy, cz) = (floor_radius(rx)?, floor_radius(ry)?, floor_radius(rz)?);
    let [width, height, length] = checked_extents(diameter(cx), diameter(cy), diameter(cz))?;

    let origin = IVec3::new(cx as i32, cy as i32, cz as i32);
    let mut shape = Shape::blank(width, height, length, origin);
    shape.invert();
    Ok(shape)
}

/// Build an ellipsoid of `ceil(r) * 2 + 1` voxels per axis
pub fn create_ellipsoid(rx: f64, ry: f64, rz: f64) -> Result<Shape> {
    let (cx, cy, cz) = (ceil_radius(rx)?, ceil_radius(ry)?, ceil_radius(rz)?);
    let [width, height, length] = checked_extents(diameter(cx), diameter(cy), diameter(cz))?;

    let origin = IVec3::new(cx as i32, cy as i32, cz as i32);
    let mut shape = Shape::blank(width, height, length, origin);
    for x in 0..=cx {
        let tx = term(x, rx);
        if tx > 1. {
            break;
        }
        for y in 0..=cy {
            let txy = tx + term(y, ry);
            if txy > 1. {
                break;
            }
            for z in 0..=cz {
                if txy + term(z, rz) > 1. {
                    break;
                }
                let (x, y, z) = (x as i32, y as i32, z as i32);
                for (sx, sy, sz) in OCTANTS {
                    shape.set(sx * x, sy * y, sz * z, true)?;
                }
            }
        }
    }
    Ok(shape)
}

const OCTANTS: [(i32, i32, i32); 8] = [
    (1, 1, 1),
    (1, 1, -1),
    (1, -1, 1),
    (1, -1, -1),
    (-1, 1, 1),
    (-1, 1, -1),
    (-1, -1, 1),
    (-1, -1, -1),
];

const QUADRANTS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Build a sphere
pub fn create_sphere(radius: f64) -> Result<Shape> {
    create_ellipsoid(radius, radius, radius)
}

/// Place a point given in ellipse coordinates `(a, b)` and extrusion layer `e`
fn place(axis: Axis, a: i32, b: i32, e: i32) -> IVec3 {
    match axis {
        Axis::X => IVec3::new(e, a, b),
        Axis::Y => IVec3::new(a, e, b),
        Axis::Z => IVec3::new(a, b, e),
    }
}

/// Build an ellipse extruded `height` layers along the axis of `direction`. East and west extrude
/// along x, north and south along z, up and down along y. `rx` applies to the first remaining
/// axis and `ry` to the second
pub fn create_elliptical_cylinder(
    rx: f64,
    ry: f64,
    height: u32,
    direction: Direction,
) -> Result<Shape> {
    let (ca, cb) = (ceil_radius(rx)?, ceil_radius(ry)?);
    if height == 0 {
        return Err(ShapeError::InvalidHeight(height));
    }

    let axis = direction.axis();
    // The extruded axis starts at the origin, the other two are centered
    let origin = place(axis, ca as i32, cb as i32, 0);
    let [width, shape_height, length] = match axis {
        Axis::X => checked_extents(height as i64, diameter(ca), diameter(cb))?,
        Axis::Y => checked_extents(diameter(ca), height as i64, diameter(cb))?,
        Axis::Z => checked_extents(diameter(ca), diameter(cb), height as i64)?,
    };

    let mut shape = Shape::blank(width, shape_height, length, origin);
    for a in 0..=ca {
        let ta = term(a, rx);
        if ta > 1. {
            break;
        }
        for b in 0..=cb {
            if ta + term(b, ry) > 1. {
                break;
            }
            for (sa, sb) in QUADRANTS {
                for e in 0..height as i32 {
                    let pos = place(axis, sa * a as i32, sb * b as i32, e);
                    shape.set(pos.x, pos.y, pos.z, true)?;
                }
            }
        }
    }
    Ok(shape)
}

/// Build a round cylinder
pub fn create_cylinder(radius: f64, height: u32, direction: Direction) -> Result<Shape> {
    create_elliptical_cylinder(radius, radius, height, direction)
}

/// Build a round disc, one voxel thick
pub fn create_disc(radius: f64, direction: Direction) -> Result<Shape> {
    create_cylinder(radius, 1, direction)
}

/// Build an ellipse, one voxel thick
pub fn create_ellipse(rx: f64, ry: f64, direction: Direction) -> Result<Shape> {
    create_elliptical_cylinder(rx, ry, 1, direction)
}

/// Build a filled cube
pub fn create_voxel(radius: f64) -> Result<Shape> {
    create_cuboid(radius, radius, radius)
}

/// Build a filled square, one voxel thick along the axis of `direction`
pub fn create_voxel_disc(radius: f64, direction: Direction) -> Result<Shape> {
    match direction.axis() {
        Axis::X => create_cuboid(0., radius, radius),
        Axis::Y => create_cuboid(radius, 0., radius),
        Axis::Z => create_cuboid(radius, radius, 0.),
    }
}

#[cfg(test)]
fn extents(shape: &Shape) -> (u32, u32, u32) {
    (shape.width(), shape.height(), shape.length())
}

#[test]
fn test_cuboid() {
    let shape = create_cuboid(1., 1.9, 0.).unwrap();
    assert_eq!((3, 3, 1), extents(&shape));
    assert_eq!(IVec3::new(1, 1, 0), shape.origin());
    assert_eq!(9, shape.count());
}

#[test]
fn test_unit_ellipsoid_boundary() {
    let shape = create_ellipsoid(1., 1., 1.).unwrap();
    assert_eq!((3, 3, 3), extents(&shape));
    assert!(shape.get(0, 0, 0, true).unwrap());
    for (x, y, z) in [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)] {
        assert!(shape.get(x, y, z, true).unwrap(), "({x}, {y}, {z}) should be set");
    }
    for (sx, sy, sz) in OCTANTS {
        assert!(!shape.get(sx, sy, sz, true).unwrap());
    }
    assert_eq!(7, shape.count());
}

#[test]
fn test_sphere_count() {
    let shape = create_sphere(2.).unwrap();
    assert_eq!((5, 5, 5), extents(&shape));
    assert_eq!(IVec3::splat(2), shape.origin());
    assert_eq!(33, shape.count());
}

#[test]
fn test_ellipsoid_rounds_extents_up() {
    let shape = create_ellipsoid(1.2, 0.5, 2.).unwrap();
    assert_eq!((5, 3, 5), extents(&shape));
    assert!(shape.get(1, 0, 0, true).unwrap());
    assert!(!shape.get(2, 0, 0, true).unwrap());
    assert!(!shape.get(0, 1, 0, true).unwrap());
    assert!(shape.get(0, 0, -2, true).unwrap());
}

#[test]
fn test_zero_radius_sphere_is_one_voxel() {
    let shape = create_sphere(0.).unwrap();
    assert_eq!((1, 1, 1), extents(&shape));
    assert_eq!(1, shape.count());
}

#[test]
fn test_invalid_radius() {
    assert!(matches!(
        create_sphere(-1.),
        Err(ShapeError::InvalidRadius(_))
    ));
    assert!(create_cuboid(f64::NAN, 1., 1.).is_err());
    assert!(create_cylinder(f64::INFINITY, 2, Direction::Up).is_err());
    assert!(matches!(
        create_cylinder(1., 0, Direction::Up),
        Err(ShapeError::InvalidHeight(0))
    ));
}

#[test]
fn test_cylinder_directions() {
    let up = create_cylinder(2., 4, Direction::Up).unwrap();
    assert_eq!((5, 4, 5), extents(&up));
    assert_eq!(IVec3::new(2, 0, 2), up.origin());
    assert_eq!(13 * 4, up.count());

    let east = create_cylinder(2., 4, Direction::West).unwrap();
    assert_eq!((4, 5, 5), extents(&east));
    assert_eq!(IVec3::new(0, 2, 2), east.origin());

    let north = create_cylinder(2., 4, Direction::South).unwrap();
    assert_eq!((5, 5, 4), extents(&north));
    assert_eq!(IVec3::new(2, 2, 0), north.origin());
    assert!(north.get(0, 2, 3, true).unwrap());
}

#[test]
fn test_disc_and_ellipse() {
    let disc = create_disc(2., Direction::Down).unwrap();
    assert_eq!((5, 1, 5), extents(&disc));
    assert_eq!(13, disc.count());

    let ellipse = create_ellipse(2., 1., Direction::East).unwrap();
    assert_eq!((1, 5, 3), extents(&ellipse));
    assert!(ellipse.get(0, 2, 0, true).unwrap());
    assert!(ellipse.get(0, 0, 1, true).unwrap());
    assert!(!ellipse.get(0, 1, 1, true).unwrap());
}

#[test]
fn test_voxel_shapes() {
    assert_eq!(27, create_voxel(1.).unwrap().count());

    let disc = create_voxel_disc(1., Direction::North).unwrap();
    assert_eq!((3, 3, 1), extents(&disc));
    let disc = create_voxel_disc(1., Direction::East).unwrap();
    assert_eq!((1, 3, 3), extents(&disc));
    let disc = create_voxel_disc(1., Direction::Up).unwrap();
    assert_eq!((3, 1, 3), extents(&disc));
    assert_eq!(9, disc.count());
}

#[test]
fn test_primitive_dispatch() {
    let primitives: [Primitive; 3] = [
        Cuboid {
            rx: 1.,
            ry: 1.,
            rz: 1.,
        }
        .into(),
        Ellipsoid {
            rx: 1.,
            ry: 1.,
            rz: 1.,
        }
        .into(),
        EllipticalCylinder {
            rx: 2.,
            ry: 2.,
            height: 1,
            direction: Direction::Up,
        }
        .into(),
    ];
    let counts: Vec<usize> = primitives
        .iter()
        .map(|p| p.generate().unwrap().count())
        .collect();
    assert_eq!(vec![27, 7, 13], counts);

    let json = serde_json::to_string(&primitives[1]).unwrap();
    let decoded: Primitive = serde_json::from_str(&json).unwrap();
    assert_eq!(primitives[1], decoded);
}

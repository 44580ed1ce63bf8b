//! Predicates that check whether a [Shape] is exactly a given primitive. Membership is recomputed
//! cell by cell over the whole volume, so these also catch mirroring mistakes in the factory

use crate::{
    direction::{Axis, Direction},
    Shape,
};

use bevy::prelude::IVec3;

fn term(offset: i32, radius: f64) -> f64 {
    if offset == 0 {
        return 0.;
    }
    let t = offset as f64 / radius;
    t * t
}

fn has_bounds(shape: &Shape, extents: [i64; 3], origin: [i64; 3]) -> bool {
    let actual = [shape.width(), shape.height(), shape.length()].map(|v| v as i64);
    let o = shape.origin();
    actual == extents && [o.x as i64, o.y as i64, o.z as i64] == origin
}

/// Returns true if every relative position satisfies `inside` exactly when it is set
fn cells_match(shape: &Shape, inside: impl Fn(IVec3) -> bool) -> bool {
    let origin = shape.origin();
    for x in 0..shape.width() as i32 {
        for y in 0..shape.height() as i32 {
            for z in 0..shape.length() as i32 {
                let Ok(set) = shape.get(x, y, z, false) else {
                    return false;
                };
                if set != inside(IVec3::new(x, y, z) - origin) {
                    return false;
                }
            }
        }
    }
    true
}

fn usable(radius: f64) -> bool {
    radius.is_finite() && radius >= 0.
}

/// Returns true if the shape is a completely filled box with the given radii, rounded down
pub fn is_cuboid(shape: &Shape, rx: f64, ry: f64, rz: f64) -> bool {
    if !(usable(rx) && usable(ry) && usable(rz)) {
        return false;
    }
    let r = [rx, ry, rz].map(|r| r.floor() as i64);
    has_bounds(shape, r.map(|r| r * 2 + 1), r) && shape.count() == shape.volume()
}

/// Returns true if the shape is an ellipsoid with the given radii
pub fn is_ellipsoid(shape: &Shape, rx: f64, ry: f64, rz: f64) -> bool {
    if !(usable(rx) && usable(ry) && usable(rz)) {
        return false;
    }
    let r = [rx, ry, rz].map(|r| r.ceil() as i64);
    has_bounds(shape, r.map(|r| r * 2 + 1), r)
        && cells_match(shape, |p| {
            term(p.x, rx) + term(p.y, ry) + term(p.z, rz) <= 1.
        })
}

/// Returns true if the shape is a sphere with the given radius
pub fn is_sphere(shape: &Shape, radius: f64) -> bool {
    is_ellipsoid(shape, radius, radius, radius)
}

/// Returns true if the shape is an ellipse extruded `height` layers along the axis of `direction`
pub fn is_elliptical_cylinder(
    shape: &Shape,
    rx: f64,
    ry: f64,
    height: u32,
    direction: Direction,
) -> bool {
    if !(usable(rx) && usable(ry)) || height == 0 {
        return false;
    }
    let (ca, cb) = (rx.ceil() as i64, ry.ceil() as i64);
    let (da, db, h) = (ca * 2 + 1, cb * 2 + 1, height as i64);
    let axis = direction.axis();
    let (extents, origin) = match axis {
        Axis::X => ([h, da, db], [0, ca, cb]),
        Axis::Y => ([da, h, db], [ca, 0, cb]),
        Axis::Z => ([da, db, h], [ca, cb, 0]),
    };

    has_bounds(shape, extents, origin)
        && cells_match(shape, |p| {
            let (a, b) = match axis {
                Axis::X => (p.y, p.z),
                Axis::Y => (p.x, p.z),
                Axis::Z => (p.x, p.y),
            };
            term(a, rx) + term(b, ry) <= 1.
        })
}

/// Returns true if the shape is a round cylinder
pub fn is_cylinder(shape: &Shape, radius: f64, height: u32, direction: Direction) -> bool {
    is_elliptical_cylinder(shape, radius, radius, height, direction)
}

/// Returns true if the shape is a round disc, one voxel thick along the axis of `direction`
pub fn is_disc(shape: &Shape, radius: f64, direction: Direction) -> bool {
    is_cylinder(shape, radius, 1, direction)
}

/// Returns true if the shape is a single layer along the y axis
pub fn is_flat(shape: &Shape) -> bool {
    shape.height() == 1 && shape.origin().y == 0
}

#[cfg(test)]
use crate::factory;

#[test]
fn test_factory_shapes_validate() {
    for r in [0., 0.5, 1., 1.5, 2., 3.7] {
        assert!(is_sphere(&factory::create_sphere(r).unwrap(), r), "sphere {r}");
        assert!(is_cuboid(&factory::create_cuboid(r, 1., r).unwrap(), r, 1., r));
        for direction in Direction::ALL {
            let disc = factory::create_disc(r, direction).unwrap();
            assert!(is_disc(&disc, r, direction), "disc {r} {direction:?}");
        }
    }

    let ellipsoid = factory::create_ellipsoid(3., 1.5, 2.2).unwrap();
    assert!(is_ellipsoid(&ellipsoid, 3., 1.5, 2.2));
    assert!(!is_sphere(&ellipsoid, 3.));

    let cylinder = factory::create_elliptical_cylinder(2.5, 1., 3, Direction::North).unwrap();
    assert!(is_elliptical_cylinder(&cylinder, 2.5, 1., 3, Direction::South));
    assert!(!is_elliptical_cylinder(&cylinder, 2.5, 1., 3, Direction::Up));
    assert!(!is_cylinder(&cylinder, 2.5, 3, Direction::North));
}

#[test]
fn test_disc_is_not_sphere() {
    let disc = factory::create_disc(2., Direction::Up).unwrap();
    assert!(is_disc(&disc, 2., Direction::Down));
    assert!(is_flat(&disc));
    assert!(!is_disc(&disc, 2., Direction::East));
    assert!(!is_sphere(&disc, 2.));
}

#[test]
fn test_modified_shape_fails() {
    let mut sphere = factory::create_sphere(2.).unwrap();
    sphere.unset(2, 0, 0, true).unwrap();
    assert!(!is_sphere(&sphere, 2.));

    let mut cuboid = factory::create_cuboid(1., 1., 1.).unwrap();
    assert!(is_cuboid(&cuboid, 1., 1., 1.));
    cuboid.unset(0, 0, 0, true).unwrap();
    assert!(!is_cuboid(&cuboid, 1., 1., 1.));
}

#[test]
fn test_flattened_shape_is_flat() {
    let mut sphere = factory::create_sphere(1.).unwrap();
    assert!(!is_flat(&sphere));
    sphere.flatten();
    assert!(is_flat(&sphere));
    assert!(is_disc(&sphere, 1., Direction::Up));
}

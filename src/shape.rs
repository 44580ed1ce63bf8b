//! This module contains [Shape], a bounded volume of set and unset voxels.
//!
//! A shape is a box of `width * height * length` cells with an origin. Coordinates passed with
//! `relative = true` are offset by the origin before they are used, so a brush can treat the
//! origin as its center. The cells are packed into a bit vector, ordered by [Shape::index_of].

use crate::{Result, ShapeError};

use bevy::{log::trace, prelude::IVec3};
use bitvec::{order::Lsb0, vec::BitVec};
use fast_surface_nets::ndshape::{RuntimeShape, Shape as _};

pub(crate) type Bits = BitVec<u8, Lsb0>;

/// A packed boolean voxel volume with an origin offset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    width: u32,
    height: u32,
    length: u32,
    origin: IVec3,
    bits: Bits,
}

/// Validate requested extents, every axis needs at least one cell and the cell count has to fit
/// in the u32 index space
pub(crate) fn checked_extents(width: i64, height: i64, length: i64) -> Result<[u32; 3]> {
    let invalid = ShapeError::InvalidSize {
        width,
        height,
        length,
    };
    if width < 1 || height < 1 || length < 1 {
        return Err(invalid);
    }
    let cells = (width as i128) * (height as i128) * (length as i128);
    if cells > u32::MAX as i128 {
        return Err(invalid);
    }
    Ok([width as u32, height as u32, length as u32])
}

fn checked_origin(x: i64, y: i64, z: i64) -> Result<IVec3> {
    match (i32::try_from(x), i32::try_from(y), i32::try_from(z)) {
        (Ok(x), Ok(y), Ok(z)) => Ok(IVec3::new(x, y, z)),
        _ => Err(ShapeError::Unsupported("origin outside of the i32 range")),
    }
}

impl Shape {
    /// Create an empty shape with its origin at the first cell
    pub fn new(width: u32, height: u32, length: u32) -> Result<Self> {
        Self::with_origin(width, height, length, IVec3::ZERO)
    }

    /// Create an empty shape with the given origin. A zero extent gives a shape without cells,
    /// more than `u32::MAX` cells is rejected with [ShapeError::InvalidSize]
    pub fn with_origin(width: u32, height: u32, length: u32, origin: IVec3) -> Result<Self> {
        let cells = width as u64 * height as u64 * length as u64;
        if cells > u32::MAX as u64 {
            return Err(ShapeError::InvalidSize {
                width: width as i64,
                height: height as i64,
                length: length as i64,
            });
        }
        Ok(Self::blank(width, height, length, origin))
    }

    /// Allocate a cleared volume for extents that already passed [checked_extents]
    pub(crate) fn blank(width: u32, height: u32, length: u32, origin: IVec3) -> Self {
        let cells = width as usize * height as usize * length as usize;
        Self {
            width,
            height,
            length,
            origin,
            bits: Bits::repeat(false, cells),
        }
    }

    /// Rebuild a shape from bytes produced by [Shape::to_bytes]
    pub fn from_bytes(
        width: u32,
        height: u32,
        length: u32,
        origin: IVec3,
        bytes: &[u8],
    ) -> Result<Self> {
        let [width, height, length] = checked_extents(width as i64, height as i64, length as i64)?;
        let cells = width as usize * height as usize * length as usize;
        let needed = cells.div_ceil(8);
        if bytes.len() < needed {
            return Err(ShapeError::SnapshotMismatch(format!(
                "expected {needed} bytes for {cells} cells, got {}",
                bytes.len()
            )));
        }

        let mut bits = Bits::from_slice(&bytes[..needed]);
        bits.truncate(cells);
        Ok(Self {
            width,
            height,
            length,
            origin,
            bits,
        })
    }

    /// The size of the x axis
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The size of the y axis
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The size of the z axis
    pub fn length(&self) -> u32 {
        self.length
    }

    /// The cell that relative coordinates treat as (0, 0, 0)
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// Move the origin without touching any cells
    pub fn set_origin(&mut self, origin: IVec3) {
        self.origin = origin;
    }

    /// The number of cells in the volume, set or not
    pub fn volume(&self) -> usize {
        self.bits.len()
    }

    /// The number of set cells
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Returns true if no cell is set
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    fn layout(&self) -> RuntimeShape<u32, 3> {
        // Points are [x, z, y] so x moves fastest, then z, then y
        RuntimeShape::<u32, 3>::new([self.width, self.length, self.height])
    }

    fn resolve(&self, x: i32, y: i32, z: i32, relative: bool) -> [i64; 3] {
        let (x, y, z) = (x as i64, y as i64, z as i64);
        if relative {
            [
                x + self.origin.x as i64,
                y + self.origin.y as i64,
                z + self.origin.z as i64,
            ]
        } else {
            [x, y, z]
        }
    }

    fn in_bounds(&self, [x, y, z]: [i64; 3]) -> bool {
        (0..self.width as i64).contains(&x)
            && (0..self.height as i64).contains(&y)
            && (0..self.length as i64).contains(&z)
    }

    /// Returns true if the coordinate lies inside of the volume
    pub fn contains(&self, x: i32, y: i32, z: i32, relative: bool) -> bool {
        self.in_bounds(self.resolve(x, y, z, relative))
    }

    /// The index of a cell in the packed volume: `y * (width * length) + z * width + x`.
    /// Per voxel data stored next to a shape has to use the same index
    pub fn index_of(&self, x: i32, y: i32, z: i32, relative: bool) -> Result<usize> {
        let pos = self.resolve(x, y, z, relative);
        if !self.in_bounds(pos) {
            return Err(ShapeError::OutOfBounds {
                x: pos[0],
                y: pos[1],
                z: pos[2],
                width: self.width,
                height: self.height,
                length: self.length,
            });
        }
        let [x, y, z] = pos.map(|v| v as u32);
        Ok(self.layout().linearize([x, z, y]) as usize)
    }

    /// The absolute position of the cell at the given index
    pub(crate) fn position_of(&self, index: usize) -> IVec3 {
        let [x, z, y] = self.layout().delinearize(index as u32);
        IVec3::new(x as i32, y as i32, z as i32)
    }

    /// Returns whether the voxel is set
    pub fn get(&self, x: i32, y: i32, z: i32, relative: bool) -> Result<bool> {
        let idx = self.index_of(x, y, z, relative)?;
        Ok(self.bits[idx])
    }

    /// Set a single voxel
    pub fn set(&mut self, x: i32, y: i32, z: i32, relative: bool) -> Result<()> {
        let idx = self.index_of(x, y, z, relative)?;
        self.bits.set(idx, true);
        Ok(())
    }

    /// Unset a single voxel
    pub fn unset(&mut self, x: i32, y: i32, z: i32, relative: bool) -> Result<()> {
        let idx = self.index_of(x, y, z, relative)?;
        self.bits.set(idx, false);
        Ok(())
    }

    pub(crate) fn get_index(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub(crate) fn set_index(&mut self, index: usize, value: bool) {
        self.bits.set(index, value);
    }

    /// The position of every set voxel relative to the origin. Ordered by x, then y, then z
    pub fn get_shape(&self) -> Vec<IVec3> {
        let layout = self.layout();
        let mut positions = Vec::with_capacity(self.count());
        for x in 0..self.width {
            for y in 0..self.height {
                for z in 0..self.length {
                    if self.bits[layout.linearize([x, z, y]) as usize] {
                        positions.push(IVec3::new(x as i32, y as i32, z as i32) - self.origin);
                    }
                }
            }
        }
        positions
    }

    /// Reallocate the volume with new extents and a new origin. Every set voxel keeps its position
    /// relative to the origin, voxels that no longer fit are dropped
    pub fn resize(&mut self, width: u32, height: u32, length: u32, origin: IVec3) -> Result<()> {
        let [width, height, length] = checked_extents(width as i64, height as i64, length as i64)?;
        let mut resized = Shape::blank(width, height, length, origin);
        for idx in self.bits.iter_ones() {
            let rel = self.position_of(idx) - self.origin;
            if let Ok(new_idx) = resized.index_of(rel.x, rel.y, rel.z, true) {
                resized.bits.set(new_idx, true);
            }
        }

        trace!(
            "resized shape from {}x{}x{} at {} to {}x{}x{} at {}",
            self.width,
            self.height,
            self.length,
            self.origin,
            width,
            height,
            length,
            origin
        );
        *self = resized;
        Ok(())
    }

    fn reshape(&mut self, extents: [i64; 3], origin: [i64; 3]) -> Result<()> {
        let [width, height, length] = checked_extents(extents[0], extents[1], extents[2])?;
        let origin = checked_origin(origin[0], origin[1], origin[2])?;
        self.resize(width, height, length, origin)
    }

    fn extents(&self) -> [i64; 3] {
        [self.width as i64, self.height as i64, self.length as i64]
    }

    fn origin_i64(&self) -> [i64; 3] {
        [
            self.origin.x as i64,
            self.origin.y as i64,
            self.origin.z as i64,
        ]
    }

    /// Add (or with negative values remove) cells on the negative side of each axis. The origin
    /// moves along so every voxel keeps its relative position
    pub fn resize_negative(&mut self, dx: i32, dy: i32, dz: i32) -> Result<()> {
        let delta = [dx as i64, dy as i64, dz as i64];
        let extents = self.extents();
        let origin = self.origin_i64();
        self.reshape(
            [0, 1, 2].map(|i| extents[i] + delta[i]),
            [0, 1, 2].map(|i| origin[i] + delta[i]),
        )
    }

    /// Add (or with negative values remove) cells on the positive side of each axis
    pub fn resize_positive(&mut self, dx: i32, dy: i32, dz: i32) -> Result<()> {
        let delta = [dx as i64, dy as i64, dz as i64];
        let extents = self.extents();
        self.reshape([0, 1, 2].map(|i| extents[i] + delta[i]), self.origin_i64())
    }

    /// Grow each axis by the size of its delta. A negative delta grows the negative side, a
    /// positive delta grows the positive side
    pub fn grow(&mut self, dx: i32, dy: i32, dz: i32) -> Result<()> {
        let delta = [dx as i64, dy as i64, dz as i64];
        let extents = self.extents();
        let origin = self.origin_i64();
        self.reshape(
            [0, 1, 2].map(|i| extents[i] + delta[i].abs()),
            [0, 1, 2].map(|i| origin[i] + (-delta[i]).max(0)),
        )
    }

    /// Shrink each axis by the size of its delta. A negative delta shrinks the negative side, a
    /// positive delta shrinks the positive side. Shrinking an axis below 1 fails
    pub fn shrink(&mut self, dx: i32, dy: i32, dz: i32) -> Result<()> {
        let delta = [dx as i64, dy as i64, dz as i64];
        let extents = self.extents();
        let origin = self.origin_i64();
        self.reshape(
            [0, 1, 2].map(|i| extents[i] - delta[i].abs()),
            [0, 1, 2].map(|i| origin[i] - (-delta[i]).max(0)),
        )
    }

    /// Compute the bounding box that holds both shapes, as extents and the origin both shapes
    /// would share. Neither shape is changed
    pub fn combine_sizes(&self, other: &Shape) -> Result<([u32; 3], IVec3)> {
        let (a_ext, a_org) = (self.extents(), self.origin_i64());
        let (b_ext, b_org) = (other.extents(), other.origin_i64());

        let min = [0, 1, 2].map(|i| (-a_org[i]).min(-b_org[i]));
        let max = [0, 1, 2].map(|i| (a_ext[i] - a_org[i]).max(b_ext[i] - b_org[i]));

        let extents = checked_extents(max[0] - min[0], max[1] - min[1], max[2] - min[2])?;
        let origin = checked_origin(-min[0], -min[1], -min[2])?;
        Ok((extents, origin))
    }

    fn has_bounds(&self, [width, height, length]: [u32; 3], origin: IVec3) -> bool {
        self.width == width
            && self.height == height
            && self.length == length
            && self.origin == origin
    }

    /// Resize both shapes so they share the same extents and origin, covering the union of their
    /// bounds. Relative coordinates mean the same thing in both shapes afterwards
    pub fn match_size(&mut self, other: &mut Shape) -> Result<()> {
        let (extents, origin) = self.combine_sizes(other)?;
        let [width, height, length] = extents;
        if !self.has_bounds(extents, origin) {
            self.resize(width, height, length, origin)?;
        }
        if !other.has_bounds(extents, origin) {
            other.resize(width, height, length, origin)?;
        }
        Ok(())
    }

    /// Union. Both shapes are resized to their combined bounds first, `other` included
    pub fn add(&mut self, other: &mut Shape) -> Result<()> {
        self.match_size(other)?;
        self.bits |= other.bits.as_bitslice();
        Ok(())
    }

    /// Clear every voxel that is set in `other`. Both shapes are resized to their combined bounds
    /// first, `other` included
    pub fn subtract(&mut self, other: &mut Shape) -> Result<()> {
        self.match_size(other)?;
        let mask = !other.bits.clone();
        self.bits &= mask.as_bitslice();
        Ok(())
    }

    /// Intersection. Both shapes are resized to their combined bounds first, `other` included
    pub fn intersect(&mut self, other: &mut Shape) -> Result<()> {
        self.match_size(other)?;
        self.bits &= other.bits.as_bitslice();
        Ok(())
    }

    /// Symmetric difference. Both shapes are resized to their combined bounds first, `other`
    /// included
    pub fn xor(&mut self, other: &mut Shape) -> Result<()> {
        self.match_size(other)?;
        self.bits ^= other.bits.as_bitslice();
        Ok(())
    }

    /// Flip every cell
    pub fn invert(&mut self) {
        self.bits = !std::mem::take(&mut self.bits);
    }

    /// Collapse the y axis. A column is set if any voxel in it was set, the origin moves to y = 0
    pub fn flatten(&mut self) {
        let origin = IVec3::new(self.origin.x, 0, self.origin.z);
        let mut flat = Shape::blank(self.width, 1, self.length, origin);
        // A y layer is one contiguous run of the index space
        let layer = self.width as usize * self.length as usize;
        for idx in self.bits.iter_ones() {
            flat.bits.set(idx % layer, true);
        }
        *self = flat;
    }

    /// The cells packed 8 per byte in index order, least significant bit first
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.bits.as_raw_slice().to_vec();
        let tail = self.bits.len() % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }
        bytes
    }
}

#[test]
fn test_set_get_round_trip() {
    let mut shape = Shape::with_origin(3, 3, 3, IVec3::ONE).unwrap();
    for (x, y, z) in [(-1, -1, -1), (0, 0, 0), (1, 0, -1), (1, 1, 1)] {
        shape.set(x, y, z, true).unwrap();
        assert!(shape.get(x, y, z, true).unwrap());
        shape.unset(x, y, z, true).unwrap();
        assert!(!shape.get(x, y, z, true).unwrap());
    }
}

#[test]
fn test_relative_and_absolute_agree() {
    let mut shape = Shape::with_origin(4, 2, 3, IVec3::new(2, 1, 1)).unwrap();
    shape.set(-2, -1, 1, true).unwrap();
    assert!(shape.get(0, 0, 2, false).unwrap());
    assert_eq!(vec![IVec3::new(-2, -1, 1)], shape.get_shape());
}

#[test]
fn test_out_of_bounds_fails() {
    let mut shape = Shape::new(2, 2, 2).unwrap();
    assert!(matches!(
        shape.get(2, 0, 0, false),
        Err(ShapeError::OutOfBounds { x: 2, .. })
    ));
    assert!(shape.set(0, -1, 0, false).is_err());
    assert!(shape.unset(0, 0, 2, false).is_err());
    assert!(shape.set(2, 1, 1, true).is_err());
    assert!(shape.is_empty());
}

#[test]
fn test_index_layout() {
    let shape = Shape::new(4, 3, 5).unwrap();
    assert_eq!(0, shape.index_of(0, 0, 0, false).unwrap());
    assert_eq!(1, shape.index_of(1, 0, 0, false).unwrap());
    assert_eq!(4, shape.index_of(0, 0, 1, false).unwrap());
    assert_eq!(20, shape.index_of(0, 1, 0, false).unwrap());
    assert_eq!(2 * 20 + 3 * 4 + 1, shape.index_of(1, 2, 3, false).unwrap());
    assert_eq!(IVec3::new(1, 2, 3), shape.position_of(2 * 20 + 3 * 4 + 1));
}

#[test]
fn test_clone_is_independent() {
    let mut shape = Shape::with_origin(3, 2, 2, IVec3::new(1, 0, 0)).unwrap();
    shape.set(0, 1, 1, false).unwrap();
    let mut copy = shape.clone();
    assert_eq!(shape, copy);

    copy.set(2, 0, 0, false).unwrap();
    copy.unset(0, 1, 1, false).unwrap();
    assert!(shape.get(0, 1, 1, false).unwrap());
    assert!(!shape.get(2, 0, 0, false).unwrap());
    assert_eq!(1, shape.count());
}

#[test]
fn test_resize_preserves_overlap() {
    let mut shape = Shape::new(4, 4, 4).unwrap();
    shape.set(1, 2, 1, false).unwrap();
    shape.set(3, 3, 3, false).unwrap();

    shape.resize(2, 3, 2, IVec3::ZERO).unwrap();
    assert_eq!((2, 3, 2), (shape.width(), shape.height(), shape.length()));
    assert!(shape.get(1, 2, 1, false).unwrap());
    assert_eq!(1, shape.count());
}

#[test]
fn test_resize_rejects_empty_extents() {
    let mut shape = Shape::new(2, 2, 2).unwrap();
    shape.set(1, 1, 1, false).unwrap();
    assert!(matches!(
        shape.resize(0, 2, 2, IVec3::ZERO),
        Err(ShapeError::InvalidSize { .. })
    ));
    assert_eq!(2, shape.width());
    assert!(shape.get(1, 1, 1, false).unwrap());
}

#[test]
fn test_grow_negative_keeps_relative_positions() {
    let mut shape = Shape::new(2, 2, 2).unwrap();
    shape.set(0, 0, 0, true).unwrap();

    shape.grow(-2, 0, 3).unwrap();
    assert_eq!((4, 2, 5), (shape.width(), shape.height(), shape.length()));
    assert_eq!(IVec3::new(2, 0, 0), shape.origin());
    assert!(shape.get(0, 0, 0, true).unwrap());
    assert!(shape.get(2, 0, 0, false).unwrap());
    assert!(shape.contains(-2, 0, 4, true));
}

#[test]
fn test_shrink() {
    let mut shape = Shape::with_origin(5, 5, 5, IVec3::splat(2)).unwrap();
    shape.set(-2, 0, 0, true).unwrap();
    shape.set(0, 0, 0, true).unwrap();

    shape.shrink(-1, 2, 0).unwrap();
    assert_eq!((4, 3, 5), (shape.width(), shape.height(), shape.length()));
    assert_eq!(IVec3::new(1, 2, 2), shape.origin());
    assert_eq!(vec![IVec3::ZERO], shape.get_shape());

    assert!(shape.shrink(0, -3, 0).is_err());
    assert_eq!(3, shape.height());
}

#[test]
fn test_resize_negative_and_positive() {
    let mut shape = Shape::new(1, 1, 1).unwrap();
    shape.set(0, 0, 0, false).unwrap();

    shape.resize_negative(1, 0, 2).unwrap();
    assert_eq!(IVec3::new(1, 0, 2), shape.origin());
    shape.resize_positive(0, 3, 0).unwrap();
    assert_eq!((2, 4, 3), (shape.width(), shape.height(), shape.length()));
    assert!(shape.get(0, 0, 0, true).unwrap());
    assert_eq!(1, shape.count());
}

#[test]
fn test_match_size_is_symmetric() {
    let mut a = Shape::with_origin(3, 1, 2, IVec3::new(1, 0, 0)).unwrap();
    let mut b = Shape::with_origin(2, 4, 1, IVec3::new(-1, 2, 3)).unwrap();
    a.set(-1, 0, 1, true).unwrap();
    b.set(2, 1, -3, true).unwrap();

    a.match_size(&mut b).unwrap();
    assert_eq!(
        (a.width(), a.height(), a.length()),
        (b.width(), b.height(), b.length())
    );
    assert_eq!(a.origin(), b.origin());
    assert_eq!(vec![IVec3::new(-1, 0, 1)], a.get_shape());
    assert_eq!(vec![IVec3::new(2, 1, -3)], b.get_shape());
}

#[test]
fn test_combine_sizes_does_not_mutate() {
    let a = Shape::with_origin(3, 3, 3, IVec3::ONE).unwrap();
    let b = Shape::with_origin(1, 1, 1, IVec3::new(0, 0, -4)).unwrap();
    let (extents, origin) = a.combine_sizes(&b).unwrap();
    assert_eq!([3, 3, 6], extents);
    assert_eq!(IVec3::ONE, origin);
    assert_eq!(1, b.width());
    assert_eq!(IVec3::new(0, 0, -4), b.origin());
}

#[test]
fn test_csg_operators() {
    let mut a = Shape::new(2, 1, 1).unwrap();
    a.set(0, 0, 0, false).unwrap();
    a.set(1, 0, 0, false).unwrap();
    let mut b = Shape::with_origin(2, 1, 1, IVec3::new(1, 0, 0)).unwrap();
    b.set(-1, 0, 0, true).unwrap();
    b.set(0, 0, 0, true).unwrap();

    let mut union = a.clone();
    union.add(&mut b.clone()).unwrap();
    assert_eq!(
        vec![IVec3::new(-1, 0, 0), IVec3::ZERO, IVec3::new(1, 0, 0)],
        union.get_shape()
    );

    let mut difference = a.clone();
    difference.subtract(&mut b.clone()).unwrap();
    assert_eq!(vec![IVec3::new(1, 0, 0)], difference.get_shape());
    assert_eq!(3, difference.width());

    let mut intersection = a.clone();
    intersection.intersect(&mut b.clone()).unwrap();
    assert_eq!(vec![IVec3::ZERO], intersection.get_shape());

    let mut exclusive = a.clone();
    exclusive.xor(&mut b).unwrap();
    assert_eq!(
        vec![IVec3::new(-1, 0, 0), IVec3::new(1, 0, 0)],
        exclusive.get_shape()
    );
    // The argument is resized as well
    assert_eq!(3, b.width());
    assert_eq!(IVec3::new(1, 0, 0), b.origin());
}

#[test]
fn test_subtract_clears_only_overlap() {
    let mut a = Shape::new(3, 1, 1).unwrap();
    a.invert();
    let mut b = Shape::new(3, 1, 1).unwrap();
    b.set(1, 0, 0, false).unwrap();

    a.subtract(&mut b).unwrap();
    assert_eq!(
        vec![IVec3::new(0, 0, 0), IVec3::new(2, 0, 0)],
        a.get_shape()
    );
}

#[test]
fn test_self_intersect_is_identity() {
    let mut shape = Shape::with_origin(3, 2, 2, IVec3::ONE).unwrap();
    shape.set(0, 0, 0, true).unwrap();
    shape.set(1, -1, 0, true).unwrap();

    let mut copy = shape.clone();
    copy.intersect(&mut shape).unwrap();
    assert_eq!(shape.get_shape(), copy.get_shape());
}

#[test]
fn test_invert_twice_restores() {
    let mut shape = Shape::new(3, 3, 1).unwrap();
    shape.set(1, 2, 0, false).unwrap();
    let before = shape.clone();

    shape.invert();
    assert_eq!(8, shape.count());
    assert!(!shape.get(1, 2, 0, false).unwrap());
    shape.invert();
    assert_eq!(before, shape);
}

#[test]
fn test_flatten() {
    let mut shape = Shape::with_origin(1, 2, 2, IVec3::new(0, 1, 0)).unwrap();
    shape.set(0, 1, 1, false).unwrap();

    shape.flatten();
    assert_eq!((1, 1, 2), (shape.width(), shape.height(), shape.length()));
    assert_eq!(0, shape.origin().y);
    assert!(shape.get(0, 0, 1, false).unwrap());
    assert!(!shape.get(0, 0, 0, false).unwrap());
}

#[test]
fn test_bytes_round_trip_masks_padding() {
    let mut shape = Shape::with_origin(3, 1, 3, IVec3::new(1, 0, 1)).unwrap();
    shape.set(2, 0, 2, false).unwrap();
    shape.invert();

    let bytes = shape.to_bytes();
    assert_eq!(vec![0xff, 0x00], bytes);
    let restored = Shape::from_bytes(3, 1, 3, shape.origin(), &bytes).unwrap();
    assert_eq!(shape, restored);

    assert!(matches!(
        Shape::from_bytes(3, 3, 3, IVec3::ZERO, &bytes),
        Err(ShapeError::SnapshotMismatch(_))
    ));
}

#[test]
fn test_new_rejects_oversized_volume() {
    // 65536 * 65537 cells do not fit the u32 index space
    assert!(matches!(
        Shape::new(65536, 1, 65537),
        Err(ShapeError::InvalidSize {
            width: 65536,
            height: 1,
            length: 65537
        })
    ));
    assert!(Shape::with_origin(u32::MAX, 2, 1, IVec3::ZERO).is_err());

    // Zero extents give a volume without cells
    let empty = Shape::new(0, 1, 1).unwrap();
    assert_eq!(0, empty.volume());
    assert!(empty.get(0, 0, 0, false).is_err());
}

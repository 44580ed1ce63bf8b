//! Errors returned by shape and material operations

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = ShapeError> = std::result::Result<T, E>;

/// Everything that can go wrong while building, editing or restoring a shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// A coordinate resolved outside of the shape's volume
    #[error("position ({x}, {y}, {z}) is outside of a {width}x{height}x{length} shape")]
    OutOfBounds {
        /// Absolute x coordinate
        x: i64,
        /// Absolute y coordinate
        y: i64,
        /// Absolute z coordinate
        z: i64,
        /// Width of the shape
        width: u32,
        /// Height of the shape
        height: u32,
        /// Length of the shape
        length: u32,
    },

    /// A resize would leave an axis without any cells
    #[error("invalid shape size {width}x{height}x{length}, every extent must be at least 1")]
    InvalidSize {
        /// Requested width
        width: i64,
        /// Requested height
        height: i64,
        /// Requested length
        length: i64,
    },

    /// Radii must be finite and not negative
    #[error("invalid radius {0}")]
    InvalidRadius(f64),

    /// Cylinders need at least one layer
    #[error("invalid cylinder height {0}")]
    InvalidHeight(u32),

    /// Every 16 bit material id is already taken
    #[error("material dictionary is full")]
    DictionaryFull,

    /// The operation is not supported by this shape
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Snapshot data does not describe a valid shape
    #[error("snapshot mismatch: {0}")]
    SnapshotMismatch(String),
}

#[test]
fn test_out_of_bounds_message() {
    let err = ShapeError::OutOfBounds {
        x: 3,
        y: -1,
        z: 0,
        width: 2,
        height: 2,
        length: 2,
    };
    assert_eq!(
        "position (3, -1, 0) is outside of a 2x2x2 shape",
        err.to_string()
    );
}

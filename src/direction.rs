//! Directions used to orient flat and extruded shapes

use serde::{Deserialize, Serialize};

/// One of the three voxel axes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Axis {
    /// The width axis
    X,
    /// The height axis
    Y,
    /// The length axis
    Z,
}

/// A cardinal or vertical direction, as reported by the player's facing.
/// Factory functions only care about the axis a direction runs along
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Towards negative z
    North,
    /// Towards positive z
    South,
    /// Towards positive x
    East,
    /// Towards negative x
    West,
    /// Towards positive y
    #[default]
    Up,
    /// Towards negative y
    Down,
}

impl Direction {
    /// All six directions
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// The axis this direction runs along. Shapes built for a direction are extruded along it
    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::X,
            Direction::North | Direction::South => Axis::Z,
            Direction::Up | Direction::Down => Axis::Y,
        }
    }
}

#[test]
fn test_direction_axis() {
    assert_eq!(Axis::X, Direction::East.axis());
    assert_eq!(Axis::X, Direction::West.axis());
    assert_eq!(Axis::Z, Direction::North.axis());
    assert_eq!(Axis::Z, Direction::South.axis());
    assert_eq!(Axis::Y, Direction::Up.axis());
    assert_eq!(Axis::Y, Direction::Down.axis());
    assert_eq!(Axis::Y, Direction::default().axis());
}

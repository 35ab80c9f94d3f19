//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel block and the
//! per-face constants the mesher needs (offsets and shade hints).

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Represents the six possible faces of a voxel block.
///
/// The discriminants fix the order in which the mesher emits faces for a block
/// and the order of the neighbour array returned by the world store:
/// [RIGHT, LEFT, TOP, BOTTOM, FRONT, BACK]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The right face (facing positive X)
    RIGHT = 0,

    /// The left face (facing negative X)
    LEFT = 1,

    /// The top face (facing positive Y)
    TOP = 2,

    /// The bottom face (facing negative Y)
    BOTTOM = 3,

    /// The front face (facing positive Z)
    FRONT = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::RIGHT,
            BlockSide::LEFT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::FRONT,
            BlockSide::BACK,
        ]
    }

    /// The unit step from a block to its neighbour across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// Static directional shade hint handed to the renderer.
    ///
    /// Top faces are brightest, bottoms darkest, and the two horizontal axes
    /// are slightly different so that corners read clearly.
    pub fn shade(self) -> f32 {
        match self {
            BlockSide::TOP => 1.0,
            BlockSide::FRONT | BlockSide::BACK => 0.9,
            BlockSide::RIGHT | BlockSide::LEFT => 0.85,
            BlockSide::BOTTOM => 0.8,
        }
    }

    /// Decodes a side from the `u32` stored in a mesh face.
    pub fn from_u32(value: u32) -> Option<BlockSide> {
        num::FromPrimitive::from_u32(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_distinct_unit_steps() {
        let offsets: Vec<Vector3<i32>> =
            BlockSide::all().iter().map(|side| side.offset()).collect();
        for (i, offset) in offsets.iter().enumerate() {
            assert_eq!(offset.x.abs() + offset.y.abs() + offset.z.abs(), 1);
            assert!(!offsets[i + 1..].contains(offset));
        }
    }

    #[test]
    fn top_is_brighter_than_sides_and_sides_brighter_than_bottom() {
        for side in [BlockSide::RIGHT, BlockSide::LEFT, BlockSide::FRONT, BlockSide::BACK] {
            assert!(BlockSide::TOP.shade() > side.shade());
            assert!(side.shade() > BlockSide::BOTTOM.shade());
        }
    }

    #[test]
    fn discriminants_round_trip_through_u32() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_u32(side as u32), Some(side));
        }
        assert_eq!(BlockSide::from_u32(6), None);
    }
}

//! # Block Module
//!
//! This module provides the block-related definitions for the voxel engine:
//! block type attributes, block faces and the texture lookup the mesher uses.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each block type to its texture-atlas index for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array is indexed by `BlockSide`:
/// [Right, Left, Top, Bottom, Front, Back]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u32; 6]; 6] = [
    [0, 0, 0, 0, 0, 0], // AIR (never meshed)
    [1, 1, 1, 1, 1, 1], // DIRT
    [2, 2, 3, 1, 2, 2], // GRASS (top: 3, bottom: dirt, sides: 2)
    [5, 5, 5, 5, 5, 5], // STONE
    [0, 0, 6, 6, 0, 0], // WOOD (bark on the sides, rings on top and bottom)
    [7, 7, 7, 7, 7, 7], // GLASS
];

/// Gets the texture index for one face of a block type.
pub fn texture_index(block_type: BlockType, side: BlockSide) -> u32 {
    BLOCK_TYPE_TO_TEXTURE_INDICES[block_type as usize][side as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_has_distinct_top_and_bottom() {
        assert_eq!(texture_index(BlockType::GRASS, BlockSide::TOP), 3);
        assert_eq!(
            texture_index(BlockType::GRASS, BlockSide::BOTTOM),
            texture_index(BlockType::DIRT, BlockSide::TOP)
        );
        assert_eq!(texture_index(BlockType::GRASS, BlockSide::FRONT), 2);
    }
}

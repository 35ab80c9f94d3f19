//! # Chunk Block Storage
//!
//! Dense block storage for one chunk plus two bit masks kept in step with it:
//!
//! * `solid_mask` - one bit per cell, set when the cell is collidable
//! * `opaque_mask` - one bit per cell, set when the cell hides its neighbours
//!
//! The masks let the mesher skip air without reading block data and let the
//! culler ask "is this chunk completely opaque" in one pass over a few words.
//!
//! Cells are laid out X fastest, then Z, then Y: `x + 16 * z + 256 * y`. This is
//! also the order generators produce blocks in and the order the mesher scans.

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::{
    engine_state::voxels::block::block_type::BlockType,
    error::VoxelError,
};

use super::{chunk_iteration::ChunkBlockIterator, ChunkCoordinate, CHUNK_DIMENSION, CHUNK_SIZE};

const DIMENSION: usize = CHUNK_DIMENSION as usize;
const PLANE: usize = DIMENSION * DIMENSION;

// Out-of-range local positions are a programming error: fatal in debug builds,
// clamped to the chunk edge (and logged) in release builds.
cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        fn out_of_bounds(error: VoxelError, _local: Point3<usize>) -> usize {
            panic!("{error}");
        }
    } else {
        fn out_of_bounds(error: VoxelError, local: Point3<usize>) -> usize {
            log::error!("{error}, clamping to the chunk edge");
            let last = DIMENSION - 1;
            ChunkBlocks::index_of(local.x.min(last), local.y.min(last), local.z.min(last))
        }
    }
}

/// The block contents of a chunk.
///
/// Chunks hold this behind an `Arc` so background mesh tasks can take cheap
/// snapshots; the world store mutates through `Arc::make_mut`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkBlocks {
    blocks: Vec<BlockType>,
    solid_mask: BitVec,
    opaque_mask: BitVec,
}

impl ChunkBlocks {
    /// A chunk full of one block type.
    pub fn filled(block_type: BlockType) -> Self {
        Self {
            blocks: vec![block_type; CHUNK_SIZE],
            solid_mask: BitVec::repeat(block_type.is_solid(), CHUNK_SIZE),
            opaque_mask: BitVec::repeat(block_type.is_opaque(), CHUNK_SIZE),
        }
    }

    /// Wraps generator output, rejecting data of the wrong size.
    pub fn from_vec(coord: ChunkCoordinate, blocks: Vec<BlockType>) -> Result<Self, VoxelError> {
        if blocks.len() != CHUNK_SIZE {
            return Err(VoxelError::GeneratorFailure {
                coord,
                reason: format!("expected {} blocks, got {}", CHUNK_SIZE, blocks.len()),
            });
        }

        let solid_mask = blocks.iter().map(|block| block.is_solid()).collect();
        let opaque_mask = blocks.iter().map(|block| block.is_opaque()).collect();

        Ok(Self {
            blocks,
            solid_mask,
            opaque_mask,
        })
    }

    /// Flat index of an in-range local position.
    #[inline]
    pub fn index_of(x: usize, y: usize, z: usize) -> usize {
        x + DIMENSION * z + PLANE * y
    }

    /// Local position of a flat index.
    #[inline]
    pub fn position_of(index: usize) -> Point3<usize> {
        Point3::new(index % DIMENSION, index / PLANE, (index / DIMENSION) % DIMENSION)
    }

    /// Flat index of a local position, or `OutOfBounds`.
    pub fn checked_index(local: Point3<usize>) -> Result<usize, VoxelError> {
        if local.x < DIMENSION && local.y < DIMENSION && local.z < DIMENSION {
            Ok(Self::index_of(local.x, local.y, local.z))
        } else {
            Err(VoxelError::OutOfBounds {
                x: local.x as i64,
                y: local.y as i64,
                z: local.z as i64,
            })
        }
    }

    /// Flat index of a local position that callers promise is in range.
    fn index(local: Point3<usize>) -> usize {
        Self::checked_index(local).unwrap_or_else(|error| out_of_bounds(error, local))
    }

    pub fn get(&self, local: Point3<usize>) -> BlockType {
        self.blocks[Self::index(local)]
    }

    /// Writes a block and keeps both masks in step. Returns the previous block.
    pub fn set(&mut self, local: Point3<usize>, block_type: BlockType) -> BlockType {
        let index = Self::index(local);
        let previous = std::mem::replace(&mut self.blocks[index], block_type);
        self.solid_mask.set(index, block_type.is_solid());
        self.opaque_mask.set(index, block_type.is_opaque());
        previous
    }

    #[inline]
    pub fn is_opaque_index(&self, index: usize) -> bool {
        self.opaque_mask[index]
    }

    /// True when every cell is opaque. Such a chunk hides everything behind it.
    pub fn is_fully_opaque(&self) -> bool {
        self.opaque_mask.all()
    }

    /// True when no cell is solid. Such a chunk meshes to nothing.
    pub fn is_empty(&self) -> bool {
        self.solid_mask.not_any()
    }

    pub fn solid_count(&self) -> usize {
        self.solid_mask.count_ones()
    }

    /// Iterates the solid cells in scan order (Y, then Z, then X).
    pub fn iter_solid(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(&self.blocks, &self.solid_mask)
    }

    pub fn as_slice(&self) -> &[BlockType] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_generator_output() {
        let coord = ChunkCoordinate::new(0, 0, 0);
        let result = ChunkBlocks::from_vec(coord, vec![BlockType::STONE; 10]);
        assert!(matches!(result, Err(VoxelError::GeneratorFailure { .. })));
    }

    #[test]
    fn index_and_position_agree() {
        for index in [0, 1, 15, 16, 255, 256, 4095] {
            let position = ChunkBlocks::position_of(index);
            assert_eq!(ChunkBlocks::index_of(position.x, position.y, position.z), index);
        }
        assert_eq!(ChunkBlocks::index_of(1, 0, 0), 1);
        assert_eq!(ChunkBlocks::index_of(0, 0, 1), 16);
        assert_eq!(ChunkBlocks::index_of(0, 1, 0), 256);
    }

    #[test]
    fn set_keeps_masks_in_step() {
        let mut blocks = ChunkBlocks::filled(BlockType::AIR);
        assert!(blocks.is_empty());

        let previous = blocks.set(Point3::new(3, 4, 5), BlockType::GLASS);
        assert_eq!(previous, BlockType::AIR);
        assert!(!blocks.is_empty());
        assert_eq!(blocks.solid_count(), 1);
        assert!(!blocks.is_opaque_index(ChunkBlocks::index_of(3, 4, 5)));

        blocks.set(Point3::new(3, 4, 5), BlockType::STONE);
        assert!(blocks.is_opaque_index(ChunkBlocks::index_of(3, 4, 5)));
        assert_eq!(blocks.get(Point3::new(3, 4, 5)), BlockType::STONE);
    }

    #[test]
    fn fully_opaque_only_without_holes() {
        let mut blocks = ChunkBlocks::filled(BlockType::STONE);
        assert!(blocks.is_fully_opaque());
        blocks.set(Point3::new(0, 15, 0), BlockType::GLASS);
        assert!(!blocks.is_fully_opaque());
    }

    #[test]
    fn checked_index_reports_out_of_bounds() {
        assert!(ChunkBlocks::checked_index(Point3::new(15, 15, 15)).is_ok());
        assert!(matches!(
            ChunkBlocks::checked_index(Point3::new(16, 0, 0)),
            Err(VoxelError::OutOfBounds { x: 16, y: 0, z: 0 })
        ));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "outside the chunk")]
    fn out_of_bounds_access_is_fatal_in_debug_builds() {
        let blocks = ChunkBlocks::filled(BlockType::AIR);
        blocks.get(Point3::new(0, 16, 0));
    }
}

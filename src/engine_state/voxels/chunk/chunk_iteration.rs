//! # Chunk Iteration Module
//!
//! This module provides an iterator over the solid blocks of a chunk.
//!
//! ## Mask-Driven Iteration
//!
//! The `ChunkBlockIterator` walks the chunk's solid mask instead of the block
//! array, so air cells cost nothing beyond the bit scan. Positions come out in
//! storage order (X fastest, then Z, then Y), which is also the mesher's scan order.

use bitvec::{order::Lsb0, slice::IterOnes, vec::BitVec};
use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::ChunkBlocks;

/// An iterator over all solid blocks in a chunk.
///
/// Yields `(local_position, block_type)` pairs, skipping air cells by scanning
/// the set bits of the solid mask.
pub struct ChunkBlockIterator<'a> {
    /// The dense block array of the chunk being iterated over
    blocks: &'a [BlockType],
    /// Indices of the set bits in the solid mask
    solid_indices: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator`.
    ///
    /// # Arguments
    /// * `blocks` - The chunk's dense block array
    /// * `solid_mask` - The chunk's solid mask, one bit per entry of `blocks`
    ///
    /// # Returns
    /// A new `ChunkBlockIterator` positioned before the first solid block
    pub fn new(blocks: &'a [BlockType], solid_mask: &'a BitVec) -> Self {
        ChunkBlockIterator {
            blocks,
            solid_indices: solid_mask.iter_ones(),
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.solid_indices.next()?;
        Some((ChunkBlocks::position_of(index), self.blocks[index]))
    }
}

//! # Chunk Module
//!
//! This module provides the `VoxelChunk` struct and related functionality for
//! managing 16x16x16 blocks of voxel data.
//!
//! ## Storage
//!
//! Block data lives in a [`ChunkBlocks`] behind an `Arc`. The main thread is the
//! only writer and mutates through `Arc::make_mut`, so a mesh task holding an
//! older snapshot keeps seeing the data it was scheduled with while the chunk
//! moves on.
//!
//! ## Mesh Bookkeeping
//!
//! Every mutation or invalidation gives the chunk a new `revision` and sets
//! `dirty`. A mesh built from revision `r` is only accepted while the chunk is
//! still at revision `r`; anything older is stale and dropped. Revisions come
//! from one process-wide counter, so a chunk that is unloaded and loaded again
//! never reuses a revision from before.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cgmath::Point3;

use crate::engine_state::rendering::meshing::MeshData;

use super::block::block_type::BlockType;

mod chunk_blocks;
mod chunk_coordinate;
pub mod chunk_iteration;

pub use chunk_blocks::ChunkBlocks;
pub use chunk_coordinate::ChunkCoordinate;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION as usize;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world data. Each chunk knows its position,
/// owns its blocks, and caches the mesh last built for it.
#[derive(Debug)]
pub struct VoxelChunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    coordinate: ChunkCoordinate,

    /// Block contents, shared copy-on-write with in-flight mesh tasks.
    blocks: Arc<ChunkBlocks>,

    /// Set when `mesh` no longer reflects `blocks` or the chunk's neighbours.
    dirty: bool,

    /// The last mesh accepted for this chunk, possibly stale while `dirty`.
    mesh: Option<MeshData>,

    /// Replaced on every mutation and invalidation.
    revision: u64,
}

impl VoxelChunk {
    /// Creates a new chunk. New chunks start dirty and unmeshed.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk coordinates of the new chunk
    /// * `blocks` - The fully populated block contents
    pub fn new(coordinate: ChunkCoordinate, blocks: ChunkBlocks) -> Self {
        Self {
            coordinate,
            blocks: Arc::new(blocks),
            dirty: true,
            mesh: None,
            revision: next_revision(),
        }
    }

    /// Creates a chunk where every cell is air.
    pub fn empty(coordinate: ChunkCoordinate) -> Self {
        Self::new(coordinate, ChunkBlocks::filled(BlockType::AIR))
    }

    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    pub fn blocks(&self) -> &ChunkBlocks {
        &self.blocks
    }

    /// A cheap shared handle on the current block contents for background work.
    pub fn snapshot(&self) -> Arc<ChunkBlocks> {
        Arc::clone(&self.blocks)
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics in debug builds if the coordinates are out of bounds.
    pub fn get_block(&self, local: Point3<usize>) -> BlockType {
        self.blocks.get(local)
    }

    /// Sets the block at the specified chunk-relative coordinates.
    ///
    /// Writing the type a cell already holds changes nothing, not even the
    /// revision.
    ///
    /// # Returns
    /// The block type that was there before.
    pub fn set_block(&mut self, local: Point3<usize>, block_type: BlockType) -> BlockType {
        let previous = self.blocks.get(local);
        if previous == block_type {
            return previous;
        }

        Arc::make_mut(&mut self.blocks).set(local, block_type);
        self.mark_dirty();
        previous
    }

    /// Flags the mesh as stale, e.g. because a neighbour changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision = next_revision();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The last accepted mesh, which may be stale if the chunk is dirty.
    pub fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    /// True when the chunk has a mesh and nothing has invalidated it since.
    pub fn has_current_mesh(&self) -> bool {
        !self.dirty && self.mesh.is_some()
    }

    /// Installs a mesh built from the given revision.
    ///
    /// # Returns
    /// `false` (and leaves the chunk untouched) when the chunk has changed
    /// since the mesh was scheduled.
    pub fn apply_mesh(&mut self, revision: u64, mesh: MeshData) -> bool {
        if revision != self.revision {
            return false;
        }

        self.mesh = Some(mesh);
        self.dirty = false;
        true
    }
}

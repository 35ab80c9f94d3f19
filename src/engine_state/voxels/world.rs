//! # World Module
//!
//! This module provides the `WorldStore` struct which manages the collection of
//! loaded chunks in the voxel world.
//!
//! ## Architecture
//!
//! The world is sparse: only chunks that streaming has loaded are kept in memory,
//! keyed by [`ChunkCoordinate`]. Chunks never hold links to each other; neighbours
//! are found by looking up the adjacent coordinate.
//!
//! ## Invalidation
//!
//! The store is the only place that sets dirty flags. A block write marks the
//! owning chunk dirty and, when the block sits on a chunk face, the loaded chunk
//! across that face as well. Loading or unloading a chunk marks its loaded
//! neighbours dirty, since their boundary faces may have become hidden or exposed.

use std::collections::HashMap;

use cgmath::Point3;
use log::debug;

use crate::{
    engine_state::voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{ChunkBlocks, ChunkCoordinate, VoxelChunk, CHUNK_DIMENSION},
    },
    error::VoxelError,
};

/// Represents a voxel world composed of loaded chunks.
///
/// # Examples
///
/// ```
/// use voxel_world::{BlockType, ChunkCoordinate, WorldStore, CHUNK_SIZE};
/// use cgmath::Point3;
///
/// let mut world = WorldStore::new();
/// world
///     .load_chunk(ChunkCoordinate::new(0, 0, 0), vec![BlockType::AIR; CHUNK_SIZE])
///     .unwrap();
///
/// world.set_block(Point3::new(1, 2, 3), BlockType::STONE).unwrap();
/// assert_eq!(world.get_block(Point3::new(1, 2, 3)), BlockType::STONE);
/// ```
#[derive(Debug, Default)]
pub struct WorldStore {
    chunks: HashMap<ChunkCoordinate, VoxelChunk>,
}

impl WorldStore {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the block at a world block position.
    ///
    /// Unloaded space reads as air; this never fails.
    pub fn get_block(&self, world_pos: Point3<i32>) -> BlockType {
        let (coord, local) = ChunkCoordinate::from_world_block(world_pos);
        self.chunks
            .get(&coord)
            .map_or(BlockType::AIR, |chunk| chunk.get_block(local))
    }

    /// Writes the block at a world block position.
    ///
    /// # Arguments
    /// * `world_pos` - The world block position to write
    /// * `block_type` - The new block type
    ///
    /// # Returns
    /// The coordinates of every chunk marked dirty by the write: the owning chunk
    /// plus each loaded chunk sharing the block's boundary face(s). Empty when
    /// the block already had that type.
    ///
    /// # Errors
    /// `NotLoaded` if the owning chunk is not in the store.
    pub fn set_block(
        &mut self,
        world_pos: Point3<i32>,
        block_type: BlockType,
    ) -> Result<Vec<ChunkCoordinate>, VoxelError> {
        let (coord, local) = ChunkCoordinate::from_world_block(world_pos);
        let chunk = self
            .chunks
            .get_mut(&coord)
            .ok_or(VoxelError::NotLoaded(coord))?;

        if chunk.set_block(local, block_type) == block_type {
            return Ok(Vec::new());
        }

        let mut dirtied = vec![coord];
        for side in Self::boundary_sides(local) {
            let neighbor = coord.neighbor(side);
            if let Some(chunk) = self.chunks.get_mut(&neighbor) {
                chunk.mark_dirty();
                dirtied.push(neighbor);
            }
        }

        Ok(dirtied)
    }

    /// The chunk faces a local position touches. Empty for interior cells.
    fn boundary_sides(local: Point3<usize>) -> Vec<BlockSide> {
        let last = (CHUNK_DIMENSION - 1) as usize;
        let mut sides = Vec::new();
        if local.x == last {
            sides.push(BlockSide::RIGHT);
        }
        if local.x == 0 {
            sides.push(BlockSide::LEFT);
        }
        if local.y == last {
            sides.push(BlockSide::TOP);
        }
        if local.y == 0 {
            sides.push(BlockSide::BOTTOM);
        }
        if local.z == last {
            sides.push(BlockSide::FRONT);
        }
        if local.z == 0 {
            sides.push(BlockSide::BACK);
        }
        sides
    }

    /// Inserts a generated chunk.
    ///
    /// # Returns
    /// `true` if the chunk was inserted, `false` if it was already loaded (the
    /// existing chunk is kept and nothing else changes).
    ///
    /// # Errors
    /// `GeneratorFailure` if `blocks` does not hold exactly one chunk's worth of data.
    pub fn load_chunk(
        &mut self,
        coord: ChunkCoordinate,
        blocks: Vec<BlockType>,
    ) -> Result<bool, VoxelError> {
        if self.chunks.contains_key(&coord) {
            debug!("Chunk {coord} is already loaded, ignoring load");
            return Ok(false);
        }

        let blocks = ChunkBlocks::from_vec(coord, blocks)?;
        self.insert_chunk(VoxelChunk::new(coord, blocks));
        Ok(true)
    }

    /// Inserts an already-built chunk, replacing nothing.
    fn insert_chunk(&mut self, chunk: VoxelChunk) {
        let coord = chunk.coordinate();
        self.chunks.insert(coord, chunk);
        self.mark_neighbors_dirty(coord);
        debug!("Loaded chunk {coord}");
    }

    /// Removes a chunk and its mesh. No-op if the chunk is absent.
    ///
    /// # Returns
    /// The removed chunk, if there was one.
    pub fn unload_chunk(&mut self, coord: ChunkCoordinate) -> Option<VoxelChunk> {
        let removed = self.chunks.remove(&coord)?;
        self.mark_neighbors_dirty(coord);
        debug!("Unloaded chunk {coord}");
        Some(removed)
    }

    fn mark_neighbors_dirty(&mut self, coord: ChunkCoordinate) {
        for side in BlockSide::all() {
            if let Some(chunk) = self.chunks.get_mut(&coord.neighbor(side)) {
                chunk.mark_dirty();
            }
        }
    }

    /// The six face neighbours of a chunk in `BlockSide` order.
    pub fn neighbors(&self, coord: ChunkCoordinate) -> [Option<&VoxelChunk>; 6] {
        BlockSide::all().map(|side| self.chunks.get(&coord.neighbor(side)))
    }

    pub fn chunk(&self, coord: ChunkCoordinate) -> Option<&VoxelChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_mut(&mut self, coord: ChunkCoordinate) -> Option<&mut VoxelChunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn contains(&self, coord: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over every loaded chunk in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &VoxelChunk> {
        self.chunks.values()
    }

    /// All loaded coordinates, sorted.
    pub fn coordinates(&self) -> Vec<ChunkCoordinate> {
        let mut coordinates: Vec<_> = self.chunks.keys().copied().collect();
        coordinates.sort();
        coordinates
    }

    /// World-space bounding box of everything loaded, as `(min, max)` block corners.
    ///
    /// # Returns
    /// `None` when no chunk is loaded.
    pub fn loaded_bounds(&self) -> Option<(Point3<i32>, Point3<i32>)> {
        let mut coords = self.chunks.keys();
        let first = coords.next()?.0;
        let (min, max) = coords.fold((first, first), |(min, max), coord| {
            (
                Point3::new(min.x.min(coord.x()), min.y.min(coord.y()), min.z.min(coord.z())),
                Point3::new(max.x.max(coord.x()), max.y.max(coord.y()), max.z.max(coord.z())),
            )
        });

        Some((
            min * CHUNK_DIMENSION,
            Point3::new(max.x + 1, max.y + 1, max.z + 1) * CHUNK_DIMENSION,
        ))
    }
}

//! Mesh generation and management for voxel rendering.
//!
//! Meshes are rebuilt lazily: a chunk that becomes dirty keeps its old mesh
//! until it is next wanted for rendering, at which point the `MeshManager`
//! schedules a background rebuild on a snapshot of the chunk and its neighbours.
//!
//! # Architecture
//! - `MeshManager`: Tracks in-flight mesh builds and applies their results
//! - `mesh/`: The mesher itself and the face data it produces
//!
//! # Stale Results
//! A mesh task records the chunk revision it was built from. If the chunk has
//! changed (or been unloaded) by the time the result arrives, the result is
//! dropped and the chunk stays dirty, so it is rescheduled on the next frame.

use std::collections::HashMap;

use log::debug;

/// Core mesh generation algorithms and data structures.
mod mesh;

pub use mesh::*;

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
    task_management::task::Task,
    voxels::{chunk::ChunkCoordinate, world::WorldStore},
};

/// Schedules background mesh builds for dirty chunks.
#[derive(Debug, Default)]
pub struct MeshManager {
    /// Chunk revision each in-flight build was scheduled from.
    in_flight: HashMap<ChunkCoordinate, u64>,
}

impl MeshManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh task for a dirty chunk.
    ///
    /// # Returns
    /// `None` if the chunk is not loaded, is clean, or already has a build in
    /// flight for its current revision.
    pub fn schedule(
        &mut self,
        world: &WorldStore,
        coord: ChunkCoordinate,
    ) -> Option<Box<dyn Task + Send>> {
        let chunk = world.chunk(coord)?;
        if !chunk.is_dirty() || self.in_flight.get(&coord) == Some(&chunk.revision()) {
            return None;
        }

        let neighbors = world
            .neighbors(coord)
            .map(|neighbor| neighbor.map(|chunk| chunk.snapshot()));
        self.in_flight.insert(coord, chunk.revision());

        Some(Box::new(ChunkMeshGenerationTask::new(
            coord,
            chunk.revision(),
            chunk.snapshot(),
            neighbors,
        )))
    }

    /// Installs a finished mesh if the chunk is still at the revision it was built from.
    ///
    /// # Returns
    /// `true` if the mesh was installed.
    pub fn apply_result(
        &mut self,
        world: &mut WorldStore,
        coord: ChunkCoordinate,
        revision: u64,
        mesh: MeshData,
    ) -> bool {
        if self.in_flight.get(&coord) == Some(&revision) {
            self.in_flight.remove(&coord);
        }

        let Some(chunk) = world.chunk_mut(coord) else {
            debug!("Discarding mesh for unloaded chunk {coord}");
            return false;
        };

        let applied = chunk.apply_mesh(revision, mesh);
        if !applied {
            debug!(
                "Discarding stale mesh for chunk {} (built from revision {}, now {})",
                coord,
                revision,
                chunk.revision()
            );
        }
        applied
    }

    pub fn num_in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

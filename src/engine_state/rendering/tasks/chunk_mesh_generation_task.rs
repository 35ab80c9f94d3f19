//! Task for building chunk meshes in a background thread.
//!
//! The task carries copy-on-write snapshots of the chunk and its neighbours, so
//! the main thread can keep editing the world while the mesh is built. The
//! result is applied only if the chunk is still at the snapshot's revision.

use std::sync::Arc;

use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::{ChunkMesher, MeshData},
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::chunk::{ChunkBlocks, ChunkCoordinate},
};

/// A task that builds the mesh of one chunk.
pub struct ChunkMeshGenerationTask {
    /// The chunk being meshed
    coord: ChunkCoordinate,
    /// The chunk revision the snapshots were taken at
    revision: u64,
    /// Snapshot of the chunk's blocks
    blocks: Arc<ChunkBlocks>,
    /// Snapshots of the neighbouring chunks in `BlockSide` order
    neighbors: [Option<Arc<ChunkBlocks>>; 6],
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `coord` - The chunk to mesh
    /// * `revision` - The chunk's revision at snapshot time
    /// * `blocks` - Snapshot of the chunk's contents
    /// * `neighbors` - Snapshots of the neighbouring chunks, `None` where unloaded
    pub fn new(
        coord: ChunkCoordinate,
        revision: u64,
        blocks: Arc<ChunkBlocks>,
        neighbors: [Option<Arc<ChunkBlocks>>; 6],
    ) -> Self {
        ChunkMeshGenerationTask {
            coord,
            revision,
            blocks,
            neighbors,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let started = Instant::now();
        let neighbors = self.neighbors.each_ref().map(|n| n.as_deref());
        let mesh = ChunkMesher::build(self.coord, &self.blocks, neighbors);
        debug!(
            "Built mesh for chunk {} ({} faces) in {:?}",
            self.coord,
            mesh.len(),
            started.elapsed()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            coord: self.coord,
            revision: self.revision,
            mesh,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    coord: ChunkCoordinate,
    revision: u64,
    mesh: MeshData,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Installs the mesh unless the chunk changed or unloaded in the meantime.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        context
            .mesh_manager
            .apply_result(context.world, self.coord, self.revision, self.mesh);
        Vec::new()
    }
}

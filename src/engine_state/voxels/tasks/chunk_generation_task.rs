//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which runs the terrain
//! generator for one chunk on a worker thread. The streaming manager schedules
//! it when a chunk comes within range of the player.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crate::{
    engine_state::{
        task_management::task::{Task, TaskContext, TaskResult},
        voxels::{block::block_type::BlockType, chunk::ChunkCoordinate, generation::ChunkGenerator},
    },
    error::VoxelError,
};

/// A task that generates the blocks of one chunk.
pub struct ChunkGenerationTask {
    /// The chunk to generate
    coord: ChunkCoordinate,
    /// Which attempt this is, starting at 1
    attempt: u32,
    generator: Arc<dyn ChunkGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `coord` - The chunk coordinates to generate
    /// * `attempt` - The attempt number, echoed back in the result
    /// * `generator` - The terrain generator
    pub fn new(coord: ChunkCoordinate, attempt: u32, generator: Arc<dyn ChunkGenerator>) -> Self {
        ChunkGenerationTask {
            coord,
            attempt,
            generator,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "generator panicked".to_string()
    }
}

impl Task for ChunkGenerationTask {
    /// Runs the generator. A panicking generator is reported as a failure
    /// rather than taking the worker down with it.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.generator.generate(self.coord)))
            .unwrap_or_else(|payload| {
                Err(VoxelError::GeneratorFailure {
                    coord: self.coord,
                    reason: panic_message(payload),
                })
            });

        Box::new(ChunkGenerationTaskResult {
            coord: self.coord,
            attempt: self.attempt,
            outcome,
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    coord: ChunkCoordinate,
    attempt: u32,
    outcome: Result<Vec<BlockType>, VoxelError>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Hands the generated blocks to the streaming manager, which inserts them
    /// into the world if the chunk is still wanted. Meshing is picked up later
    /// by the frame loop, since the new chunk starts out dirty.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        context.streaming.complete(
            self.coord,
            self.attempt,
            self.outcome,
            context.world,
            context.now,
        );
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::StreamingConfig,
        rendering::meshing::MeshManager,
        voxels::{
            generation::FlatGenerator,
            streaming::{ChunkLoadState, StreamingManager},
            world::WorldStore,
        },
    };
    use cgmath::Point3;
    use web_time::Instant;

    struct PanickingGenerator;

    impl ChunkGenerator for PanickingGenerator {
        fn generate(&self, _coord: ChunkCoordinate) -> Result<Vec<BlockType>, VoxelError> {
            panic!("no terrain here")
        }
    }

    /// Streams in the single chunk at the origin and returns its final state.
    fn stream_origin(generator: Arc<dyn ChunkGenerator>, world: &mut WorldStore) -> Option<ChunkLoadState> {
        let config = StreamingConfig {
            load_radius: 0,
            unload_radius: 0,
            max_retries: 0,
            ..StreamingConfig::default()
        };
        let mut streaming = StreamingManager::new(config, generator);
        let mut mesh_manager = MeshManager::new();
        let now = Instant::now();

        let tasks = streaming.tick(Point3::new(1.0, 1.0, 1.0), world, now);
        assert_eq!(tasks.len(), 1);

        let mut context = TaskContext {
            world,
            streaming: &mut streaming,
            mesh_manager: &mut mesh_manager,
            now,
        };
        for task in tasks {
            assert!(task.process().handle_result(&mut context).is_empty());
        }
        streaming.state(ChunkCoordinate::new(0, 0, 0))
    }

    #[test]
    fn generated_chunks_enter_the_world() {
        let mut world = WorldStore::new();
        let state = stream_origin(Arc::new(FlatGenerator::new(4, BlockType::DIRT)), &mut world);

        assert_eq!(state, Some(ChunkLoadState::Loaded));
        assert_eq!(world.get_block(Point3::new(0, 3, 0)), BlockType::DIRT);
        assert_eq!(world.get_block(Point3::new(0, 4, 0)), BlockType::AIR);
    }

    #[test]
    fn generator_panics_become_failures() {
        let mut world = WorldStore::new();
        let state = stream_origin(Arc::new(PanickingGenerator), &mut world);

        assert_eq!(state, Some(ChunkLoadState::Failed));
        assert!(world.contains(ChunkCoordinate::new(0, 0, 0)));
    }

    #[test]
    fn panic_payloads_are_kept_as_reasons() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(7_u8)), "generator panicked");
    }
}

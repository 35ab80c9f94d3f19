//! # Engine State Module
//!
//! The core engine module that ties the voxel world, streaming, meshing,
//! culling and interaction together.
//!
//! ## Key Components
//!
//! * `VoxelEngine` - The facade driven by the host application each frame
//! * `camera_state` - Camera and projection, the source of the frustum
//! * `config` - Engine configuration
//! * `interaction` - Ray-based block selection, breaking and placing
//! * `rendering` - Visibility culling and chunk meshing
//! * `task_management` - Worker threads for generation and meshing
//! * `voxels` - Voxel data, chunks, terrain generation and streaming
//!
//! ## Frame Loop
//!
//! The host calls, once per frame:
//!
//! 1. [`VoxelEngine::tick`] with the player position, which streams chunks in
//!    and out and applies finished background work
//! 2. [`VoxelEngine::prepare_frame`] with the camera frustum, which returns the
//!    meshes to draw and schedules rebuilds for visible dirty chunks
//!
//! Block edits from input go through [`VoxelEngine::break_block`] and
//! [`VoxelEngine::place_block`] at any point in between.

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, info};
use web_time::Instant;

use crate::error::VoxelError;

pub mod camera_state;
pub mod config;
pub mod interaction;
pub mod rendering;
pub mod task_management;
pub mod voxels;

use config::EngineConfig;
use interaction::{InteractionRaycaster, RayHit};
use rendering::{
    culling::{Frustum, VisibilityCuller},
    meshing::{MeshData, MeshManager},
};
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    block::block_type::BlockType,
    chunk::ChunkCoordinate,
    generation::{generator_from_config, ChunkGenerator},
    streaming::StreamingManager,
    world::WorldStore,
};

/// The voxel world core, as seen by the host application.
///
/// Owns the world store and every system that reads or writes it. All world
/// mutation happens on the thread that owns the engine; worker threads only
/// ever see snapshots.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cgmath::{Deg, Point3};
/// use voxel_world::{Camera, EngineConfig, FlatGenerator, Projection, VoxelEngine, BlockType};
///
/// let mut config = EngineConfig::default();
/// config.worker_count = 0;
/// config.streaming.load_radius = 1;
/// config.streaming.unload_radius = 2;
///
/// let mut engine =
///     VoxelEngine::new(config, Arc::new(FlatGenerator::new(8, BlockType::GRASS))).unwrap();
///
/// let camera = Camera::new(Point3::new(8.0, 12.0, 8.0), Deg(0.0), Deg(-30.0));
/// let projection = Projection::new(800, 600, Deg(70.0), 0.1, 500.0);
///
/// engine.tick(camera.position);
/// let meshes = engine.prepare_frame(&camera.frustum(&projection), camera.position);
/// assert!(!meshes.is_empty());
/// ```
pub struct VoxelEngine {
    config: EngineConfig,
    world: WorldStore,
    streaming: StreamingManager,
    mesh_manager: MeshManager,
    task_manager: TaskManager,
    culler: VisibilityCuller,
    raycaster: InteractionRaycaster,
}

impl VoxelEngine {
    /// Creates an engine with an explicit terrain generator.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(config: EngineConfig, generator: Arc<dyn ChunkGenerator>) -> Result<Self, VoxelError> {
        config.validate()?;
        info!(
            "Starting voxel engine (load radius {}, unload radius {}, {} workers)",
            config.streaming.load_radius, config.streaming.unload_radius, config.worker_count
        );

        Ok(Self {
            world: WorldStore::new(),
            streaming: StreamingManager::new(config.streaming.clone(), generator),
            mesh_manager: MeshManager::new(),
            task_manager: TaskManager::new(config.worker_count),
            culler: VisibilityCuller::new(config.culling.occlusion),
            raycaster: InteractionRaycaster::new(config.interaction.reach),
            config,
        })
    }

    /// Creates an engine using the terrain generator the configuration describes.
    pub fn from_config(config: EngineConfig) -> Result<Self, VoxelError> {
        let generator = generator_from_config(&config.terrain);
        Self::new(config, generator)
    }

    /// Advances streaming and applies finished background work.
    ///
    /// # Arguments
    /// * `player_position` - The player's world-space position
    pub fn tick(&mut self, player_position: Point3<f32>) {
        self.tick_at(player_position, Instant::now());
    }

    /// [`tick`](Self::tick) with an explicit clock, for driving retry backoff deterministically.
    pub fn tick_at(&mut self, player_position: Point3<f32>, now: Instant) {
        let tasks = self.streaming.tick(player_position, &mut self.world, now);
        if !tasks.is_empty() {
            debug!("Publishing {} chunk generation tasks", tasks.len());
        }
        self.task_manager.publish_tasks(tasks);
        self.process_tasks(now);
    }

    fn process_tasks(&mut self, now: Instant) {
        self.task_manager.process_queued_tasks();
        let mut context = TaskContext {
            world: &mut self.world,
            streaming: &mut self.streaming,
            mesh_manager: &mut self.mesh_manager,
            now,
        };
        self.task_manager.process_completed_tasks(&mut context);
    }

    /// Selects the chunks to draw this frame and returns their meshes.
    ///
    /// Visible chunks that are dirty get a background rebuild scheduled. Until
    /// it lands they are drawn with their previous mesh, if they have one;
    /// chunks that were never meshed are left out.
    ///
    /// # Returns
    /// `(coordinate, mesh)` pairs ordered front to back.
    pub fn prepare_frame(
        &mut self,
        frustum: &Frustum,
        camera_position: Point3<f32>,
    ) -> Vec<(ChunkCoordinate, &MeshData)> {
        let visible: Vec<ChunkCoordinate> = self
            .culler
            .select(frustum, camera_position, &self.world)
            .iter()
            .map(|chunk| chunk.coordinate())
            .collect();

        for coord in &visible {
            if let Some(task) = self.mesh_manager.schedule(&self.world, *coord) {
                self.task_manager.publish_task(task);
            }
        }
        self.process_tasks(Instant::now());

        visible
            .into_iter()
            .filter_map(|coord| {
                self.world
                    .chunk(coord)
                    .and_then(|chunk| chunk.mesh())
                    .map(|mesh| (coord, mesh))
            })
            .collect()
    }

    /// Finds the block the player is looking at, within reach.
    pub fn raycast(&self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<RayHit> {
        InteractionRaycaster::cast(&self.world, origin, direction, self.raycaster.reach())
    }

    /// Breaks the block the player is looking at.
    pub fn break_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Result<Option<RayHit>, VoxelError> {
        self.raycaster.break_block(&mut self.world, origin, direction)
    }

    /// Places the configured block against the face the player is looking at.
    pub fn place_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Result<Option<Point3<i32>>, VoxelError> {
        let block_type = self.config.interaction.place_block;
        self.place_block_of(origin, direction, block_type)
    }

    /// Places a block of the given type against the face the player is looking at.
    pub fn place_block_of(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        block_type: BlockType,
    ) -> Result<Option<Point3<i32>>, VoxelError> {
        self.raycaster
            .place_block(&mut self.world, origin, direction, block_type)
    }

    /// True when no generation or mesh work is outstanding.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
            && self.streaming.num_in_flight() == 0
            && self.mesh_manager.num_in_flight() == 0
    }

    pub fn world(&self) -> &WorldStore {
        &self.world
    }

    pub fn streaming(&self) -> &StreamingManager {
        &self.streaming
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

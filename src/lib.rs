#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The core of a first-person block-world explorer: chunked voxel storage,
//! chunk meshing with hidden-face removal, frustum and occlusion culling,
//! streaming of chunks around the player, and ray-based block interaction.
//!
//! Rendering backends, input and terrain generators live outside the core. The
//! core hands out per-chunk face lists ready for upload, takes the camera and
//! player position each frame, and asks a [`ChunkGenerator`] for the contents of
//! new chunks.
//!
//! ## Key Modules
//!
//! * `engine_state` - The engine facade and every subsystem it drives
//! * `error` - The crate's error type
//!
//! ## Usage
//!
//! ```rust
//! use voxel_world::{init_logger, EngineConfig, VoxelEngine};
//! use cgmath::Point3;
//!
//! let _ = init_logger();
//!
//! let mut config = EngineConfig::default();
//! config.worker_count = 0;
//! config.streaming.load_radius = 1;
//! config.streaming.unload_radius = 1;
//!
//! let mut engine = VoxelEngine::from_config(config).unwrap();
//! engine.tick(Point3::new(0.0, 20.0, 0.0));
//! assert!(!engine.world().is_empty());
//! ```
//!
//! ## Threading
//!
//! The engine is driven from one thread. Chunk generation and meshing run on
//! a pool of worker threads and their results are applied back on the driving
//! thread, so world state never needs locking.

pub mod engine_state;
pub mod error;

pub use engine_state::{
    camera_state::camera::{Camera, Projection},
    config::{EngineConfig, StreamingConfig, TerrainConfig, TerrainKind},
    interaction::{InteractionRaycaster, RayHit},
    rendering::{
        culling::{Frustum, VisibilityCuller},
        meshing::{ChunkMesher, Face, MeshData, MeshManager},
    },
    task_management::TaskManager,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{ChunkBlocks, ChunkCoordinate, VoxelChunk, CHUNK_DIMENSION, CHUNK_SIZE},
        generation::{ChunkGenerator, FlatGenerator, PerlinTerrainGenerator},
        streaming::{ChunkLoadState, StreamingManager},
        world::WorldStore,
    },
    VoxelEngine,
};
pub use error::VoxelError;

/// Installs the `env_logger` logger, writing to stdout and filtered by `RUST_LOG`.
///
/// # Errors
/// Fails if a logger has already been installed.
pub fn init_logger() -> Result<(), log::SetLoggerError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()?;

    log::info!("Logger initialized");
    Ok(())
}

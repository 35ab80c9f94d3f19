//! # Errors
//!
//! The single error type shared by the world store, the streaming layer and the
//! configuration loader.

use thiserror::Error;

use crate::engine_state::voxels::chunk::ChunkCoordinate;

/// Everything that can go wrong inside the voxel core.
///
/// None of these are fatal to a running session: callers either ignore them
/// (a mutation aimed at unloaded space), retry (a generator failure) or fix
/// their input (configuration).
#[derive(Error, Debug)]
pub enum VoxelError {
    /// A mutation targeted a chunk that is not loaded.
    #[error("chunk {0} is not loaded")]
    NotLoaded(ChunkCoordinate),

    /// A chunk-local coordinate fell outside `[0, CHUNK_DIMENSION)`.
    #[error("local position ({x}, {y}, {z}) is outside the chunk")]
    OutOfBounds { x: i64, y: i64, z: i64 },

    /// The terrain generator failed or handed back malformed block data.
    #[error("generator failed for chunk {coord}: {reason}")]
    GeneratorFailure {
        coord: ChunkCoordinate,
        reason: String,
    },

    /// Configuration values that parse but make no sense together.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

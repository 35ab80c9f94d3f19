//! # Camera State Management
//!
//! This module holds the viewer's camera and projection and turns them into
//! the inputs the core consumes each frame: a position (for streaming and
//! ordering) and a frustum (for culling).

use cgmath::Point3;

use crate::engine_state::voxels::chunk::ChunkCoordinate;

pub mod camera;

use camera::{Camera, Projection};

/// The camera and its projection, as one unit.
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Perspective settings
    pub projection: Projection,
}

impl CameraState {
    pub fn new(camera: Camera, projection: Projection) -> Self {
        Self { camera, projection }
    }

    pub fn position(&self) -> Point3<f32> {
        self.camera.position
    }

    /// The chunk the camera is currently in.
    pub fn chunk_coordinate(&self) -> ChunkCoordinate {
        ChunkCoordinate::from_world_position(self.camera.position)
    }
}

//! Rendering-side systems for the voxel engine.
//!
//! The core stops short of the GPU: it decides which chunks are worth drawing
//! and produces their face lists, ready to be uploaded as instance data.
//!
//! - `culling`: Frustum extraction and per-frame visibility selection
//! - `meshing`: Face generation and background mesh scheduling
//! - `tasks`: The mesh build task run on worker threads

pub mod culling;
pub mod meshing;
pub mod tasks;

pub use meshing::MeshManager;

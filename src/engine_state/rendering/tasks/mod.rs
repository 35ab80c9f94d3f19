//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Builds mesh data for a chunk in the background

pub mod chunk_mesh_generation_task;

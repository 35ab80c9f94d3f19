//! # Voxel Task System
//!
//! Background tasks that produce voxel data. Generation runs on worker threads
//! so that streaming never stalls the frame loop; the results are applied to
//! the world on the main thread.

pub mod chunk_generation_task;

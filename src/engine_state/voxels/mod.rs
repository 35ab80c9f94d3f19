//! # Voxel World
//!
//! This module contains the voxel data model and the systems that fill it.
//!
//! ## Architecture
//!
//! * **Block**: Block types, their properties and the six block sides
//! * **Chunk**: Fixed 16x16x16 arrays of blocks with dirty tracking and a cached mesh
//! * **World**: The sparse store of loaded chunks, keyed by chunk coordinate
//! * **Generation**: Deterministic terrain generators
//! * **Streaming**: Loading and unloading chunks around the player
//! * **Tasks**: Background chunk generation
//!
//! ## Data Flow
//!
//! 1. Streaming requests chunks near the player as generation tasks
//! 2. Generated blocks are inserted into the world on the main thread
//! 3. Insertions and block edits mark chunks dirty
//! 4. The frame loop remeshes dirty chunks that are visible
//!
//! ## Thread Safety
//!
//! The world store is owned by the main thread. Workers only ever see
//! immutable `Arc` snapshots of chunk contents.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod streaming;
pub mod tasks;
pub mod world;

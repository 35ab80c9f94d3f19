//! Mesh generation for voxel rendering.
//!
//! This module converts chunk contents into the face list the renderer consumes.
//!
//! # Architecture
//! - [`ChunkMesher`]: hidden-face elimination over a chunk and its six neighbours
//! - [`MeshData`]: the ordered face list of one chunk
//! - [`Face`]: a single visible block face in GPU layout
//!
//! # Usage
//! ```
//! use voxel_world::{BlockType, ChunkBlocks, ChunkCoordinate, ChunkMesher};
//!
//! let blocks = ChunkBlocks::filled(BlockType::STONE);
//! let mesh = ChunkMesher::build(ChunkCoordinate::new(0, 0, 0), &blocks, [None; 6]);
//! // Only the outer shell of a solid chunk is visible.
//! assert_eq!(mesh.len(), 6 * 16 * 16);
//! ```

mod face;
mod mesh;
mod mesher;

pub use face::Face;
pub use mesh::MeshData;
pub use mesher::ChunkMesher;

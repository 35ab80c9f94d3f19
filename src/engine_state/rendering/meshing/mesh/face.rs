use bytemuck::{Pod, Zeroable};
use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType, texture_index};

/// A single visible block face, laid out for direct upload to the GPU.
///
/// A face is identified by the block that owns it and the side it sits on; the
/// renderer expands it into a quad. `#[repr(C)]` and `Pod` mean a face list can
/// be handed over as raw bytes without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Face {
    /// World-space minimum corner of the owning block
    pub position: [f32; 3],
    /// The `BlockSide` the face is on, as its discriminant
    pub normal: u32,
    /// Texture-atlas index for this block type and side
    pub texture_index: u32,
    /// Directional shade hint in `[0, 1]`
    pub shade: f32,
}

impl Face {
    /// Creates the face of a block on one of its sides.
    ///
    /// # Arguments
    /// * `block_position` - World block position of the owning block
    /// * `block_type` - The owning block's type, used for texture lookup
    /// * `side` - Which side of the block this face represents
    pub fn new(block_position: Point3<i32>, block_type: BlockType, side: BlockSide) -> Self {
        Face {
            position: [
                block_position.x as f32,
                block_position.y as f32,
                block_position.z as f32,
            ],
            normal: side as u32,
            texture_index: texture_index(block_type, side),
            shade: side.shade(),
        }
    }

    /// The side this face is on.
    pub fn side(&self) -> Option<BlockSide> {
        BlockSide::from_u32(self.normal)
    }

    /// World position of the block owning this face.
    pub fn block_position(&self) -> Point3<i32> {
        Point3::new(
            self.position[0] as i32,
            self.position[1] as i32,
            self.position[2] as i32,
        )
    }
}

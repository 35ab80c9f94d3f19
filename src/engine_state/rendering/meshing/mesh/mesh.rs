//! Mesh data handed from the core to the renderer.

use crate::engine_state::voxels::block::block_side::BlockSide;

use super::face::Face;

/// The visible faces of one chunk, in emission order.
///
/// Faces are ordered by block in scan order (Y, then Z, then X) and, within a
/// block, by side in `BlockSide` order. Identical chunk contents therefore always
/// produce byte-identical mesh data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    faces: Vec<Face>,
}

impl MeshData {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The face list as raw bytes, ready for a vertex or storage buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.faces)
    }

    /// Number of faces per side, indexed by `BlockSide`.
    pub fn face_counts(&self) -> [usize; 6] {
        let mut counts = [0; 6];
        for side in self.faces.iter().filter_map(Face::side) {
            counts[side as usize] += 1;
        }
        counts
    }

    /// Faces lying on the given side.
    pub fn faces_on(&self, side: BlockSide) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(move |face| face.normal == side as u32)
    }
}

impl FromIterator<Face> for MeshData {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        Self {
            faces: iter.into_iter().collect(),
        }
    }
}

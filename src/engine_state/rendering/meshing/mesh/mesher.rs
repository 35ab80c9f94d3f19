use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::block_side::BlockSide,
    chunk::{ChunkBlocks, ChunkCoordinate, CHUNK_DIMENSION},
    world::WorldStore,
};

use super::{face::Face, mesh::MeshData};

/// Converts chunk contents into visible faces.
///
/// A solid block gets a face on each side whose neighbouring cell is not opaque.
/// Cells across the chunk boundary are read from the neighbouring chunk; a
/// missing neighbour counts as air, so the chunk's outer faces stay visible until
/// the neighbour loads and invalidates it.
pub struct ChunkMesher;

impl ChunkMesher {
    /// Builds the mesh for one chunk from its blocks and its six neighbours.
    ///
    /// # Arguments
    /// * `coord` - The chunk being meshed, used to place faces in world space
    /// * `blocks` - The chunk's contents
    /// * `neighbors` - The neighbouring chunks' contents in `BlockSide` order,
    ///   `None` where no chunk is loaded
    ///
    /// # Returns
    /// The visible faces. Empty for an all-air or fully enclosed chunk.
    pub fn build(
        coord: ChunkCoordinate,
        blocks: &ChunkBlocks,
        neighbors: [Option<&ChunkBlocks>; 6],
    ) -> MeshData {
        let mut mesh = MeshData::new();

        for (local, block_type) in blocks.iter_solid() {
            let world_position = coord.world_block(local);
            for side in BlockSide::all() {
                if !Self::is_covered(blocks, &neighbors, local, side) {
                    mesh.push(Face::new(world_position, block_type, side));
                }
            }
        }

        mesh
    }

    /// Whether the cell next to `local` on `side` is opaque.
    fn is_covered(
        blocks: &ChunkBlocks,
        neighbors: &[Option<&ChunkBlocks>; 6],
        local: Point3<usize>,
        side: BlockSide,
    ) -> bool {
        let target = Point3::new(local.x as i32, local.y as i32, local.z as i32) + side.offset();
        let inside = |v: i32| (0..CHUNK_DIMENSION).contains(&v);

        if inside(target.x) && inside(target.y) && inside(target.z) {
            return blocks.is_opaque_index(ChunkBlocks::index_of(
                target.x as usize,
                target.y as usize,
                target.z as usize,
            ));
        }

        let wrapped = ChunkBlocks::index_of(
            target.x.rem_euclid(CHUNK_DIMENSION) as usize,
            target.y.rem_euclid(CHUNK_DIMENSION) as usize,
            target.z.rem_euclid(CHUNK_DIMENSION) as usize,
        );
        neighbors[side as usize].is_some_and(|neighbor| neighbor.is_opaque_index(wrapped))
    }

    /// Rebuilds the mesh of a loaded chunk in place if it is dirty.
    ///
    /// # Returns
    /// `true` if a new mesh was installed, `false` if the chunk is missing or
    /// already up to date.
    pub fn mesh_chunk(world: &mut WorldStore, coord: ChunkCoordinate) -> bool {
        let Some(chunk) = world.chunk(coord) else {
            return false;
        };
        if !chunk.is_dirty() {
            return false;
        }

        let started = Instant::now();
        let revision = chunk.revision();
        let neighbors = world.neighbors(coord).map(|n| n.map(|chunk| chunk.blocks()));
        let mesh = Self::build(coord, chunk.blocks(), neighbors);
        debug!(
            "Meshed chunk {} with {} faces in {:?}",
            coord,
            mesh.len(),
            started.elapsed()
        );

        world
            .chunk_mut(coord)
            .is_some_and(|chunk| chunk.apply_mesh(revision, mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn single_block(local: Point3<usize>, block_type: BlockType) -> ChunkBlocks {
        let mut blocks = ChunkBlocks::filled(BlockType::AIR);
        blocks.set(local, block_type);
        blocks
    }

    #[test]
    fn air_chunk_meshes_to_nothing() {
        let coord = ChunkCoordinate::new(0, 0, 0);
        let mesh = ChunkMesher::build(coord, &ChunkBlocks::filled(BlockType::AIR), [None; 6]);
        assert!(mesh.is_empty());
    }

    #[test]
    fn isolated_block_has_one_face_per_side_in_order() {
        let coord = ChunkCoordinate::new(1, 0, -1);
        let blocks = single_block(Point3::new(4, 5, 6), BlockType::DIRT);
        let mesh = ChunkMesher::build(coord, &blocks, [None; 6]);

        let sides: Vec<_> = mesh.faces().iter().filter_map(Face::side).collect();
        assert_eq!(sides, BlockSide::all().to_vec());
        assert!(mesh
            .faces()
            .iter()
            .all(|face| face.position == [20.0, 5.0, -10.0]));
    }

    #[test]
    fn adjacent_blocks_hide_their_shared_faces() {
        let mut blocks = single_block(Point3::new(4, 5, 6), BlockType::STONE);
        blocks.set(Point3::new(5, 5, 6), BlockType::STONE);
        let mesh = ChunkMesher::build(ChunkCoordinate::new(0, 0, 0), &blocks, [None; 6]);

        assert_eq!(mesh.len(), 10);
        assert_eq!(mesh.face_counts()[BlockSide::RIGHT as usize], 1);
        assert_eq!(mesh.face_counts()[BlockSide::LEFT as usize], 1);
    }

    #[test]
    fn glass_does_not_hide_its_neighbors() {
        let mut blocks = single_block(Point3::new(4, 5, 6), BlockType::STONE);
        blocks.set(Point3::new(4, 6, 6), BlockType::GLASS);
        let mesh = ChunkMesher::build(ChunkCoordinate::new(0, 0, 0), &blocks, [None; 6]);

        // The stone's top stays visible through the glass; the glass's bottom is
        // hidden by the stone.
        assert_eq!(mesh.len(), 11);
        assert_eq!(mesh.face_counts()[BlockSide::TOP as usize], 2);
        assert_eq!(mesh.face_counts()[BlockSide::BOTTOM as usize], 1);
    }

    #[test]
    fn opaque_neighbor_chunk_hides_boundary_faces() {
        let blocks = single_block(Point3::new(0, 0, 0), BlockType::STONE);
        let solid = ChunkBlocks::filled(BlockType::STONE);
        let mut neighbors = [None; 6];
        neighbors[BlockSide::LEFT as usize] = Some(&solid);
        neighbors[BlockSide::BOTTOM as usize] = Some(&solid);

        let mesh = ChunkMesher::build(ChunkCoordinate::new(0, 0, 0), &blocks, neighbors);
        let counts = mesh.face_counts();
        assert_eq!(mesh.len(), 4);
        assert_eq!(counts[BlockSide::LEFT as usize], 0);
        assert_eq!(counts[BlockSide::BOTTOM as usize], 0);
    }

    #[test]
    fn mesh_chunk_skips_clean_chunks() {
        let mut world = WorldStore::new();
        let coord = ChunkCoordinate::new(0, 0, 0);
        world
            .load_chunk(coord, single_block(Point3::new(1, 1, 1), BlockType::STONE).as_slice().to_vec())
            .unwrap();

        assert!(ChunkMesher::mesh_chunk(&mut world, coord));
        assert_eq!(world.chunk(coord).unwrap().mesh().unwrap().len(), 6);
        assert!(!ChunkMesher::mesh_chunk(&mut world, coord));
        assert!(!ChunkMesher::mesh_chunk(&mut world, ChunkCoordinate::new(9, 9, 9)));
    }
}

//! Properties of the world store, mesher, culler and raycaster, exercised
//! through the public API.

use cgmath::{Deg, Point3, Vector3};
use voxel_world::{
    BlockSide, BlockType, Camera, ChunkBlocks, ChunkCoordinate, ChunkMesher, InteractionRaycaster,
    Projection, VisibilityCuller, WorldStore, CHUNK_SIZE,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load(world: &mut WorldStore, coord: ChunkCoordinate, block_type: BlockType) {
    world.load_chunk(coord, vec![block_type; CHUNK_SIZE]).unwrap();
}

fn mesh_all(world: &mut WorldStore) {
    for coord in world.coordinates() {
        ChunkMesher::mesh_chunk(world, coord);
    }
}

#[test]
fn enclosed_chunk_has_no_faces() {
    init();
    let mut world = WorldStore::new();
    let center = ChunkCoordinate::new(0, 0, 0);
    load(&mut world, center, BlockType::STONE);
    for side in BlockSide::all() {
        load(&mut world, center.neighbor(side), BlockType::DIRT);
    }

    assert!(ChunkMesher::mesh_chunk(&mut world, center));
    assert!(world.chunk(center).unwrap().mesh().unwrap().is_empty());
}

#[test]
fn isolated_block_on_a_chunk_corner_has_six_faces() {
    init();
    let mut world = WorldStore::new();
    for x in 0..2 {
        for y in 0..2 {
            for z in 0..2 {
                load(&mut world, ChunkCoordinate::new(x, y, z), BlockType::AIR);
            }
        }
    }
    world.set_block(Point3::new(15, 15, 15), BlockType::WOOD).unwrap();
    mesh_all(&mut world);

    let mut counts = [0; 6];
    for chunk in world.chunks() {
        for (total, count) in counts.iter_mut().zip(chunk.mesh().unwrap().face_counts()) {
            *total += count;
        }
    }
    assert_eq!(counts, [1; 6]);

    let mesh = world.chunk(ChunkCoordinate::new(0, 0, 0)).unwrap().mesh().unwrap();
    assert!(mesh
        .faces()
        .iter()
        .all(|face| face.block_position() == Point3::new(15, 15, 15)));
}

#[test]
fn meshing_is_byte_identical() {
    let coord = ChunkCoordinate::new(-2, 0, 5);
    let mut blocks = ChunkBlocks::filled(BlockType::AIR);
    for i in 0..CHUNK_SIZE {
        if fastrand::u8(0..3) == 0 {
            blocks.set(ChunkBlocks::position_of(i), BlockType::get_random_type());
        }
    }
    let neighbour = ChunkBlocks::filled(BlockType::GLASS);
    let neighbours = [Some(&neighbour), None, None, Some(&neighbour), None, None];

    let first = ChunkMesher::build(coord, &blocks, neighbours);
    let second = ChunkMesher::build(coord, &blocks, neighbours);
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn boundary_edits_invalidate_both_chunks_and_hide_the_shared_faces() {
    init();
    let mut world = WorldStore::new();
    let chunk = ChunkCoordinate::new(1, 0, 0);
    let west = ChunkCoordinate::new(0, 0, 0);
    load(&mut world, chunk, BlockType::AIR);
    load(&mut world, west, BlockType::AIR);
    world.set_block(Point3::new(15, 4, 7), BlockType::STONE).unwrap();
    mesh_all(&mut world);
    assert!(!world.chunk(chunk).unwrap().is_dirty());
    assert!(!world.chunk(west).unwrap().is_dirty());

    // Local (0, 4, 7) in chunk (1, 0, 0).
    let mut dirtied = world.set_block(Point3::new(16, 4, 7), BlockType::STONE).unwrap();
    dirtied.sort();
    assert_eq!(dirtied, vec![west, chunk]);
    assert!(world.chunk(chunk).unwrap().is_dirty());
    assert!(world.chunk(west).unwrap().is_dirty());

    mesh_all(&mut world);
    let west_mesh = world.chunk(west).unwrap().mesh().unwrap();
    let chunk_mesh = world.chunk(chunk).unwrap().mesh().unwrap();
    assert_eq!(west_mesh.faces_on(BlockSide::RIGHT).count(), 0);
    assert_eq!(chunk_mesh.faces_on(BlockSide::LEFT).count(), 0);
    assert_eq!(west_mesh.len() + chunk_mesh.len(), 10);
}

#[test]
fn loading_twice_is_loading_once() {
    init();
    let mut world = WorldStore::new();
    let coord = ChunkCoordinate::new(3, -1, 2);

    assert!(world.load_chunk(coord, vec![BlockType::DIRT; CHUNK_SIZE]).unwrap());
    let revision = world.chunk(coord).unwrap().revision();
    assert!(!world.load_chunk(coord, vec![BlockType::STONE; CHUNK_SIZE]).unwrap());

    assert_eq!(world.len(), 1);
    assert_eq!(world.chunk(coord).unwrap().revision(), revision);
    assert_eq!(world.get_block(Point3::new(48, -16, 32)), BlockType::DIRT);
}

#[test]
fn downward_ray_hits_the_top_face() {
    let mut world = WorldStore::new();
    load(&mut world, ChunkCoordinate::new(0, 0, 0), BlockType::AIR);
    world.set_block(Point3::new(0, 5, 0), BlockType::STONE).unwrap();

    let hit = InteractionRaycaster::cast(
        &world,
        Point3::new(0.5, 10.0, 0.5),
        Vector3::new(0.0, -1.0, 0.0),
        16.0,
    )
    .unwrap();

    assert_eq!(hit.block_pos, Point3::new(0, 5, 0));
    assert_eq!(hit.face, BlockSide::TOP);
    assert!((hit.distance - 5.0).abs() < 1e-5);
    assert!((hit.entry_distance - 4.0).abs() < 1e-5);
}

#[test]
fn chunks_behind_the_near_plane_are_never_selected() {
    init();
    let mut world = WorldStore::new();
    let behind = ChunkCoordinate::new(0, 0, 0);
    let ahead = ChunkCoordinate::new(0, 0, 4);
    load(&mut world, behind, BlockType::STONE);
    load(&mut world, ahead, BlockType::STONE);
    mesh_all(&mut world);

    // Looking along +Z from just past the far side of the first chunk.
    let camera = Camera::new(Point3::new(8.0, 8.0, 20.0), Deg(90.0), Deg(0.0));
    let frustum = camera.frustum(&Projection::new(800, 600, Deg(90.0), 0.1, 500.0));

    for occlusion in [false, true] {
        let selected: Vec<_> = VisibilityCuller::new(occlusion)
            .select(&frustum, camera.position, &world)
            .iter()
            .map(|chunk| chunk.coordinate())
            .collect();
        assert_eq!(selected, vec![ahead]);
    }
}

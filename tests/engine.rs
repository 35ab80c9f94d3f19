//! End-to-end tests of the engine facade: streaming, background work and
//! block interaction.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    thread,
};

use cgmath::{Deg, Point3};
use voxel_world::{
    BlockType, Camera, ChunkCoordinate, ChunkGenerator, ChunkLoadState, EngineConfig,
    FlatGenerator, Projection, VoxelEngine, VoxelError,
};
use web_time::{Duration, Instant};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn inline_config(load_radius: u32, unload_radius: u32) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.worker_count = 0;
    config.streaming.load_radius = load_radius;
    config.streaming.unload_radius = unload_radius;
    config.streaming.load_budget_per_tick = 1000;
    config.streaming.max_in_flight = 1000;
    config.streaming.retry_backoff_ms = 0;
    config
}

fn flat() -> Arc<dyn ChunkGenerator> {
    Arc::new(FlatGenerator::new(8, BlockType::GRASS))
}

/// Center of the given chunk in world space.
fn center_of(x: i32, y: i32, z: i32) -> Point3<f32> {
    ChunkCoordinate::new(x, y, z).center()
}

/// Fails the first request for every coordinate in `flaky`, and every request
/// for coordinates in `broken`.
struct UnreliableGenerator {
    inner: FlatGenerator,
    flaky: Mutex<HashSet<ChunkCoordinate>>,
    broken: HashSet<ChunkCoordinate>,
}

impl ChunkGenerator for UnreliableGenerator {
    fn generate(&self, coord: ChunkCoordinate) -> Result<Vec<BlockType>, VoxelError> {
        let first_try = self
            .flaky
            .lock()
            .map(|mut flaky| flaky.remove(&coord))
            .unwrap_or(false);
        if first_try || self.broken.contains(&coord) {
            return Err(VoxelError::GeneratorFailure {
                coord,
                reason: "unavailable".to_string(),
            });
        }
        self.inner.generate(coord)
    }
}

#[test]
fn invalid_configurations_are_rejected() {
    let config = inline_config(5, 3);
    assert!(matches!(
        VoxelEngine::new(config, flat()),
        Err(VoxelError::InvalidConfig(_))
    ));

    let parsed = EngineConfig::from_json_str(r#"{ "streaming": { "load_budget_per_tick": 0 } }"#);
    assert!(matches!(parsed, Err(VoxelError::InvalidConfig(_))));
}

#[test]
fn chunks_between_the_radii_survive_player_movement() {
    init();
    let mut engine = VoxelEngine::new(inline_config(4, 6), flat()).unwrap();
    let edge = ChunkCoordinate::new(-4, 0, 0);

    engine.tick(center_of(0, 0, 0));
    assert_eq!(engine.world().len(), 9 * 9 * 9);
    assert!(engine.is_idle());

    // `edge` is now at distance 5.
    engine.tick(center_of(1, 0, 0));
    assert!(engine.world().contains(edge));
    assert_eq!(engine.streaming().state(edge), Some(ChunkLoadState::Loaded));
    assert!(engine.world().contains(ChunkCoordinate::new(5, 0, 0)));

    // And now at distance 7.
    engine.tick(center_of(3, 0, 0));
    assert!(!engine.world().contains(edge));
    assert_eq!(engine.streaming().state(edge), None);
}

#[test]
fn flaky_generation_is_retried() {
    init();
    let origin = ChunkCoordinate::new(0, 0, 0);
    let generator = UnreliableGenerator {
        inner: FlatGenerator::new(8, BlockType::STONE),
        flaky: Mutex::new(HashSet::from([origin])),
        broken: HashSet::new(),
    };
    let mut engine = VoxelEngine::new(inline_config(0, 0), Arc::new(generator)).unwrap();
    let now = Instant::now();

    engine.tick_at(center_of(0, 0, 0), now);
    assert!(!engine.world().contains(origin));
    assert!(matches!(
        engine.streaming().state(origin),
        Some(ChunkLoadState::AwaitingRetry { attempt: 2, .. })
    ));

    engine.tick_at(center_of(0, 0, 0), now + Duration::from_millis(10));
    assert_eq!(engine.streaming().state(origin), Some(ChunkLoadState::Loaded));
    assert_eq!(engine.world().get_block(Point3::new(3, 7, 3)), BlockType::STONE);
}

#[test]
fn broken_chunks_become_air_and_neighbours_still_load() {
    init();
    let origin = ChunkCoordinate::new(0, 0, 0);
    let generator = UnreliableGenerator {
        inner: FlatGenerator::new(8, BlockType::STONE),
        flaky: Mutex::new(HashSet::new()),
        broken: HashSet::from([origin]),
    };
    let mut engine = VoxelEngine::new(inline_config(1, 1), Arc::new(generator)).unwrap();
    let now = Instant::now();

    engine.tick_at(center_of(0, 0, 0), now);
    engine.tick_at(center_of(0, 0, 0), now + Duration::from_millis(10));

    assert_eq!(engine.streaming().state(origin), Some(ChunkLoadState::Failed));
    assert!(engine.streaming().has_failed(origin));
    assert_eq!(engine.world().len(), 27);
    assert!(engine.world().chunk(origin).unwrap().blocks().is_empty());
    assert_eq!(
        engine.world().get_block(Point3::new(20, 3, 3)),
        BlockType::STONE
    );
}

#[test]
fn prepare_frame_meshes_visible_chunks_and_keeps_stale_meshes_drawable() {
    init();
    let mut engine = VoxelEngine::new(inline_config(1, 1), flat()).unwrap();
    let camera = Camera::new(Point3::new(8.0, 12.0, 8.0), Deg(0.0), Deg(-60.0));
    let projection = Projection::new(800, 600, Deg(70.0), 0.1, 500.0);
    let frustum = camera.frustum(&projection);
    let home = ChunkCoordinate::new(0, 0, 0);

    engine.tick(camera.position);
    let drawn: Vec<ChunkCoordinate> = engine
        .prepare_frame(&frustum, camera.position)
        .iter()
        .map(|(coord, _)| *coord)
        .collect();
    assert!(drawn.contains(&home));
    assert!(engine.world().chunk(home).unwrap().has_current_mesh());

    let faces_before = engine.world().chunk(home).unwrap().mesh().unwrap().len();
    let hit = engine
        .break_block(camera.position, camera.forward())
        .unwrap()
        .expect("the ground is within reach");
    assert_eq!(hit.block_pos.y, 7);
    assert!(engine.world().chunk(home).unwrap().is_dirty());
    assert_eq!(
        engine.world().chunk(home).unwrap().mesh().unwrap().len(),
        faces_before
    );

    engine.prepare_frame(&frustum, camera.position);
    let chunk = engine.world().chunk(home).unwrap();
    assert!(chunk.has_current_mesh());
    // A hole in the grass exposes four side faces and the floor below.
    assert_eq!(chunk.mesh().unwrap().len(), faces_before + 4);
}

#[test]
fn placing_builds_against_the_hit_face() {
    init();
    let mut engine = VoxelEngine::new(inline_config(0, 0), flat()).unwrap();
    engine.tick(center_of(0, 0, 0));

    let origin = Point3::new(4.5, 12.5, 4.5);
    let down = cgmath::Vector3::new(0.0, -1.0, 0.0);
    let placed = engine.place_block_of(origin, down, BlockType::WOOD).unwrap();

    assert_eq!(placed, Some(Point3::new(4, 8, 4)));
    assert_eq!(engine.world().get_block(Point3::new(4, 8, 4)), BlockType::WOOD);
    assert_eq!(engine.raycast(origin, down).unwrap().block_pos, Point3::new(4, 8, 4));
}

#[test]
fn worker_threads_stream_and_mesh_the_world() {
    init();
    let mut config = inline_config(1, 1);
    config.worker_count = 2;
    let mut engine = VoxelEngine::new(config, flat()).unwrap();
    let camera = Camera::new(Point3::new(8.0, 12.0, 8.0), Deg(0.0), Deg(-60.0));
    let frustum = camera.frustum(&Projection::new(800, 600, Deg(70.0), 0.1, 500.0));
    let home = ChunkCoordinate::new(0, 0, 0);

    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        engine.tick(camera.position);
        engine.prepare_frame(&frustum, camera.position);

        let done = engine.is_idle()
            && engine.world().len() == 27
            && engine
                .world()
                .chunk(home)
                .is_some_and(|chunk| chunk.has_current_mesh());
        if done || Instant::now() > deadline {
            break;
        }
        thread::sleep(std::time::Duration::from_millis(1));
    }

    assert_eq!(engine.world().len(), 27);
    assert!(engine.world().chunk(home).unwrap().has_current_mesh());
    assert_eq!(engine.streaming().num_in_flight(), 0);
}

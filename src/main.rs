//! # Headless Fly-Through
//!
//! Drives the voxel core without a window: a camera flies in a straight line
//! over generated terrain, breaking and placing a block now and then, while the
//! engine logs what it streams, meshes and culls.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

use std::{thread, time::Duration};

use cgmath::{Deg, Point3, Vector3};
use log::info;
use voxel_world::{
    engine_state::camera_state::CameraState, init_logger, Camera, EngineConfig, Projection,
    VoxelEngine, VoxelError,
};

const FRAMES: usize = 240;
const FLIGHT_SPEED: f32 = 0.5;

fn main() -> Result<(), VoxelError> {
    let _ = init_logger();

    let mut engine = VoxelEngine::from_config(EngineConfig::default())?;
    let mut view = CameraState::new(
        Camera::new(Point3::new(0.0, 40.0, 0.0), Deg(0.0), Deg(-35.0)),
        Projection::new(1280, 720, Deg(70.0), 0.1, 500.0),
    );
    let mut last_chunk = view.chunk_coordinate();

    for frame in 0..FRAMES {
        view.camera.position += Vector3::new(FLIGHT_SPEED, 0.0, 0.0);
        let camera = view.camera;
        if view.chunk_coordinate() != last_chunk {
            last_chunk = view.chunk_coordinate();
            info!("Camera entered chunk {last_chunk}");
        }

        engine.tick(camera.position);
        let frustum = camera.frustum(&view.projection);
        let visible = engine.prepare_frame(&frustum, camera.position);
        let faces: usize = visible.iter().map(|(_, mesh)| mesh.len()).sum();
        let chunks_drawn = visible.len();

        if frame % 60 == 30 {
            if let Some(hit) = engine.break_block(camera.position, camera.forward())? {
                info!("Broke block at {:?} ({:.2} away)", hit.block_pos, hit.entry_distance);
            }
        } else if frame % 60 == 45 {
            if let Some(position) = engine.place_block(camera.position, camera.forward())? {
                info!("Placed block at {:?}", position);
            }
        }

        if frame % 30 == 0 {
            info!(
                "Frame {frame}: {} chunks loaded, {chunks_drawn} drawn, {faces} faces",
                engine.world().len()
            );
            engine.streaming().log_summary();
        }

        thread::sleep(Duration::from_millis(16));
    }

    while !engine.is_idle() {
        engine.tick(view.position());
        thread::sleep(Duration::from_millis(1));
    }
    info!("Fly-through finished with {} chunks loaded", engine.world().len());
    Ok(())
}

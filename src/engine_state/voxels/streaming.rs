//! # Chunk Streaming
//!
//! Keeps the set of loaded chunks centred on the player.
//!
//! ## Policy
//!
//! Distances are Chebyshev distances in chunk space, so the loaded region is a
//! cube around the player's chunk. Chunks within `load_radius` are requested;
//! chunks beyond `unload_radius` are dropped. Between the two radii nothing
//! changes, which keeps a player walking back and forth over a chunk border
//! from loading and unloading the same chunks every frame.
//!
//! ## Lifecycle
//!
//! ```text
//! untracked -> Loading -> Loaded -> untracked
//!                 |
//!                 +-> AwaitingRetry -> Loading -> ... -> Failed
//! ```
//!
//! A coordinate is `Loading` while its generation task is outstanding. A failed
//! attempt waits out a backoff and is retried; once retries are exhausted the
//! coordinate is marked `Failed`, remembered, and filled with an all-air
//! placeholder so the world has no hole in it.
//!
//! Unloading only forgets the coordinate's state. A generation result arriving
//! for a coordinate that is no longer `Loading` is discarded, which is how
//! in-flight requests get cancelled.

use std::{
    collections::{HashMap, HashSet},
    num::NonZeroUsize,
    sync::Arc,
};

use cgmath::Point3;
use log::{debug, info, warn};
use lru::LruCache;
use web_time::{Duration, Instant};

use crate::{
    engine_state::{
        config::StreamingConfig,
        task_management::task::Task,
        voxels::{
            block::block_type::BlockType,
            chunk::{ChunkCoordinate, CHUNK_SIZE},
            generation::ChunkGenerator,
            tasks::chunk_generation_task::ChunkGenerationTask,
            world::WorldStore,
        },
    },
    error::VoxelError,
};

/// Where a tracked coordinate is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLoadState {
    /// A generation task for this attempt (1-based) is outstanding.
    Loading { attempt: u32 },
    /// The previous attempt failed; the next one may start at `retry_at`.
    AwaitingRetry { attempt: u32, retry_at: Instant },
    /// The chunk is in the world store.
    Loaded,
    /// Generation kept failing; an air placeholder is in the world store.
    Failed,
}

/// Decides which chunks to load and unload as the player moves.
pub struct StreamingManager {
    config: StreamingConfig,
    generator: Arc<dyn ChunkGenerator>,
    states: HashMap<ChunkCoordinate, ChunkLoadState>,
    /// Coordinates with a generation task outstanding, whether or not still wanted.
    in_flight: HashSet<ChunkCoordinate>,
    /// Coordinates whose generation failed for good, with the last reason.
    failed: LruCache<ChunkCoordinate, String>,
    player_chunk: Option<ChunkCoordinate>,
}

impl StreamingManager {
    /// Creates a streaming manager.
    ///
    /// # Arguments
    /// * `config` - Radii, budgets and retry policy (assumed validated)
    /// * `generator` - The terrain generator used for every chunk
    pub fn new(config: StreamingConfig, generator: Arc<dyn ChunkGenerator>) -> Self {
        let capacity = NonZeroUsize::new(config.failed_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            generator,
            states: HashMap::new(),
            in_flight: HashSet::new(),
            failed: LruCache::new(capacity),
            player_chunk: None,
        }
    }

    /// Advances streaming for the player's current position.
    ///
    /// In order: unloads everything tracked beyond the unload radius, reissues
    /// retries whose backoff has elapsed, then requests untracked chunks within
    /// the load radius, nearest first. New requests are limited by
    /// `load_budget_per_tick` and by `max_in_flight`.
    ///
    /// # Returns
    /// The generation tasks to publish.
    pub fn tick(
        &mut self,
        player_position: Point3<f32>,
        world: &mut WorldStore,
        now: Instant,
    ) -> Vec<Box<dyn Task + Send>> {
        let center = ChunkCoordinate::from_world_position(player_position);
        if self.player_chunk != Some(center) {
            debug!("Player entered chunk {center}");
            self.player_chunk = Some(center);
        }

        self.unload_distant(center, world);

        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();
        let mut budget = self.config.load_budget_per_tick;

        for coord in self.due_retries(now) {
            if budget == 0 || self.in_flight.len() >= self.config.max_in_flight {
                return tasks;
            }
            if let Some(ChunkLoadState::AwaitingRetry { attempt, .. }) = self.states.get(&coord).copied() {
                tasks.push(self.request(coord, attempt));
                budget -= 1;
            }
        }

        for coord in self.wanted(center) {
            if budget == 0 || self.in_flight.len() >= self.config.max_in_flight {
                break;
            }

            if let Some(reason) = self.failed.get(&coord) {
                debug!("Chunk {coord} failed before ({reason}), loading placeholder");
                self.load_placeholder(coord, world);
            } else {
                tasks.push(self.request(coord, 1));
            }
            budget -= 1;
        }

        tasks
    }

    /// Forgets every tracked coordinate beyond the unload radius and removes
    /// its chunk from the world.
    fn unload_distant(&mut self, center: ChunkCoordinate, world: &mut WorldStore) {
        let radius = self.config.unload_radius as i32;
        let mut distant: Vec<_> = self
            .states
            .keys()
            .filter(|coord| coord.chebyshev_distance(&center) > radius)
            .copied()
            .collect();
        distant.sort();

        for coord in distant {
            if let Some(ChunkLoadState::Loading { .. }) = self.states.remove(&coord) {
                debug!("Cancelled load of chunk {coord}");
            }
            world.unload_chunk(coord);
        }
    }

    /// Coordinates whose retry backoff has elapsed, oldest deadline first.
    fn due_retries(&self, now: Instant) -> Vec<ChunkCoordinate> {
        let mut due: Vec<_> = self
            .states
            .iter()
            .filter_map(|(coord, state)| match state {
                ChunkLoadState::AwaitingRetry { retry_at, .. } if *retry_at <= now => {
                    Some((*retry_at, *coord))
                }
                _ => None,
            })
            .collect();
        due.sort();
        due.into_iter().map(|(_, coord)| coord).collect()
    }

    /// Untracked coordinates within the load radius, nearest first, ties by coordinate.
    fn wanted(&self, center: ChunkCoordinate) -> Vec<ChunkCoordinate> {
        let radius = self.config.load_radius as i32;
        let mut wanted = Vec::new();
        for y in -radius..=radius {
            for z in -radius..=radius {
                for x in -radius..=radius {
                    let coord = ChunkCoordinate::new(center.x() + x, center.y() + y, center.z() + z);
                    if !self.states.contains_key(&coord) && !self.in_flight.contains(&coord) {
                        wanted.push(coord);
                    }
                }
            }
        }

        wanted.sort_by_key(|coord| (coord.distance_squared(&center), *coord));
        wanted
    }

    fn request(&mut self, coord: ChunkCoordinate, attempt: u32) -> Box<dyn Task + Send> {
        debug!("Requesting chunk {coord} (attempt {attempt})");
        self.states.insert(coord, ChunkLoadState::Loading { attempt });
        self.in_flight.insert(coord);
        Box::new(ChunkGenerationTask::new(
            coord,
            attempt,
            Arc::clone(&self.generator),
        ))
    }

    fn load_placeholder(&mut self, coord: ChunkCoordinate, world: &mut WorldStore) {
        if let Err(error) = world.load_chunk(coord, vec![BlockType::AIR; CHUNK_SIZE]) {
            warn!("Could not load placeholder for chunk {coord}: {error}");
        }
        self.states.insert(coord, ChunkLoadState::Failed);
    }

    /// Applies the outcome of a generation task on the main thread.
    ///
    /// The outcome is discarded unless the coordinate is still `Loading` for the
    /// same attempt. On success the chunk enters the world store. On failure the
    /// coordinate waits for a retry, or is given up on once retries run out.
    ///
    /// # Returns
    /// `true` if the outcome was applied.
    pub fn complete(
        &mut self,
        coord: ChunkCoordinate,
        attempt: u32,
        outcome: Result<Vec<BlockType>, VoxelError>,
        world: &mut WorldStore,
        now: Instant,
    ) -> bool {
        self.in_flight.remove(&coord);

        if self.states.get(&coord) != Some(&ChunkLoadState::Loading { attempt }) {
            debug!("Discarding generated chunk {coord}, no longer wanted");
            return false;
        }

        let error = match outcome.and_then(|blocks| world.load_chunk(coord, blocks)) {
            Ok(_) => {
                self.states.insert(coord, ChunkLoadState::Loaded);
                return true;
            }
            Err(error) => error,
        };

        if attempt <= self.config.max_retries {
            let retry_at = now + self.backoff();
            warn!("{error}; retrying (attempt {} of {})", attempt + 1, self.config.max_retries + 1);
            self.states.insert(
                coord,
                ChunkLoadState::AwaitingRetry {
                    attempt: attempt + 1,
                    retry_at,
                },
            );
        } else {
            warn!("{error}; giving up on chunk {coord} after {attempt} attempts");
            self.failed.put(coord, error.to_string());
            self.load_placeholder(coord, world);
        }
        true
    }

    /// The configured backoff plus up to a quarter of it in random jitter.
    fn backoff(&self) -> Duration {
        let base = self.config.retry_backoff_ms;
        Duration::from_millis(base + fastrand::u64(0..=base / 4))
    }

    pub fn state(&self, coord: ChunkCoordinate) -> Option<ChunkLoadState> {
        self.states.get(&coord).copied()
    }

    /// Whether generation of this coordinate has failed for good (and is still remembered).
    pub fn has_failed(&self, coord: ChunkCoordinate) -> bool {
        self.failed.contains(&coord)
    }

    pub fn num_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of coordinates waiting for a retry.
    pub fn num_awaiting_retry(&self) -> usize {
        self.states
            .values()
            .filter(|state| matches!(state, ChunkLoadState::AwaitingRetry { .. }))
            .count()
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Logs a one-line summary of the tracked state.
    pub fn log_summary(&self) {
        let loaded = self
            .states
            .values()
            .filter(|state| **state == ChunkLoadState::Loaded)
            .count();
        info!(
            "Streaming: {} loaded, {} in flight, {} awaiting retry, {} failed",
            loaded,
            self.in_flight.len(),
            self.num_awaiting_retry(),
            self.failed.len()
        );
    }
}

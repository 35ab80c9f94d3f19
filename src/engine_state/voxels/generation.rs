//! # Chunk Generation
//!
//! Terrain generation is a collaborator of the engine, not part of it. The engine
//! only needs something implementing [`ChunkGenerator`] that deterministically
//! turns a chunk coordinate into a chunk's worth of blocks, in storage order
//! (X fastest, then Z, then Y).
//!
//! Two generators ship with the crate:
//! - [`PerlinTerrainGenerator`]: fractal Perlin heightmap with stone, dirt and grass layers
//! - [`FlatGenerator`]: a single block type below a fixed height, for tests and demos

use std::sync::Arc;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::{
    engine_state::{
        config::{TerrainConfig, TerrainKind},
        voxels::{
            block::block_type::BlockType,
            chunk::{ChunkCoordinate, CHUNK_DIMENSION, CHUNK_SIZE},
        },
    },
    error::VoxelError,
};

/// Produces the blocks of a chunk.
///
/// Implementations must be deterministic for a given coordinate (and seed) and
/// safe to call from worker threads. A panic inside `generate` is caught by the
/// generation task and treated as a failure.
pub trait ChunkGenerator: Send + Sync {
    /// Generates `CHUNK_SIZE` blocks for the chunk at `coord`, in storage order.
    fn generate(&self, coord: ChunkCoordinate) -> Result<Vec<BlockType>, VoxelError>;
}

/// Builds the generator described by the terrain section of the configuration.
pub fn generator_from_config(config: &TerrainConfig) -> Arc<dyn ChunkGenerator> {
    match config.kind {
        TerrainKind::Perlin => Arc::new(PerlinTerrainGenerator::new(config)),
        TerrainKind::Flat => Arc::new(FlatGenerator::new(config.flat_height, config.flat_block)),
    }
}

/// Visits every cell of a chunk in storage order and collects the block chosen
/// for each world position.
fn fill_chunk<F>(coord: ChunkCoordinate, mut block_at: F) -> Vec<BlockType>
where
    F: FnMut(i32, i32, i32) -> BlockType,
{
    let origin = coord.origin();
    let mut blocks = Vec::with_capacity(CHUNK_SIZE);
    for y in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                blocks.push(block_at(origin.x + x, origin.y + y, origin.z + z));
            }
        }
    }
    blocks
}

/// Heightmap terrain from fractal Perlin noise.
///
/// Each column's surface height is `(noise + 1) * amplitude + base_height`,
/// sampled at `(x / scale, z / scale)`. Below the surface the column is grass
/// (top block), then three layers of dirt, then stone.
pub struct PerlinTerrainGenerator {
    noise: Fbm<Perlin>,
    scale: f64,
    amplitude: f64,
    base_height: i32,
}

impl PerlinTerrainGenerator {
    pub fn new(config: &TerrainConfig) -> Self {
        let noise = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);

        Self {
            noise,
            scale: config.scale,
            amplitude: config.amplitude,
            base_height: config.base_height,
        }
    }

    /// Surface height of the column at world `(x, z)`. Never below 1.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let sample = self.noise.get([x as f64 / self.scale, z as f64 / self.scale]);
        (((sample + 1.0) * self.amplitude) as i32 + self.base_height).max(1)
    }

    fn layer(world_y: i32, height: i32) -> BlockType {
        if world_y < height - 4 {
            BlockType::STONE
        } else if world_y < height - 1 {
            BlockType::DIRT
        } else if world_y < height {
            BlockType::GRASS
        } else {
            BlockType::AIR
        }
    }
}

impl ChunkGenerator for PerlinTerrainGenerator {
    fn generate(&self, coord: ChunkCoordinate) -> Result<Vec<BlockType>, VoxelError> {
        let origin = coord.origin();
        let dimension = CHUNK_DIMENSION as usize;

        let mut heights = Vec::with_capacity(dimension * dimension);
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                heights.push(self.surface_height(origin.x + x, origin.z + z));
            }
        }

        Ok(fill_chunk(coord, |x, y, z| {
            let column = (x - origin.x) as usize + dimension * (z - origin.z) as usize;
            Self::layer(y, heights[column])
        }))
    }
}

/// Everything below `height` is `block_type`, everything above is air.
pub struct FlatGenerator {
    height: i32,
    block_type: BlockType,
}

impl FlatGenerator {
    pub fn new(height: i32, block_type: BlockType) -> Self {
        Self { height, block_type }
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, coord: ChunkCoordinate) -> Result<Vec<BlockType>, VoxelError> {
        Ok(fill_chunk(coord, |_, y, _| {
            if y < self.height {
                self.block_type
            } else {
                BlockType::AIR
            }
        }))
    }
}

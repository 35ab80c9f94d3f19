//! # Chunk Coordinate Module
//!
//! Chunk-space coordinates and the translation between world block positions and
//! (chunk, local) pairs. Translation uses floor division so that world position
//! `-1` lands in chunk `-1` at local `15`, not in chunk `0`.

use std::{cmp::Ordering, fmt};

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine_state::voxels::block::block_side::BlockSide;

use super::CHUNK_DIMENSION;

/// The position of a chunk in chunk space (not block space).
///
/// Two coordinates are equal iff all three components match. This is the key of
/// the world store's chunk map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoordinate(pub Point3<i32>);

impl ChunkCoordinate {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Point3::new(x, y, z))
    }

    pub fn x(&self) -> i32 {
        self.0.x
    }

    pub fn y(&self) -> i32 {
        self.0.y
    }

    pub fn z(&self) -> i32 {
        self.0.z
    }

    /// Splits a world block position into its owning chunk and the chunk-local position.
    pub fn from_world_block(position: Point3<i32>) -> (Self, Point3<usize>) {
        let coordinate = Self::new(
            position.x.div_euclid(CHUNK_DIMENSION),
            position.y.div_euclid(CHUNK_DIMENSION),
            position.z.div_euclid(CHUNK_DIMENSION),
        );
        let local = Point3::new(
            position.x.rem_euclid(CHUNK_DIMENSION) as usize,
            position.y.rem_euclid(CHUNK_DIMENSION) as usize,
            position.z.rem_euclid(CHUNK_DIMENSION) as usize,
        );
        (coordinate, local)
    }

    /// The chunk containing a continuous world-space position (e.g. the player).
    pub fn from_world_position(position: Point3<f32>) -> Self {
        let size = CHUNK_DIMENSION as f32;
        Self::new(
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
            (position.z / size).floor() as i32,
        )
    }

    /// The chunk sharing the given face with this one.
    pub fn neighbor(&self, side: BlockSide) -> Self {
        Self(self.0 + side.offset())
    }

    /// World block position of the chunk's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        self.0 * CHUNK_DIMENSION
    }

    /// Converts a chunk-local position into a world block position.
    pub fn world_block(&self, local: Point3<usize>) -> Point3<i32> {
        self.origin() + Vector3::new(local.x as i32, local.y as i32, local.z as i32)
    }

    /// Minimum corner of the chunk's bounding box in world space.
    pub fn min_corner(&self) -> Point3<f32> {
        self.origin().cast::<f32>().unwrap_or(Point3::new(0.0, 0.0, 0.0))
    }

    /// Maximum corner of the chunk's bounding box in world space.
    pub fn max_corner(&self) -> Point3<f32> {
        self.min_corner() + Vector3::new(1.0, 1.0, 1.0) * CHUNK_DIMENSION as f32
    }

    /// Centre of the chunk in world space.
    pub fn center(&self) -> Point3<f32> {
        self.min_corner() + Vector3::new(1.0, 1.0, 1.0) * (CHUNK_DIMENSION as f32 * 0.5)
    }

    /// Largest per-axis distance, in chunks. The streaming radius metric.
    pub fn chebyshev_distance(&self, other: &Self) -> i32 {
        let d = self.0 - other.0;
        d.x.abs().max(d.y.abs()).max(d.z.abs())
    }

    /// Squared euclidean distance in chunks, used to order loads nearest first.
    pub fn distance_squared(&self, other: &Self) -> i64 {
        let d = self.0 - other.0;
        let (x, y, z) = (d.x as i64, d.y as i64, d.z as i64);
        x * x + y * y + z * z
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

impl PartialOrd for ChunkCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkCoordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.x, self.0.y, self.0.z).cmp(&(other.0.x, other.0.y, other.0.z))
    }
}

impl Serialize for ChunkCoordinate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.0.x, self.0.y, self.0.z).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkCoordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (x, y, z) = <(i32, i32, i32)>::deserialize(deserializer)?;
        Ok(ChunkCoordinate::new(x, y, z))
    }
}

impl From<Point3<i32>> for ChunkCoordinate {
    fn from(point: Point3<i32>) -> Self {
        Self(point)
    }
}

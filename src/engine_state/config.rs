//! # Engine Configuration
//!
//! Every tunable of the engine, grouped by the component that consumes it. All
//! sections have defaults, so a configuration file only needs the values it
//! changes:
//!
//! ```json
//! { "worker_count": 0, "streaming": { "load_radius": 2, "unload_radius": 3 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::{engine_state::voxels::block::block_type::BlockType, error::VoxelError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Background worker threads. `0` runs every task inline on the main thread.
    pub worker_count: usize,
    pub streaming: StreamingConfig,
    pub culling: CullingConfig,
    pub interaction: InteractionConfig,
    pub terrain: TerrainConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            streaming: StreamingConfig::default(),
            culling: CullingConfig::default(),
            interaction: InteractionConfig::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, VoxelError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but cannot work together.
    pub fn validate(&self) -> Result<(), VoxelError> {
        let streaming = &self.streaming;
        if streaming.unload_radius < streaming.load_radius {
            return Err(VoxelError::InvalidConfig(format!(
                "unload_radius ({}) must be at least load_radius ({})",
                streaming.unload_radius, streaming.load_radius
            )));
        }
        if streaming.load_budget_per_tick == 0 {
            return Err(VoxelError::InvalidConfig(
                "load_budget_per_tick must be at least 1".to_string(),
            ));
        }
        if streaming.max_in_flight == 0 {
            return Err(VoxelError::InvalidConfig(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        if streaming.failed_cache_capacity == 0 {
            return Err(VoxelError::InvalidConfig(
                "failed_cache_capacity must be at least 1".to_string(),
            ));
        }
        if !(self.interaction.reach.is_finite() && self.interaction.reach > 0.0) {
            return Err(VoxelError::InvalidConfig(format!(
                "reach must be a positive distance, got {}",
                self.interaction.reach
            )));
        }
        if !(self.terrain.scale.is_finite() && self.terrain.scale > 0.0) {
            return Err(VoxelError::InvalidConfig(format!(
                "terrain scale must be positive, got {}",
                self.terrain.scale
            )));
        }
        Ok(())
    }
}

/// Chunk streaming policy. Radii are Chebyshev distances in chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub load_radius: u32,
    pub unload_radius: u32,
    /// New generation requests issued per tick at most.
    pub load_budget_per_tick: usize,
    /// Generation requests outstanding at once at most.
    pub max_in_flight: usize,
    /// Delay before a failed generation is retried.
    pub retry_backoff_ms: u64,
    /// Retries after the first failed attempt before a chunk is given up on.
    pub max_retries: u32,
    /// How many permanently failed coordinates are remembered.
    pub failed_cache_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            load_radius: 4,
            unload_radius: 6,
            load_budget_per_tick: 8,
            max_in_flight: 16,
            retry_backoff_ms: 250,
            max_retries: 1,
            failed_cache_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Skip chunks hidden behind fully opaque neighbours.
    pub occlusion: bool,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self { occlusion: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Maximum ray length for selecting a block, in blocks.
    pub reach: f32,
    /// Block type placed by default.
    pub place_block: BlockType,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reach: 8.0,
            place_block: BlockType::STONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    Perlin,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub kind: TerrainKind,
    pub seed: u32,
    /// World units per noise unit.
    pub scale: f64,
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Height swing of the noise, in blocks.
    pub amplitude: f64,
    pub base_height: i32,
    pub flat_height: i32,
    pub flat_block: BlockType,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            kind: TerrainKind::Perlin,
            seed: 0,
            scale: 20.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 10.0,
            base_height: 16,
            flat_height: 8,
            flat_block: BlockType::GRASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{
                "worker_count": 0,
                "streaming": { "load_radius": 2, "unload_radius": 3 },
                "terrain": { "kind": "flat", "flat_block": "Stone" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.worker_count, 0);
        assert_eq!(config.streaming.load_radius, 2);
        assert_eq!(config.streaming.load_budget_per_tick, 8);
        assert_eq!(config.terrain.kind, TerrainKind::Flat);
        assert_eq!(config.terrain.flat_block, BlockType::STONE);
    }

    #[test]
    fn unload_radius_below_load_radius_is_rejected() {
        let result = EngineConfig::from_json_str(
            r#"{ "streaming": { "load_radius": 5, "unload_radius": 4 } }"#,
        );
        assert!(matches!(result, Err(VoxelError::InvalidConfig(_))));
    }

    #[test]
    fn zero_budgets_are_rejected() {
        for json in [
            r#"{ "streaming": { "load_budget_per_tick": 0 } }"#,
            r#"{ "streaming": { "max_in_flight": 0 } }"#,
        ] {
            assert!(matches!(
                EngineConfig::from_json_str(json),
                Err(VoxelError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn unknown_block_names_fail_to_parse() {
        let result = EngineConfig::from_json_str(r#"{ "interaction": { "place_block": "lava" } }"#);
        assert!(matches!(result, Err(VoxelError::Config(_))));
    }
}

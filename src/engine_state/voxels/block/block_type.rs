//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and their
//! static attributes (solidity, opacity, names used by configuration).

use std::fmt;

use num_derive::FromPrimitive;
use phf::phf_map;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The `FromPrimitive` derive allows conversion from the compact `BlockTypeSize`
/// id, and the names in [`BLOCK_TYPE_NAMES`] are what configuration files use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Also what unloaded space reads as.
    AIR,

    /// A basic dirt block, found just below the surface.
    DIRT,

    /// A grass block with different textures on top and sides.
    GRASS,

    /// Stone, the bulk of the terrain below the dirt layer.
    STONE,

    /// A wooden block with a bark texture on all sides.
    WOOD,

    /// Collidable but see-through; never hides the faces behind it.
    GLASS,
}

/// Lowercase names accepted wherever a block type is configured.
pub static BLOCK_TYPE_NAMES: phf::Map<&'static str, BlockType> = phf_map! {
    "air" => BlockType::AIR,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "stone" => BlockType::STONE,
    "wood" => BlockType::WOOD,
    "glass" => BlockType::GLASS,
};

impl BlockType {
    /// Converts a `BlockTypeSize` id to a `BlockType`, or `None` for unknown ids.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// Looks up a block type by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_NAMES.get(name).copied()
    }

    /// The configuration name of this block type.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::AIR => "air",
            BlockType::DIRT => "dirt",
            BlockType::GRASS => "grass",
            BlockType::STONE => "stone",
            BlockType::WOOD => "wood",
            BlockType::GLASS => "glass",
        }
    }

    /// Whether the block is collidable. Only air is not.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }

    /// Whether the block hides the faces of its neighbours.
    pub fn is_opaque(self) -> bool {
        !matches!(self, BlockType::AIR | BlockType::GLASS)
    }

    /// Generates a random opaque block type (testing and demo terrain).
    pub fn get_random_type() -> Self {
        match fastrand::u8(0..4) {
            0 => BlockType::DIRT,
            1 => BlockType::GRASS,
            2 => BlockType::STONE,
            _ => BlockType::WOOD,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for BlockType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BlockType::from_name(&value.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown block type `{value}`"))
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        value.name().to_string()
    }
}

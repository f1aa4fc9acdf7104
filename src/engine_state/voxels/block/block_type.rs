//! # Block Type Module
//!
//! This module defines the block types the terrain generator emits and the
//! conversion between them and raw [`BlockId`] values.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockId;

/// Enumerates the block types known to the engine.
///
/// The discriminants are the wire identifiers. The `FromPrimitive` derive allows
/// conversion from raw ids received from the server or read from chunk storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An empty voxel.
    AIR = 0,

    /// Grass topsoil, the surface of the noise style and grass biome.
    GRASS = 1,

    /// Dirt, the three layers directly below any surface block.
    DIRT = 2,

    /// Stone, everything deeper than the dirt layers and the hub surface.
    STONE = 3,

    /// Fire biome surface.
    FIRE = 4,

    /// Wind biome surface.
    WIND = 5,

    /// Bridge planks.
    BRIDGE = 6,

    /// Earth biome surface.
    EARTH = 7,
}

impl BlockType {
    /// Converts a raw identifier to a known block type.
    ///
    /// # Arguments
    /// * `block_id` - The identifier as stored in a chunk or received from the server
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` for identifiers outside the catalogue.
    pub fn from_id(block_id: BlockId) -> Option<Self> {
        FromPrimitive::from_u16(block_id)
    }

    /// Returns the wire identifier of this block type.
    #[inline]
    pub fn id(self) -> BlockId {
        self as BlockId
    }

    /// Returns `true` for every type except `AIR`.
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_id() {
        for block in [
            BlockType::AIR,
            BlockType::GRASS,
            BlockType::DIRT,
            BlockType::STONE,
            BlockType::FIRE,
            BlockType::WIND,
            BlockType::BRIDGE,
            BlockType::EARTH,
        ] {
            assert_eq!(BlockType::from_id(block.id()), Some(block));
        }
        assert_eq!(BlockType::from_id(999), None);
    }
}

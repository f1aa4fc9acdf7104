//! # Block Module
//!
//! This module provides the block-level vocabulary of the voxel world: the compact
//! identifier stored in chunk arrays, the catalogue of known block types and the
//! six faces of a voxel.
//!
//! Block identifiers travel unchanged between generation, overrides, meshing and
//! the network boundary. Identifier `0` is always air; any other identifier is a
//! solid voxel, whether or not it has a [`block_type::BlockType`] variant.

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent blocks in chunk storage and on the wire.
pub type BlockId = u16;

/// Identifier of an empty voxel.
pub const AIR_ID: BlockId = 0;

/// Returns `true` when the identifier names a solid voxel.
#[inline]
pub fn is_solid_id(block_id: BlockId) -> bool {
    block_id != AIR_ID
}

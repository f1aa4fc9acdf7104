//! # Voxel World Data
//!
//! This module contains the data side of the voxel world: what a voxel is, how
//! terrain is sampled, how chunks are stored and generated, and how
//! server-authoritative edits are layered over generated terrain.
//!
//! ## Architecture
//!
//! * **Block**: block identifiers, the known block types and voxel faces
//! * **Terrain**: the deterministic column sampler for the three world styles
//! * **Chunk**: full-height voxel columns with incremental bookkeeping
//! * **Overrides**: sparse, chunk-bucketed voxel edits that win over generation
//! * **Chunk Store**: resident chunks, the generation queue and mesh-dirty tracking
//!
//! ## Performance Considerations
//!
//! * Generation is bounded per tick and served nearest-first
//! * Solidity is mirrored in a bit vector so air is skipped cheaply
//! * Column heights are cached and kept current on every write

pub mod block;
pub mod chunk;
pub mod chunk_store;
pub mod generation_queue;
pub mod overrides;
pub mod terrain;

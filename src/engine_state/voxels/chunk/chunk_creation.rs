//! # Chunk Creation Module
//!
//! Builds chunks column by column from terrain samples, then overlays the
//! chunk's override bucket. The builder keeps the id array, the solidity bit
//! vector, the column height cache and the solid count consistent while
//! columns are pushed.

use std::collections::HashMap;

use bitvec::prelude::BitVec;
use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{BlockId, AIR_ID},
    terrain::{ColumnSample, TerrainSampler},
};

use super::{Chunk, ChunkKey, ChunkProvenance};

/// A builder for creating and populating chunks.
pub struct ChunkBuilder {
    key: ChunkKey,
    size: i32,
    height: i32,
    blocks: Vec<BlockId>,
    solid_array: BitVec,
    column_heights: Vec<Option<i32>>,
    solid_count: usize,
    provenance: ChunkProvenance,
}

impl ChunkBuilder {
    /// Creates a builder for an all-air chunk.
    ///
    /// # Arguments
    /// * `key` - Position of the chunk being built
    /// * `size` - Horizontal edge length
    /// * `height` - Number of voxel layers
    pub fn new(key: ChunkKey, size: i32, height: i32) -> Self {
        let volume = (size * size * height) as usize;
        ChunkBuilder {
            key,
            size,
            height,
            blocks: vec![AIR_ID; volume],
            solid_array: BitVec::repeat(false, volume),
            column_heights: vec![None; (size * size) as usize],
            solid_count: 0,
            provenance: ChunkProvenance::default(),
        }
    }

    /// Records the seed hash of the sampler feeding this builder.
    pub fn seed_hash(mut self, seed_hash: u32) -> Self {
        self.provenance.seed_hash = seed_hash;
        self
    }

    /// Fills one column from `y = 0` up to the sampled height.
    ///
    /// The top layer gets the biome's surface block, the next three dirt and
    /// everything below stone. Void samples leave the column empty.
    pub fn push_column(&mut self, lx: i32, lz: i32, sample: &ColumnSample) {
        let Some(top) = sample.height else {
            return;
        };
        let top = top.min(self.height - 1);
        if top < 0 {
            return;
        }

        let plane = self.size * self.size;
        let column = lx + self.size * lz;
        for y in 0..=top {
            let index = (column + plane * y) as usize;
            self.blocks[index] = sample.biome.block_for_depth(top - y);
            self.solid_array.set(index, true);
        }
        self.solid_count += (top + 1) as usize;
        self.column_heights[column as usize] = Some(top);
        self.provenance.height_range = Some(match self.provenance.height_range {
            Some((low, high)) => (low.min(top), high.max(top)),
            None => (top, top),
        });
    }

    /// Finalizes the chunk.
    pub fn return_chunk(self) -> Chunk {
        Chunk {
            key: self.key,
            size: self.size,
            height: self.height,
            blocks: self.blocks,
            solid_array: self.solid_array,
            column_heights: self.column_heights,
            solid_count: self.solid_count,
            provenance: self.provenance,
        }
    }
}

/// Generates a chunk from the sampler and overlays its overrides.
///
/// # Arguments
/// * `key` - Chunk to generate
/// * `sampler` - Terrain sampler for the session
/// * `overrides` - The chunk's override bucket, keyed by world coordinate
/// * `size` - Horizontal edge length
/// * `height` - Number of voxel layers
///
/// # Returns
/// The generated chunk. Generation is a pure function of its inputs.
pub fn generate_chunk(
    key: ChunkKey,
    sampler: &TerrainSampler,
    overrides: Option<&HashMap<Point3<i32>, BlockId>>,
    size: i32,
    height: i32,
) -> Chunk {
    let (origin_x, origin_z) = key.origin(size);
    let mut builder = ChunkBuilder::new(key, size, height).seed_hash(sampler.seed_hash());
    for lz in 0..size {
        for lx in 0..size {
            let sample = sampler.sample(origin_x + lx, origin_z + lz);
            builder.push_column(lx, lz, &sample);
        }
    }

    let mut chunk = builder.return_chunk();
    if let Some(bucket) = overrides {
        let mut entries: Vec<_> = bucket.iter().collect();
        entries.sort_by_key(|(coordinate, _)| (coordinate.y, coordinate.z, coordinate.x));
        for (coordinate, &block_id) in entries {
            let lx = coordinate.x - origin_x;
            let lz = coordinate.z - origin_z;
            if chunk.set_local(lx, coordinate.y, lz, block_id).is_some() {
                chunk.provenance_mut().overrides_applied += 1;
            }
        }
    }
    chunk
}

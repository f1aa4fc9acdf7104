//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a full-height column of
//! `size × size × world_height` voxels addressed by a horizontal [`ChunkKey`].
//!
//! ## Storage
//!
//! Chunks keep two parallel views of the same voxels:
//! - `blocks`: one [`BlockId`] per voxel, stored x-fastest, then z, then y
//! - `solid_array`: a bit vector (1 bit per voxel) marking non-air voxels
//!
//! The bit vector lets the mesher and the iterator skip air cheaply, while the
//! flat id array keeps reads and writes O(1). Both are updated together by
//! [`Chunk::set_local`], which also maintains the solid count and the per-column
//! height cache incrementally.
//!
//! ## Coordinates
//!
//! World coordinates map to chunk keys with floor division, so local offsets are
//! always in `0..size` including for negative world coordinates.

use bitvec::prelude::BitVec;
use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::block::{is_solid_id, BlockId, AIR_ID};

pub mod chunk_creation;
pub mod chunk_iteration;

/// Horizontal position of a chunk in chunk units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Chunk X.
    pub cx: i32,
    /// Chunk Z.
    pub cz: i32,
}

impl ChunkKey {
    /// Creates a key from chunk coordinates.
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Key of the chunk containing world column `(wx, wz)`.
    pub fn containing(wx: i32, wz: i32, chunk_size: i32) -> Self {
        Self::new(wx.div_euclid(chunk_size), wz.div_euclid(chunk_size))
    }

    /// Key of the chunk containing a continuous world position.
    pub fn from_position(position: Point3<f32>, chunk_size: i32) -> Self {
        Self::new(
            (position.x / chunk_size as f32).floor() as i32,
            (position.z / chunk_size as f32).floor() as i32,
        )
    }

    /// World coordinates of the chunk's `(0, 0)` column, saturating at the `i32` range.
    pub fn origin(self, chunk_size: i32) -> (i32, i32) {
        (
            self.cx.saturating_mul(chunk_size),
            self.cz.saturating_mul(chunk_size),
        )
    }

    /// The key shifted by `(dx, dz)` chunks, saturating at the `i32` range.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.cx.saturating_add(dx), self.cz.saturating_add(dz))
    }

    /// `max(|dcx|, |dcz|)`, saturating at `i32::MAX`.
    pub fn chebyshev_distance(self, other: ChunkKey) -> i32 {
        let dx = (i64::from(self.cx) - i64::from(other.cx)).abs();
        let dz = (i64::from(self.cz) - i64::from(other.cz)).abs();
        dx.max(dz).min(i64::from(i32::MAX)) as i32
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_squared(self, other: ChunkKey) -> i64 {
        let dx = i64::from(self.cx) - i64::from(other.cx);
        let dz = i64::from(self.cz) - i64::from(other.cz);
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }

    /// The four edge-sharing neighbours: -X, +X, -Z, +Z.
    pub fn neighbors(self) -> [ChunkKey; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }
}

/// Splits a world voxel coordinate into its chunk key and local offsets.
///
/// # Returns
/// `(key, lx, lz)` with `0 <= lx, lz < chunk_size`.
#[inline]
pub fn split_world_coordinate(wx: i32, wz: i32, chunk_size: i32) -> (ChunkKey, i32, i32) {
    (
        ChunkKey::containing(wx, wz, chunk_size),
        wx.rem_euclid(chunk_size),
        wz.rem_euclid(chunk_size),
    )
}

/// Where a chunk's contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkProvenance {
    /// Seed hash of the sampler that generated the chunk.
    pub seed_hash: u32,
    /// Override entries overlaid after generation.
    pub overrides_applied: usize,
    /// Runtime writes since generation.
    pub local_edits: usize,
    /// Lowest and highest sampled column heights, before overrides.
    pub height_range: Option<(i32, i32)>,
}

/// A full-height column of voxels.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Position of this chunk in chunk coordinates.
    pub key: ChunkKey,
    size: i32,
    height: i32,
    blocks: Vec<BlockId>,
    solid_array: BitVec,
    column_heights: Vec<Option<i32>>,
    solid_count: usize,
    provenance: ChunkProvenance,
}

impl Chunk {
    /// Creates a chunk filled with air.
    pub fn empty(key: ChunkKey, size: i32, height: i32) -> Self {
        chunk_creation::ChunkBuilder::new(key, size, height).return_chunk()
    }

    /// Horizontal edge length.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Number of voxel layers.
    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, lx: i32, ly: i32, lz: i32) -> Option<usize> {
        let in_range = (0..self.size).contains(&lx)
            && (0..self.size).contains(&lz)
            && (0..self.height).contains(&ly);
        in_range.then(|| (lx + self.size * (lz + self.size * ly)) as usize)
    }

    /// Inverse of the storage index.
    pub(crate) fn local_position_of(&self, index: usize) -> Point3<i32> {
        let plane = (self.size * self.size) as usize;
        let ly = index / plane;
        let rest = index % plane;
        Point3::new(
            (rest % self.size as usize) as i32,
            ly as i32,
            (rest / self.size as usize) as i32,
        )
    }

    /// Reads the voxel at local coordinates.
    ///
    /// # Returns
    /// The block id, or air for coordinates outside the chunk.
    pub fn get_local(&self, lx: i32, ly: i32, lz: i32) -> BlockId {
        self.index(lx, ly, lz)
            .map_or(AIR_ID, |index| self.blocks[index])
    }

    /// Checks if the voxel at local coordinates is solid.
    pub fn is_solid_local(&self, lx: i32, ly: i32, lz: i32) -> bool {
        self.index(lx, ly, lz)
            .is_some_and(|index| self.solid_array[index])
    }

    /// Writes a voxel at local coordinates.
    ///
    /// The solid bit, solid count and column height cache are updated together.
    ///
    /// # Arguments
    /// * `lx`, `ly`, `lz` - Local coordinates
    /// * `block_id` - The new block
    ///
    /// # Returns
    /// The previous block id, or `None` if the coordinates are outside the chunk
    /// (in which case nothing is written).
    pub fn set_local(&mut self, lx: i32, ly: i32, lz: i32, block_id: BlockId) -> Option<BlockId> {
        let index = self.index(lx, ly, lz)?;
        let previous = self.blocks[index];
        if previous == block_id {
            return Some(previous);
        }

        self.blocks[index] = block_id;
        let was_solid = is_solid_id(previous);
        let now_solid = is_solid_id(block_id);
        match (was_solid, now_solid) {
            (false, true) => self.solid_count += 1,
            (true, false) => self.solid_count -= 1,
            _ => {}
        }
        self.solid_array.set(index, now_solid);

        let column = (lx + self.size * lz) as usize;
        match self.column_heights[column] {
            top if now_solid && top.map_or(true, |top| ly > top) => {
                self.column_heights[column] = Some(ly);
            }
            Some(top) if !now_solid && ly == top => {
                self.column_heights[column] =
                    (0..ly).rev().find(|&y| self.is_solid_local(lx, y, lz));
            }
            _ => {}
        }

        Some(previous)
    }

    /// Highest solid layer of a column, or `None` if the column is empty.
    pub fn column_height(&self, lx: i32, lz: i32) -> Option<i32> {
        if !(0..self.size).contains(&lx) || !(0..self.size).contains(&lz) {
            return None;
        }
        self.column_heights[(lx + self.size * lz) as usize]
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// Returns `true` when the chunk holds no solid voxels.
    pub fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    /// Generation provenance.
    pub fn provenance(&self) -> &ChunkProvenance {
        &self.provenance
    }

    pub(crate) fn provenance_mut(&mut self) -> &mut ChunkProvenance {
        &mut self.provenance
    }

    /// Iterates every solid voxel as `(local position, block id)`.
    pub fn solid_blocks(&self) -> chunk_iteration::ChunkBlockIterator<'_> {
        chunk_iteration::ChunkBlockIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_world_coordinates_floor_into_chunks() {
        assert_eq!(split_world_coordinate(-1, -16, 16), (ChunkKey::new(-1, -1), 15, 0));
        assert_eq!(split_world_coordinate(-17, 31, 16), (ChunkKey::new(-2, 1), 15, 15));
        assert_eq!(split_world_coordinate(0, 15, 16), (ChunkKey::new(0, 0), 0, 15));
    }

    #[test]
    fn position_keys_match_voxel_keys() {
        let key = ChunkKey::from_position(Point3::new(-0.25, 10.0, 33.9), 16);
        assert_eq!(key, ChunkKey::new(-1, 2));
    }

    #[test]
    fn out_of_range_reads_are_air_and_writes_are_ignored() {
        let mut chunk = Chunk::empty(ChunkKey::new(0, 0), 4, 8);
        assert_eq!(chunk.get_local(0, -1, 0), AIR_ID);
        assert_eq!(chunk.get_local(0, 8, 0), AIR_ID);
        assert_eq!(chunk.set_local(0, 8, 0, 3), None);
        assert_eq!(chunk.set_local(4, 0, 0, 3), None);
        assert_eq!(chunk.solid_count(), 0);
    }

    #[test]
    fn writes_keep_counts_and_heights_in_step() {
        let mut chunk = Chunk::empty(ChunkKey::new(0, 0), 4, 8);
        chunk.set_local(1, 2, 3, 5);
        chunk.set_local(1, 6, 3, 5);
        assert_eq!(chunk.solid_count(), 2);
        assert_eq!(chunk.column_height(1, 3), Some(6));

        assert_eq!(chunk.set_local(1, 6, 3, AIR_ID), Some(5));
        assert_eq!(chunk.column_height(1, 3), Some(2));
        assert_eq!(chunk.solid_count(), 1);

        chunk.set_local(1, 2, 3, AIR_ID);
        assert_eq!(chunk.column_height(1, 3), None);
        assert!(chunk.is_empty());
    }

    #[test]
    fn chebyshev_distance_uses_the_larger_axis() {
        let a = ChunkKey::new(0, 0);
        assert_eq!(a.chebyshev_distance(ChunkKey::new(5, -2)), 5);
        assert_eq!(a.chebyshev_distance(ChunkKey::new(-1, 4)), 4);
    }

    #[test]
    fn far_keys_saturate_instead_of_overflowing() {
        let far = ChunkKey::new(i32::MAX, i32::MIN);
        assert_eq!(far.origin(16), (i32::MAX, i32::MIN));
        assert_eq!(far.offset(1, -1), far);
        assert_eq!(far.chebyshev_distance(ChunkKey::new(-1, 0)), i32::MAX);
        assert!(far.distance_squared(ChunkKey::new(0, 0)) > 0);
    }
}

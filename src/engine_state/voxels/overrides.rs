//! # Voxel Overrides
//!
//! Sparse map of server-authoritative voxel edits, bucketed by chunk so that a
//! chunk being generated can fetch exactly the entries it must overlay. An
//! override always wins over the generated value at its coordinate.

use std::collections::HashMap;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::{
    block::BlockId,
    chunk::ChunkKey,
};

/// One voxel edit in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelOverride {
    /// World X.
    pub x: i32,
    /// World Y.
    pub y: i32,
    /// World Z.
    pub z: i32,
    /// Block written at the coordinate.
    pub block_id: BlockId,
}

impl VoxelOverride {
    /// Creates an override at a world coordinate.
    pub fn new(coordinate: Point3<i32>, block_id: BlockId) -> Self {
        Self {
            x: coordinate.x,
            y: coordinate.y,
            z: coordinate.z,
            block_id,
        }
    }

    /// The world coordinate of the edit.
    pub fn coordinate(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Chunk-bucketed override cache.
#[derive(Debug, Clone, Default)]
pub struct VoxelOverrides {
    buckets: HashMap<ChunkKey, HashMap<Point3<i32>, BlockId>>,
    chunk_size: i32,
    world_height: i32,
    len: usize,
}

impl VoxelOverrides {
    /// Creates an empty cache for the given chunk geometry.
    pub fn new(chunk_size: i32, world_height: i32) -> Self {
        Self {
            buckets: HashMap::new(),
            chunk_size,
            world_height,
            len: 0,
        }
    }

    /// Records an override, replacing any earlier one at the same coordinate.
    ///
    /// # Returns
    /// `false` when `y` is outside the world, in which case nothing is stored.
    pub fn insert(&mut self, coordinate: Point3<i32>, block_id: BlockId) -> bool {
        if !(0..self.world_height).contains(&coordinate.y) {
            return false;
        }
        let key = ChunkKey::containing(coordinate.x, coordinate.z, self.chunk_size);
        if self
            .buckets
            .entry(key)
            .or_default()
            .insert(coordinate, block_id)
            .is_none()
        {
            self.len += 1;
        }
        true
    }

    /// Records every override of an iterator.
    pub fn extend<I: IntoIterator<Item = VoxelOverride>>(&mut self, overrides: I) {
        for entry in overrides {
            self.insert(entry.coordinate(), entry.block_id);
        }
    }

    /// Override at a coordinate, if any.
    pub fn get(&self, coordinate: Point3<i32>) -> Option<BlockId> {
        let key = ChunkKey::containing(coordinate.x, coordinate.z, self.chunk_size);
        self.buckets.get(&key)?.get(&coordinate).copied()
    }

    /// All overrides inside a chunk.
    pub fn bucket(&self, key: ChunkKey) -> Option<&HashMap<Point3<i32>, BlockId>> {
        self.buckets.get(&key)
    }

    /// Total number of overridden voxels.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no voxel is overridden.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_bucket_by_floor_divided_chunk() {
        let mut overrides = VoxelOverrides::new(16, 64);
        assert!(overrides.insert(Point3::new(-1, 10, 0), 4));
        assert!(overrides.insert(Point3::new(15, 10, 15), 5));
        assert_eq!(overrides.bucket(ChunkKey::new(-1, 0)).map(|b| b.len()), Some(1));
        assert_eq!(overrides.bucket(ChunkKey::new(0, 0)).map(|b| b.len()), Some(1));
        assert_eq!(overrides.get(Point3::new(-1, 10, 0)), Some(4));
    }

    #[test]
    fn replacing_an_override_keeps_the_count() {
        let mut overrides = VoxelOverrides::new(16, 64);
        overrides.insert(Point3::new(1, 1, 1), 4);
        overrides.insert(Point3::new(1, 1, 1), 0);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get(Point3::new(1, 1, 1)), Some(0));
    }

    #[test]
    fn heights_outside_the_world_are_rejected() {
        let mut overrides = VoxelOverrides::new(16, 64);
        assert!(!overrides.insert(Point3::new(0, 64, 0), 4));
        assert!(!overrides.insert(Point3::new(0, -1, 0), 4));
        assert!(overrides.is_empty());
    }
}

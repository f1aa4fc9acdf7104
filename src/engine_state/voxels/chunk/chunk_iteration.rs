//! # Chunk Iteration Module
//!
//! An iterator over the solid voxels of a chunk. It walks the set bits of the
//! chunk's `solid_array`, so air is skipped without touching the id array.

use bitvec::{order::Lsb0, slice::IterOnes};
use cgmath::Point3;

use crate::engine_state::voxels::block::BlockId;

use super::Chunk;

/// An iterator over all non-air voxels in a chunk, in storage order.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Remaining set bits of the solid array
    ones: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            ones: chunk_ref.solid_array.iter_ones(),
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockId);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;
        Some((
            self.chunk_ref.local_position_of(index),
            self.chunk_ref.blocks[index],
        ))
    }
}

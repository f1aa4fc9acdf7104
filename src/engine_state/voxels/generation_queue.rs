//! Deduplicated FIFO of chunks waiting to be generated.

use std::collections::{HashSet, VecDeque};

use super::chunk::ChunkKey;

/// Pending chunk generation requests.
///
/// Each key is queued at most once. Requests are served nearest to a centre
/// chunk first; ties keep insertion order.
#[derive(Debug, Default, Clone)]
pub struct GenerationQueue {
    pending: VecDeque<ChunkKey>,
    queued: HashSet<ChunkKey>,
}

impl GenerationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a key unless it is already queued.
    ///
    /// # Returns
    /// `true` when the key was added.
    pub fn push(&mut self, key: ChunkKey) -> bool {
        if !self.queued.insert(key) {
            return false;
        }
        self.pending.push_back(key);
        true
    }

    /// Returns `true` if the key is waiting.
    pub fn contains(&self, key: ChunkKey) -> bool {
        self.queued.contains(&key)
    }

    /// Removes and returns the queued key closest to `center`.
    pub fn pop_nearest(&mut self, center: ChunkKey) -> Option<ChunkKey> {
        let (position, _) = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(position, key)| (key.distance_squared(center), *position))?;
        let key = self.pending.remove(position)?;
        self.queued.remove(&key);
        Some(key)
    }

    /// Drops every queued key for which `keep` returns `false`.
    pub fn retain<F: FnMut(&ChunkKey) -> bool>(&mut self, mut keep: F) {
        let queued = &mut self.queued;
        self.pending.retain(|key| {
            let kept = keep(key);
            if !kept {
                queued.remove(key);
            }
            kept
        });
    }

    /// Queued keys in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ChunkKey> {
        self.pending.iter()
    }

    /// Number of waiting keys.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

//! # Streaming Controller
//!
//! Keeps the resident chunk set centred on the actor. Whenever the actor enters
//! a new chunk, every chunk within the Chebyshev view distance is requested
//! nearest-first and every resident chunk beyond `view_distance + 1` is
//! unloaded together with its mesh. The one-chunk margin stops chunks on the
//! view edge from thrashing when the actor paces across a boundary.
//!
//! Removal works on a snapshot of the resident keys, so the store is never
//! mutated while it is being iterated.

use cgmath::Point3;
use log::debug;

use super::{
    rendering::MeshManager,
    voxels::{chunk::ChunkKey, chunk_store::ChunkStore},
};

/// What one re-centre did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingUpdate {
    /// The new centre chunk.
    pub center: ChunkKey,
    /// Chunks newly queued for generation, nearest first.
    pub enqueued: Vec<ChunkKey>,
    /// Chunks removed from the store.
    pub unloaded: Vec<ChunkKey>,
}

/// Tracks the actor's chunk and drives loading and unloading.
#[derive(Debug, Clone)]
pub struct StreamingController {
    view_distance: i32,
    chunk_size: i32,
    center: Option<ChunkKey>,
}

impl StreamingController {
    /// Creates a controller that has not streamed anything yet.
    pub fn new(view_distance: i32, chunk_size: i32) -> Self {
        Self {
            view_distance,
            chunk_size,
            center: None,
        }
    }

    /// Current centre chunk.
    pub fn center(&self) -> Option<ChunkKey> {
        self.center
    }

    /// Chebyshev radius of requested chunks.
    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    /// Chebyshev radius beyond which chunks are unloaded.
    pub fn keep_distance(&self) -> i32 {
        self.view_distance + 1
    }

    /// Re-centres on the actor if it changed chunk.
    ///
    /// # Returns
    /// `None` when the actor is still in the same chunk.
    pub fn update(
        &mut self,
        position: Point3<f32>,
        store: &mut ChunkStore,
        meshes: &mut MeshManager,
    ) -> Option<StreamingUpdate> {
        let center = ChunkKey::from_position(position, self.chunk_size);
        if self.center == Some(center) {
            return None;
        }
        self.center = Some(center);
        Some(self.recenter(center, store, meshes))
    }

    /// Requests the view square around `center` and unloads everything outside the keep square.
    pub fn recenter(
        &self,
        center: ChunkKey,
        store: &mut ChunkStore,
        meshes: &mut MeshManager,
    ) -> StreamingUpdate {
        let enqueued: Vec<ChunkKey> = Self::chunks_in_view(center, self.view_distance)
            .into_iter()
            .filter(|&key| store.request_chunk(key))
            .collect();

        let keep = self.keep_distance();
        store.retain_queued(|key| key.chebyshev_distance(center) <= keep);

        let mut unloaded: Vec<ChunkKey> = store
            .resident_keys()
            .filter(|key| key.chebyshev_distance(center) > keep)
            .collect();
        unloaded.sort();
        for &key in &unloaded {
            store.unload(key);
            meshes.dispose(key);
        }

        debug!(
            "Streaming centred on ({}, {}): {} queued, {} unloaded",
            center.cx,
            center.cz,
            enqueued.len(),
            unloaded.len()
        );

        StreamingUpdate {
            center,
            enqueued,
            unloaded,
        }
    }

    /// Every chunk within Chebyshev `radius` of `center`, nearest first.
    ///
    /// Ties in distance are broken by z then x, so the order is reproducible.
    pub fn chunks_in_view(center: ChunkKey, radius: i32) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = (-radius..=radius)
            .flat_map(|dz| (-radius..=radius).map(move |dx| center.offset(dx, dz)))
            .collect();
        keys.sort_by_key(|key| (key.distance_squared(center), key.cz, key.cx));
        keys
    }

    /// Returns `true` when a world position lies inside the keep square.
    ///
    /// Ancillary content (decor, pickups) uses this to follow the same radius as terrain.
    pub fn is_within_stream_range(&self, x: f32, z: f32) -> bool {
        let Some(center) = self.center else {
            return false;
        };
        ChunkKey::from_position(Point3::new(x, 0.0, z), self.chunk_size).chebyshev_distance(center)
            <= self.keep_distance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::WorldConfig, rendering::meshing::MeshPalette, voxels::terrain::TerrainSampler,
    };

    #[test]
    fn view_square_is_complete_and_sorted_by_distance() {
        let keys = StreamingController::chunks_in_view(ChunkKey::new(2, -1), 2);
        assert_eq!(keys.len(), 25);
        assert_eq!(keys[0], ChunkKey::new(2, -1));
        let distances: Vec<i64> = keys.iter().map(|k| k.distance_squared(ChunkKey::new(2, -1))).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn moving_away_unloads_beyond_the_keep_square() {
        let mut config = WorldConfig::default();
        config.noise.height_variation = 0.0;
        config.world_height = 32;
        config.noise.base_height = 10.0;
        let sampler = TerrainSampler::new(&config);
        let mut store = ChunkStore::new(16, 32);
        let mut meshes = MeshManager::new(MeshPalette::new(sampler.seed_hash(), 10, 32));
        let mut streaming = StreamingController::new(3, 16);

        let first = streaming
            .update(Point3::new(8.0, 11.0, 8.0), &mut store, &mut meshes)
            .expect("first update centres");
        assert_eq!(first.enqueued.len(), 49);
        assert_eq!(first.enqueued[0], ChunkKey::new(0, 0));
        store.process_queue(&sampler, 49, ChunkKey::new(0, 0));
        meshes.rebuild_dirty(&mut store);
        assert!(streaming
            .update(Point3::new(9.0, 11.0, 9.0), &mut store, &mut meshes)
            .is_none());

        let moved = streaming
            .update(Point3::new(5.0 * 16.0 + 8.0, 11.0, 8.0), &mut store, &mut meshes)
            .expect("chunk changed");
        let center = ChunkKey::new(5, 0);
        assert_eq!(moved.center, center);
        assert_eq!(moved.enqueued[0], center);
        assert!(moved.unloaded.iter().all(|k| k.chebyshev_distance(center) > 4));
        assert!(moved.unloaded.contains(&ChunkKey::new(0, 0)));
        assert!(store.resident_keys().all(|k| k.chebyshev_distance(center) <= 4));
        assert!(meshes.mesh(ChunkKey::new(0, 0)).is_none());
        assert!(!streaming.is_within_stream_range(8.0, 8.0));
        assert!(streaming.is_within_stream_range(88.0, 8.0));
    }
}

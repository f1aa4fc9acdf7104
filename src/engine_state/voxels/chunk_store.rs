//! # Chunk Store
//!
//! Owns every resident chunk, the override cache, the generation queue and the
//! set of chunks whose meshes are stale.
//!
//! ## Data Flow
//!
//! 1. The streaming controller requests chunks around the actor
//! 2. [`ChunkStore::process_queue`] generates a bounded number per tick, nearest first
//! 3. Each generated chunk and its resident neighbours are marked mesh-dirty
//! 4. The mesh manager drains the dirty set with [`ChunkStore::take_mesh_dirty`]
//!
//! Voxel reads in non-resident chunks or outside `0..world_height` return air,
//! and writes there are ignored.

use std::collections::{HashMap, HashSet};

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use super::{
    block::{is_solid_id, BlockId, AIR_ID},
    chunk::{chunk_creation::generate_chunk, split_world_coordinate, Chunk, ChunkKey},
    generation_queue::GenerationQueue,
    overrides::{VoxelOverride, VoxelOverrides},
    terrain::TerrainSampler,
};

/// Running generation statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Chunks generated since the session started, including regenerations.
    pub generated_chunks: u64,
    /// Lowest sampled column height seen.
    pub min_height_seen: Option<i32>,
    /// Highest sampled column height seen.
    pub max_height_seen: Option<i32>,
}

/// Resident chunks plus their pending work.
#[derive(Debug)]
pub struct ChunkStore {
    chunks: HashMap<ChunkKey, Chunk>,
    overrides: VoxelOverrides,
    queue: GenerationQueue,
    mesh_dirty: HashSet<ChunkKey>,
    stats: GenerationStats,
    chunk_size: i32,
    world_height: i32,
}

impl ChunkStore {
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `chunk_size` - Horizontal chunk edge in voxels
    /// * `world_height` - Number of voxel layers
    pub fn new(chunk_size: i32, world_height: i32) -> Self {
        Self {
            chunks: HashMap::new(),
            overrides: VoxelOverrides::new(chunk_size, world_height),
            queue: GenerationQueue::new(),
            mesh_dirty: HashSet::new(),
            stats: GenerationStats::default(),
            chunk_size,
            world_height,
        }
    }

    /// Horizontal chunk edge in voxels.
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Number of voxel layers.
    pub fn world_height(&self) -> i32 {
        self.world_height
    }

    /// Seeds the override cache, typically before any chunk is generated.
    pub fn load_overrides<I: IntoIterator<Item = VoxelOverride>>(&mut self, overrides: I) {
        self.overrides.extend(overrides);
    }

    /// The override cache.
    pub fn overrides(&self) -> &VoxelOverrides {
        &self.overrides
    }

    /// Queues a chunk for generation unless it is resident or already queued.
    ///
    /// # Returns
    /// `true` when the request was queued.
    pub fn request_chunk(&mut self, key: ChunkKey) -> bool {
        if self.chunks.contains_key(&key) {
            return false;
        }
        self.queue.push(key)
    }

    /// Drops queued requests that `keep` rejects.
    pub fn retain_queued<F: FnMut(&ChunkKey) -> bool>(&mut self, keep: F) {
        self.queue.retain(keep);
    }

    /// Number of chunks waiting for generation.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if the chunk is waiting for generation.
    pub fn is_queued(&self, key: ChunkKey) -> bool {
        self.queue.contains(key)
    }

    /// Generates up to `max_chunks` queued chunks, closest to `center` first.
    ///
    /// # Returns
    /// The keys generated this call, in generation order.
    pub fn process_queue(
        &mut self,
        sampler: &TerrainSampler,
        max_chunks: usize,
        center: ChunkKey,
    ) -> Vec<ChunkKey> {
        let mut generated = Vec::new();
        while generated.len() < max_chunks {
            let Some(key) = self.queue.pop_nearest(center) else {
                break;
            };
            if self.chunks.contains_key(&key) {
                continue;
            }
            self.generate_now(key, sampler);
            generated.push(key);
        }
        generated
    }

    /// Generates (or regenerates) a chunk immediately.
    ///
    /// The chunk and its resident neighbours are marked mesh-dirty.
    pub fn generate_now(&mut self, key: ChunkKey, sampler: &TerrainSampler) -> &Chunk {
        let start = Instant::now();
        let chunk = generate_chunk(
            key,
            sampler,
            self.overrides.bucket(key),
            self.chunk_size,
            self.world_height,
        );

        self.stats.generated_chunks += 1;
        if let Some((low, high)) = chunk.provenance().height_range {
            self.stats.min_height_seen = Some(self.stats.min_height_seen.map_or(low, |m| m.min(low)));
            self.stats.max_height_seen = Some(self.stats.max_height_seen.map_or(high, |m| m.max(high)));
        }
        debug!(
            "Generated chunk ({}, {}) with {} solid voxels in {:?}",
            key.cx,
            key.cz,
            chunk.solid_count(),
            start.elapsed()
        );

        self.chunks.insert(key, chunk);
        self.mark_mesh_dirty(key);
        for neighbor in key.neighbors() {
            self.mark_mesh_dirty(neighbor);
        }
        &self.chunks[&key]
    }

    /// Makes an already built chunk resident, replacing any previous one.
    ///
    /// Used for hand-built fixtures; statistics are left untouched.
    pub fn insert_chunk(&mut self, chunk: Chunk) {
        let key = chunk.key;
        self.queue.retain(|queued| *queued != key);
        self.chunks.insert(key, chunk);
        self.mark_mesh_dirty(key);
        for neighbor in key.neighbors() {
            self.mark_mesh_dirty(neighbor);
        }
    }

    /// Removes a resident chunk and forgets its mesh-dirty flag.
    ///
    /// # Returns
    /// `true` if the chunk was resident.
    pub fn unload(&mut self, key: ChunkKey) -> bool {
        self.mesh_dirty.remove(&key);
        self.chunks.remove(&key).is_some()
    }

    /// Returns `true` if the chunk is resident.
    pub fn is_resident(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    /// The resident chunk at `key`.
    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Keys of every resident chunk, in no particular order.
    pub fn resident_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    /// Number of resident chunks.
    pub fn resident_len(&self) -> usize {
        self.chunks.len()
    }

    /// Flags a resident chunk for remeshing. Non-resident keys are ignored.
    pub fn mark_mesh_dirty(&mut self, key: ChunkKey) {
        if self.chunks.contains_key(&key) {
            self.mesh_dirty.insert(key);
        }
    }

    /// Returns `true` if the chunk's mesh is stale.
    pub fn is_mesh_dirty(&self, key: ChunkKey) -> bool {
        self.mesh_dirty.contains(&key)
    }

    /// Drains the dirty set.
    ///
    /// # Returns
    /// The stale keys, sorted so that remeshing order is reproducible.
    pub fn take_mesh_dirty(&mut self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self.mesh_dirty.drain().collect();
        keys.sort();
        keys
    }

    /// Reads the effective block at a world coordinate.
    pub fn block_at(&self, coordinate: Point3<i32>) -> BlockId {
        let (key, lx, lz) = split_world_coordinate(coordinate.x, coordinate.z, self.chunk_size);
        self.chunks
            .get(&key)
            .map_or(AIR_ID, |chunk| chunk.get_local(lx, coordinate.y, lz))
    }

    /// Returns `true` if the voxel at a world coordinate is solid.
    pub fn is_solid_at(&self, coordinate: Point3<i32>) -> bool {
        is_solid_id(self.block_at(coordinate))
    }

    /// Highest solid layer of a resident column.
    pub fn column_top(&self, wx: i32, wz: i32) -> Option<i32> {
        let (key, lx, lz) = split_world_coordinate(wx, wz, self.chunk_size);
        self.chunks.get(&key)?.column_height(lx, lz)
    }

    /// Writes a voxel into a resident chunk.
    ///
    /// The chunk is marked mesh-dirty, and so is the neighbour across any
    /// boundary the voxel touches.
    ///
    /// # Returns
    /// The previous block id, or `None` when the chunk is not resident or `y`
    /// is outside the world (nothing is written).
    pub fn set_block(&mut self, coordinate: Point3<i32>, block_id: BlockId) -> Option<BlockId> {
        let (key, lx, lz) = split_world_coordinate(coordinate.x, coordinate.z, self.chunk_size);
        let chunk = self.chunks.get_mut(&key)?;
        let previous = chunk.set_local(lx, coordinate.y, lz, block_id)?;
        if previous == block_id {
            return Some(previous);
        }
        chunk.provenance_mut().local_edits += 1;

        self.mark_mesh_dirty(key);
        let last = self.chunk_size - 1;
        if lx == 0 {
            self.mark_mesh_dirty(key.offset(-1, 0));
        }
        if lx == last {
            self.mark_mesh_dirty(key.offset(1, 0));
        }
        if lz == 0 {
            self.mark_mesh_dirty(key.offset(0, -1));
        }
        if lz == last {
            self.mark_mesh_dirty(key.offset(0, 1));
        }
        Some(previous)
    }

    /// Records an authoritative edit and applies it if the chunk is resident.
    ///
    /// # Returns
    /// `false` when `y` is outside the world.
    pub fn apply_override(&mut self, coordinate: Point3<i32>, block_id: BlockId) -> bool {
        if !self.overrides.insert(coordinate, block_id) {
            return false;
        }
        self.set_block(coordinate, block_id);
        true
    }

    /// Running generation statistics.
    pub fn stats(&self) -> GenerationStats {
        self.stats
    }
}

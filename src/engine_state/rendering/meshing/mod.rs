//! Mesh generation and management for voxel rendering.
//!
//! This module turns resident chunks into renderable geometry and keeps exactly
//! one mesh per chunk that has visible faces.
//!
//! # Architecture
//! - `MeshManager`: owns the chunk meshes, drains the store's dirty set and
//!   records what changed for the renderer to pull
//! - `mesh/`: face quads, the per-chunk container and the culled mesher
//! - `palette`: deterministic vertex colouring
//!
//! # Lifecycle
//! A rebuild fully replaces the previous mesh of a chunk. A chunk that produces
//! no faces has no mesh, and unloading a chunk disposes of its mesh.

use std::collections::HashMap;

use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{chunk::ChunkKey, chunk_store::ChunkStore};

pub mod mesh;
pub mod palette;

pub use mesh::*;
pub use palette::MeshPalette;

/// A mesh change the renderer has not seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshChange {
    /// The chunk has a new mesh; fetch it with [`MeshManager::mesh`].
    Updated(ChunkKey),
    /// The chunk's mesh was disposed.
    Removed(ChunkKey),
}

/// Mesh counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Meshes built since the session started.
    pub built: u64,
    /// Meshes disposed since the session started, including replaced ones.
    pub disposed: u64,
}

/// Owns the meshes of resident chunks.
#[derive(Debug)]
pub struct MeshManager {
    meshes: HashMap<ChunkKey, ChunkMesh>,
    palette: MeshPalette,
    changes: Vec<MeshChange>,
    stats: MeshStats,
}

impl MeshManager {
    /// Creates an empty manager.
    pub fn new(palette: MeshPalette) -> Self {
        Self {
            meshes: HashMap::new(),
            palette,
            changes: Vec::new(),
            stats: MeshStats::default(),
        }
    }

    /// Rebuilds every mesh-dirty chunk of the store.
    ///
    /// # Returns
    /// The number of chunks processed.
    pub fn rebuild_dirty(&mut self, store: &mut ChunkStore) -> usize {
        let dirty = store.take_mesh_dirty();
        for &key in &dirty {
            self.rebuild_chunk(store, key);
        }
        dirty.len()
    }

    /// Rebuilds one chunk's mesh, replacing any previous one.
    ///
    /// # Returns
    /// `true` if the chunk now has a mesh.
    pub fn rebuild_chunk(&mut self, store: &ChunkStore, key: ChunkKey) -> bool {
        let start = Instant::now();
        match build_chunk_mesh(store, key, &self.palette) {
            Some(mesh) => {
                debug!(
                    "Meshed chunk ({}, {}): {} faces in {:?}",
                    key.cx,
                    key.cz,
                    mesh.face_count,
                    start.elapsed()
                );
                if self.meshes.insert(key, mesh).is_some() {
                    self.stats.disposed += 1;
                }
                self.stats.built += 1;
                self.changes.push(MeshChange::Updated(key));
                true
            }
            None => {
                self.dispose(key);
                false
            }
        }
    }

    /// Disposes of a chunk's mesh.
    ///
    /// # Returns
    /// `true` if a mesh existed.
    pub fn dispose(&mut self, key: ChunkKey) -> bool {
        if self.meshes.remove(&key).is_none() {
            return false;
        }
        self.stats.disposed += 1;
        self.changes.push(MeshChange::Removed(key));
        true
    }

    /// The current mesh of a chunk.
    pub fn mesh(&self, key: ChunkKey) -> Option<&ChunkMesh> {
        self.meshes.get(&key)
    }

    /// Number of live meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` when no mesh is live.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drains the change log.
    pub fn take_changes(&mut self) -> Vec<MeshChange> {
        std::mem::take(&mut self.changes)
    }

    /// Build and dispose counters.
    pub fn stats(&self) -> MeshStats {
        self.stats
    }
}

//! Mesh generation for voxel chunks.
//!
//! - `face`: quad corners of a single voxel face
//! - `mesh`: the indexed per-chunk vertex container
//! - `culled`: the face-culled mesher

pub mod culled;
pub mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use culled::build_chunk_mesh;
pub use face::Face;
pub use mesh::ChunkMesh;

//! Rendering-side data for the voxel engine.
//!
//! The engine stops at renderer-ready geometry: chunk meshes with a plain old
//! data vertex layout and a change log the renderer pulls each frame. Drawing
//! itself belongs to the embedding application.

pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use meshing::MeshManager;
pub use vertex::Vertex;

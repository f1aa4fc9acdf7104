//! Mesh data structures for voxel rendering.
//!
//! A `ChunkMesh` holds the indexed triangle list of one chunk: four vertices
//! and six indices per visible face.

use crate::engine_state::{rendering::Vertex, voxels::chunk::ChunkKey};

use super::face::Face;

/// Renderable geometry of one resident chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    /// The chunk this mesh was built from
    pub key: ChunkKey,
    /// Four vertices per face
    pub vertices: Vec<Vertex>,
    /// Six indices per face
    pub indices: Vec<u32>,
    /// Number of faces emitted
    pub face_count: u32,
}

impl ChunkMesh {
    /// Creates an empty mesh for a chunk.
    pub fn new(key: ChunkKey) -> Self {
        ChunkMesh {
            key,
            vertices: Vec::new(),
            indices: Vec::new(),
            face_count: 0,
        }
    }

    /// Appends one face with a single colour on all four corners.
    pub fn add_face(&mut self, face: &Face, color: [f32; 3]) {
        let normal = face.block_side.normal();
        self.vertices.extend_from_slice(&Self::generate_face_vertices(face, normal, color));
        self.indices.extend(Self::generate_face_indices(self.face_count));
        self.face_count += 1;
    }

    /// Generates the four vertices of a face in the order ll, lr, ul, ur.
    pub fn generate_face_vertices(
        face: &Face,
        normal: cgmath::Vector3<i32>,
        color: [f32; 3],
    ) -> [Vertex; 4] {
        [
            Vertex::new(face.ll, normal, color),
            Vertex::new(face.lr, normal, color),
            Vertex::new(face.ul, normal, color),
            Vertex::new(face.ur, normal, color),
        ]
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Arguments
    /// * `num_faces_generated` - The number of faces that have been generated so far
    ///
    /// # Returns
    /// Six indices forming the triangles (ll, lr, ur) and (ll, ur, ul).
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    /// Returns `true` when no face was emitted.
    pub fn is_empty(&self) -> bool {
        self.face_count == 0
    }

    /// Vertex data as raw bytes, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes, ready for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

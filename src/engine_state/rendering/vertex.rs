//! Vertex data structures for voxel meshes.
//!
//! This module defines the vertex format emitted by the mesher. The layout is
//! plain old data so a renderer can upload vertex slices without conversion.

use cgmath::{Point3, Vector3};

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes), world space
/// - Normal: 3x f32 (12 bytes)
/// - Color: 3x f32 (12 bytes), linear RGB in `0..=1`
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Outward face normal
    pub normal: [f32; 3],
    /// Shaded vertex colour
    pub color: [f32; 3],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - Corner position in world voxel coordinates
    /// * `normal` - Outward normal of the face the vertex belongs to
    /// * `color` - Final shaded colour
    pub fn new(pos: Point3<i32>, normal: Vector3<i32>, color: [f32; 3]) -> Self {
        Vertex {
            position: [pos.x as f32, pos.y as f32, pos.z as f32],
            normal: [normal.x as f32, normal.y as f32, normal.z as f32],
            color,
        }
    }
}

//! # Block Side Module
//!
//! This module defines the six faces of a voxel together with their outward
//! normals and the flat shading factor the mesher applies per face.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// # Returns
    /// An array containing all `BlockSide` variants.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Returns the outward unit normal of the face in voxel steps.
    ///
    /// Adding the normal to a voxel coordinate yields the neighbour this face looks at.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Flat lighting factor for the face.
    ///
    /// Top faces are fully lit, bottom faces darkest and the four sides sit in
    /// between, with the X-facing sides slightly brighter than the Z-facing ones.
    pub fn shade(self) -> f32 {
        match self {
            BlockSide::TOP => 1.0,
            BlockSide::LEFT | BlockSide::RIGHT => 0.82,
            BlockSide::FRONT | BlockSide::BACK => 0.72,
            BlockSide::BOTTOM => 0.5,
        }
    }
}

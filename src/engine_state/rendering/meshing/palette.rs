//! Vertex colouring for voxel faces.
//!
//! The colour of a face is its block's base colour, multiplied by the face
//! shade, an altitude lightening term and two deterministic jitters: a coarse
//! one shared by the whole column and a fine one per voxel. Jitter is seeded
//! from the world seed and the coordinates, so a rebuild reproduces identical
//! colours.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType, BlockId};

const COARSE_JITTER: f32 = 0.06;
const FINE_JITTER: f32 = 0.025;
const ALTITUDE_LIGHTEN: f32 = 0.22;

/// Colour of ids outside the block catalogue.
const FALLBACK_COLOR: u32 = 0x6ab85f;

/// Converts a `0xRRGGBB` literal to linear components.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Base colour of a block before shading.
pub fn base_color(block_id: BlockId) -> [f32; 3] {
    let hex = match BlockType::from_id(block_id) {
        Some(BlockType::GRASS) => 0x4da64f,
        Some(BlockType::DIRT) => 0x7a5a3a,
        Some(BlockType::STONE) => 0x8f959d,
        Some(BlockType::FIRE) => 0xd64541,
        Some(BlockType::WIND) => 0x4f8ed6,
        Some(BlockType::BRIDGE) => 0x6f4f3f,
        Some(BlockType::EARTH) => 0x8a6848,
        Some(BlockType::AIR) | None => FALLBACK_COLOR,
    };
    hex_to_rgb(hex)
}

/// Per-session colouring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPalette {
    seed_hash: u32,
    reference_height: f32,
    world_height: f32,
}

impl MeshPalette {
    /// Creates a palette.
    ///
    /// # Arguments
    /// * `seed_hash` - Seed hash of the world, used for jitter
    /// * `reference_height` - Height at which altitude lightening is neutral
    /// * `world_height` - Number of voxel layers
    pub fn new(seed_hash: u32, reference_height: i32, world_height: i32) -> Self {
        Self {
            seed_hash,
            reference_height: reference_height as f32,
            world_height: world_height as f32,
        }
    }

    /// Final colour of one face of a voxel.
    pub fn face_color(&self, block_id: BlockId, voxel: Point3<i32>, side: BlockSide) -> [f32; 3] {
        let span = (self.world_height - self.reference_height).max(1.0);
        let altitude = ((voxel.y as f32 - self.reference_height) / span).clamp(-0.5, 1.0);
        let coarse = self.jitter(voxel.x, i32::MIN, voxel.z) * COARSE_JITTER;
        let fine = self.jitter(voxel.x, voxel.y, voxel.z) * FINE_JITTER;
        let factor = side.shade() * (1.0 + altitude * ALTITUDE_LIGHTEN) * (1.0 + coarse) * (1.0 + fine);

        base_color(block_id).map(|channel| (channel * factor).clamp(0.0, 1.0))
    }

    /// Deterministic value in `[-1, 1)` for a lattice point.
    fn jitter(&self, x: i32, y: i32, z: i32) -> f32 {
        let mut hash = u64::from(self.seed_hash) ^ 0x9e37_79b9_7f4a_7c15;
        for value in [x, y, z] {
            hash ^= u64::from(value as u32);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            hash ^= hash >> 29;
        }
        fastrand::Rng::with_seed(hash).f32() * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_literals_convert_to_unit_channels() {
        assert_eq!(hex_to_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb(0x000000), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn colors_are_deterministic_and_bounded() {
        let palette = MeshPalette::new(42, 52, 128);
        let voxel = Point3::new(-7, 60, 19);
        let a = palette.face_color(BlockType::FIRE.id(), voxel, BlockSide::TOP);
        let b = palette.face_color(BlockType::FIRE.id(), voxel, BlockSide::TOP);
        assert_eq!(a, b);
        assert!(a.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn top_faces_are_brighter_than_bottom_faces() {
        let palette = MeshPalette::new(7, 52, 128);
        let voxel = Point3::new(0, 52, 0);
        let top = palette.face_color(BlockType::STONE.id(), voxel, BlockSide::TOP);
        let bottom = palette.face_color(BlockType::STONE.id(), voxel, BlockSide::BOTTOM);
        assert!(top.iter().zip(bottom.iter()).all(|(t, b)| t > b));
    }
}

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, BlockId};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points in world voxel coordinates
/// (lower-left, lower-right, upper-right, upper-left). Walking the corners in that
/// order is counter-clockwise when viewed from outside the voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Lower-left corner of the face
    pub ll: Point3<i32>,
    /// Lower-right corner of the face
    pub lr: Point3<i32>,
    /// Upper-right corner of the face
    pub ur: Point3<i32>,
    /// Upper-left corner of the face
    pub ul: Point3<i32>,
    /// The block this face belongs to
    pub block_id: BlockId,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face of the voxel at `voxel` on the given side.
    ///
    /// # Arguments
    /// * `voxel` - World coordinates of the voxel's minimum corner
    /// * `block_id` - The block the face belongs to
    /// * `block_side` - Which side of the block this face represents
    ///
    /// # Returns
    /// A new `Face` with corners wound counter-clockwise around the outward normal.
    pub fn new(voxel: Point3<i32>, block_id: BlockId, block_side: BlockSide) -> Self {
        let (i, j, k) = (voxel.x, voxel.y, voxel.z);
        let [ll, lr, ur, ul] = match block_side {
            BlockSide::FRONT => [
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k + 1),
            ],
            BlockSide::BACK => [
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i, j + 1, k),
                Point3::new(i + 1, j + 1, k),
            ],
            BlockSide::BOTTOM => [
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j, k + 1),
            ],
            BlockSide::TOP => [
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ],
            BlockSide::LEFT => [
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i, j + 1, k),
            ],
            BlockSide::RIGHT => [
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ],
        };

        Face {
            ll,
            lr,
            ur,
            ul,
            block_id,
            block_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, Vector3};

    use super::*;

    #[test]
    fn corners_wind_around_the_outward_normal() {
        for side in BlockSide::all() {
            let face = Face::new(Point3::new(3, 4, -2), 1, side);
            let a: Vector3<i32> = face.lr - face.ll;
            let b: Vector3<i32> = face.ur - face.ll;
            let cross = Vector3::new(
                a.y * b.z - a.z * b.y,
                a.z * b.x - a.x * b.z,
                a.x * b.y - a.y * b.x,
            );
            assert_eq!(cross, side.normal(), "winding of {side:?}");
            let centroid = (face.ll.to_vec() + face.lr.to_vec() + face.ur.to_vec() + face.ul.to_vec()) * 2;
            let voxel_center = Vector3::new(3 * 8 + 4, 4 * 8 + 4, -2 * 8 + 4);
            assert_eq!(centroid - voxel_center, side.normal() * 4, "placement of {side:?}");
        }
    }
}

//! # Voxel Raycast
//!
//! Amanatides–Woo grid traversal. Starting from the voxel containing the origin,
//! the ray steps one voxel at a time across whichever axis boundary comes next,
//! so every voxel the ray touches is visited exactly once and in order.
//!
//! The traversal stops at the first solid voxel, when the travelled distance
//! exceeds the maximum distance, or after a fixed number of steps.

use cgmath::{InnerSpace, Point3, Vector3};

/// The first solid voxel along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The solid voxel.
    pub block: Point3<i32>,
    /// Normal of the face the ray entered through. Zero when the origin is
    /// already inside the voxel.
    pub normal: Vector3<i32>,
    /// Distance from the origin to the entry point.
    pub distance: f32,
}

impl RayHit {
    /// The empty voxel in front of the entered face.
    ///
    /// # Returns
    /// `None` when the ray started inside the hit voxel.
    pub fn adjacent(&self) -> Option<Point3<i32>> {
        (self.normal != Vector3::new(0, 0, 0)).then(|| self.block + self.normal)
    }
}

/// Casts a ray through the voxel grid.
///
/// # Arguments
/// * `is_solid` - Solidity lookup by world voxel coordinate
/// * `origin` - Ray origin in world space
/// * `direction` - Ray direction; need not be normalised
/// * `max_distance` - Longest distance to travel
/// * `max_steps` - Hard cap on visited voxels
///
/// # Returns
/// The first solid voxel, its entry normal and distance, or `None`.
pub fn raycast<F>(
    is_solid: F,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    max_steps: usize,
) -> Option<RayHit>
where
    F: Fn(Point3<i32>) -> bool,
{
    let length = direction.magnitude();
    if !length.is_finite() || length < 1e-6 || !max_distance.is_finite() {
        return None;
    }
    let dir = direction / length;

    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    if is_solid(cell) {
        return Some(RayHit {
            block: cell,
            normal: Vector3::new(0, 0, 0),
            distance: 0.0,
        });
    }

    let step = [axis_step(dir.x), axis_step(dir.y), axis_step(dir.z)];
    let o = [origin.x, origin.y, origin.z];
    let d = [dir.x, dir.y, dir.z];
    let c = [cell.x, cell.y, cell.z];

    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for axis in 0..3 {
        if step[axis] == 0 {
            continue;
        }
        t_delta[axis] = 1.0 / d[axis].abs();
        let boundary = if step[axis] > 0 {
            c[axis] as f32 + 1.0
        } else {
            c[axis] as f32
        };
        t_max[axis] = (boundary - o[axis]) / d[axis];
    }

    for _ in 0..max_steps {
        let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
            0
        } else if t_max[1] <= t_max[2] {
            1
        } else {
            2
        };
        let distance = t_max[axis];
        if distance > max_distance {
            return None;
        }

        let mut normal = Vector3::new(0, 0, 0);
        match axis {
            0 => {
                cell.x += step[0];
                normal.x = -step[0];
            }
            1 => {
                cell.y += step[1];
                normal.y = -step[1];
            }
            _ => {
                cell.z += step[2];
                normal.z = -step[2];
            }
        }
        t_max[axis] += t_delta[axis];

        if is_solid(cell) {
            return Some(RayHit {
                block: cell,
                normal,
                distance,
            });
        }
    }
    None
}

#[inline]
fn axis_step(component: f32) -> i32 {
    if component > 0.0 {
        1
    } else if component < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_down_hits_the_top_face() {
        let floor = 10;
        let hit = raycast(
            |c| c.y <= floor,
            Point3::new(3.0, 40.0, -5.0),
            Vector3::new(0.0, -1.0, 0.0),
            100.0,
            256,
        )
        .expect("the floor is below the origin");
        assert_eq!(hit.block, Point3::new(3, floor, -5));
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
        assert!((hit.distance - 29.0).abs() < 1e-4);
        assert_eq!(hit.adjacent(), Some(Point3::new(3, floor + 1, -5)));
    }

    #[test]
    fn diagonal_ray_enters_through_the_nearest_face() {
        let target = Point3::new(4, 0, 0);
        let hit = raycast(
            |c| c == target,
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            10.0,
            64,
        )
        .expect("wall ahead");
        assert_eq!(hit.block, target);
        assert_eq!(hit.normal, Vector3::new(-1, 0, 0));
        assert!((hit.distance - 3.5).abs() < 1e-4);
    }

    #[test]
    fn respects_distance_and_step_caps() {
        let solid = |c: Point3<i32>| c.x >= 20;
        let origin = Point3::new(0.5, 0.5, 0.5);
        let east = Vector3::new(1.0, 0.0, 0.0);
        assert!(raycast(solid, origin, east, 5.0, 256).is_none());
        assert!(raycast(solid, origin, east, 100.0, 4).is_none());
        assert!(raycast(solid, origin, east, 100.0, 256).is_some());
    }

    #[test]
    fn origin_inside_solid_reports_zero_normal() {
        let hit = raycast(|_| true, Point3::new(0.2, 0.2, 0.2), Vector3::new(0.0, 1.0, 0.0), 5.0, 8)
            .expect("inside solid");
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.adjacent(), None);
    }

    #[test]
    fn zero_direction_never_hits() {
        assert!(raycast(|_| true, Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0), 5.0, 8).is_none());
    }
}

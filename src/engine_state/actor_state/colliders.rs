//! Static obstacles that are not voxels: decor, props, trunks.
//!
//! Colliders are vertical prisms with a cylinder or square footprint. The
//! caller owns their lifetime and keys them by id.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

/// Horizontal footprint of a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle of `radius`.
    Cylinder {
        /// Footprint radius.
        radius: f32,
    },
    /// Axis-aligned rectangle.
    Aabb {
        /// Half extent along x.
        half_x: f32,
        /// Half extent along z.
        half_z: f32,
    },
}

/// A vertical prism standing on `base_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    /// Footprint centre x.
    pub x: f32,
    /// Footprint centre z.
    pub z: f32,
    /// Bottom of the prism.
    pub base_y: f32,
    /// Prism height.
    pub height: f32,
    /// Footprint.
    pub shape: ColliderShape,
}

impl StaticCollider {
    /// Returns `true` if an upright body of `radius` and `height` at `(x, feet, z)` overlaps.
    pub fn blocks_body(&self, x: f32, feet: f32, z: f32, radius: f32, height: f32) -> bool {
        if feet >= self.base_y + self.height || feet + height <= self.base_y {
            return false;
        }
        let dx = x - self.x;
        let dz = z - self.z;
        match self.shape {
            ColliderShape::Cylinder { radius: r } => {
                let reach = r + radius;
                dx * dx + dz * dz < reach * reach
            }
            ColliderShape::Aabb { half_x, half_z } => {
                dx.abs() < half_x + radius && dz.abs() < half_z + radius
            }
        }
    }

    /// Distance along a normalised ray to the first point inside the prism.
    pub fn ray_hit(&self, origin: Point3<f32>, direction: Vector3<f32>, max_distance: f32) -> Option<f32> {
        let (mut near, mut far) = self.footprint_interval(origin, direction)?;

        let top = self.base_y + self.height;
        if direction.y.abs() < 1e-6 {
            if origin.y < self.base_y || origin.y > top {
                return None;
            }
        } else {
            let t0 = (self.base_y - origin.y) / direction.y;
            let t1 = (top - origin.y) / direction.y;
            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
        }

        let entry = near.max(0.0);
        (entry <= far && entry <= max_distance).then_some(entry)
    }

    fn footprint_interval(&self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<(f32, f32)> {
        let ox = origin.x - self.x;
        let oz = origin.z - self.z;
        match self.shape {
            ColliderShape::Cylinder { radius } => {
                let a = direction.x * direction.x + direction.z * direction.z;
                let c = ox * ox + oz * oz - radius * radius;
                if a < 1e-9 {
                    return (c <= 0.0).then_some((f32::NEG_INFINITY, f32::INFINITY));
                }
                let b = 2.0 * (ox * direction.x + oz * direction.z);
                let discriminant = b * b - 4.0 * a * c;
                if discriminant < 0.0 {
                    return None;
                }
                let root = discriminant.sqrt();
                Some(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)))
            }
            ColliderShape::Aabb { half_x, half_z } => {
                let (x0, x1) = slab(ox, direction.x, half_x)?;
                let (z0, z1) = slab(oz, direction.z, half_z)?;
                let near = x0.max(z0);
                let far = x1.min(z1);
                (near <= far).then_some((near, far))
            }
        }
    }
}

fn slab(offset: f32, direction: f32, half: f32) -> Option<(f32, f32)> {
    if direction.abs() < 1e-6 {
        return (offset.abs() <= half).then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let t0 = (-half - offset) / direction;
    let t1 = (half - offset) / direction;
    Some((t0.min(t1), t0.max(t1)))
}

/// Every static collider of the session, keyed by caller-chosen id.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: HashMap<u64, StaticCollider>,
}

impl ColliderSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a collider.
    pub fn insert(&mut self, id: u64, collider: StaticCollider) -> Option<StaticCollider> {
        self.colliders.insert(id, collider)
    }

    /// Removes a collider.
    pub fn remove(&mut self, id: u64) -> Option<StaticCollider> {
        self.colliders.remove(&id)
    }

    /// Removes every collider.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Number of colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Returns `true` when the set is empty.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Returns `true` if any collider overlaps the body.
    pub fn blocks_body(&self, x: f32, feet: f32, z: f32, radius: f32, height: f32) -> bool {
        self.colliders
            .values()
            .any(|c| c.blocks_body(x, feet, z, radius, height))
    }

    /// Nearest collider hit along a normalised ray.
    pub fn ray_hit(&self, origin: Point3<f32>, direction: Vector3<f32>, max_distance: f32) -> Option<f32> {
        self.colliders
            .values()
            .filter_map(|c| c.ray_hit(origin, direction, max_distance))
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trunk() -> StaticCollider {
        StaticCollider {
            x: 0.0,
            z: 0.0,
            base_y: 10.0,
            height: 4.0,
            shape: ColliderShape::Cylinder { radius: 0.5 },
        }
    }

    #[test]
    fn overlap_is_inflated_by_the_body_radius() {
        let c = trunk();
        assert!(c.blocks_body(0.7, 10.0, 0.0, 0.28, 1.8));
        assert!(!c.blocks_body(0.9, 10.0, 0.0, 0.28, 1.8));
        assert!(!c.blocks_body(0.0, 14.0, 0.0, 0.28, 1.8));
        assert!(!c.blocks_body(0.0, 8.0, 0.0, 0.28, 1.8));
    }

    #[test]
    fn square_footprint_overlap() {
        let crate_box = StaticCollider {
            shape: ColliderShape::Aabb { half_x: 0.5, half_z: 1.0 },
            ..trunk()
        };
        assert!(crate_box.blocks_body(0.7, 10.0, 1.2, 0.28, 1.8));
        assert!(!crate_box.blocks_body(0.7, 10.0, 1.4, 0.28, 1.8));
    }

    #[test]
    fn rays_hit_the_nearest_collider() {
        let mut set = ColliderSet::new();
        set.insert(1, trunk());
        set.insert(
            2,
            StaticCollider {
                x: 3.0,
                ..trunk()
            },
        );
        let hit = set
            .ray_hit(Point3::new(-5.0, 11.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 20.0)
            .expect("trunk ahead");
        assert!((hit - 4.5).abs() < 1e-4);
        assert!(set
            .ray_hit(Point3::new(-5.0, 20.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 20.0)
            .is_none());
        assert!(set
            .ray_hit(Point3::new(-5.0, 11.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 3.0)
            .is_none());
    }
}

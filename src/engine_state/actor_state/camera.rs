//! # Third-Person Camera
//!
//! Orbits a focus point above the actor's feet at a configurable yaw, pitch and
//! distance.
//!
//! ## Collision
//!
//! The segment from the focus point to the desired camera position is cast
//! against terrain (voxel DDA) and static colliders. When something is hit the
//! camera is pulled in front of it by a padding margin, and the shortened segment
//! is re-validated, halving it until the line of sight is clear.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::engine_state::{
    config::CameraConfig,
    interaction::raycast::raycast,
    voxels::chunk_store::ChunkStore,
};

use super::colliders::ColliderSet;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Closest the camera gets to the focus point when pulled in.
const MIN_CAMERA_GAP: f32 = 0.1;

/// Halvings tried when re-validating a pulled-in position.
const REVALIDATION_STEPS: usize = 4;

/// Iteration cap for camera rays.
const CAMERA_RAY_STEPS: usize = 128;

/// Orbiting follow camera.
#[derive(Debug, Clone)]
pub struct ThirdPersonCamera {
    /// Orbit yaw; the camera looks along `(sin yaw, 0, cos yaw)` at pitch 0.
    pub yaw: Rad<f32>,
    /// Orbit pitch, positive above the focus point.
    pub pitch: Rad<f32>,
    /// Unobstructed orbit distance.
    pub distance: f32,
    /// Current camera position.
    pub position: Point3<f32>,
    config: CameraConfig,
    initialized: bool,
}

impl ThirdPersonCamera {
    /// Creates a camera with the configured pitch and distance.
    pub fn new(config: CameraConfig) -> Self {
        let pitch = config
            .pitch
            .clamp(config.min_pitch, config.max_pitch.max(config.min_pitch))
            .clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
        let distance = config
            .distance
            .clamp(config.min_distance, config.max_distance.max(config.min_distance));
        Self {
            yaw: Rad(0.0),
            pitch: Rad(pitch),
            distance,
            position: Point3::new(0.0, 0.0, 0.0),
            config,
            initialized: false,
        }
    }

    /// Rotates the orbit.
    ///
    /// # Arguments
    /// * `yaw_delta` - Radians added to the yaw
    /// * `pitch_delta` - Radians added to the pitch, clamped to the configured range
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if yaw_delta.is_finite() {
            self.yaw = Rad(super::wrap_angle(self.yaw.0 + yaw_delta));
        }
        if pitch_delta.is_finite() {
            let max = self.config.max_pitch.max(self.config.min_pitch);
            self.pitch = Rad((self.pitch.0 + pitch_delta)
                .clamp(self.config.min_pitch, max)
                .clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
        }
    }

    /// Changes the orbit distance within the configured range.
    pub fn zoom(&mut self, delta: f32) {
        if delta.is_finite() {
            let max = self.config.max_distance.max(self.config.min_distance);
            self.distance = (self.distance + delta).clamp(self.config.min_distance, max);
        }
    }

    /// Point the camera orbits.
    pub fn focus(&self, actor_feet: Point3<f32>) -> Point3<f32> {
        Point3::new(actor_feet.x, actor_feet.y + self.config.target_height, actor_feet.z)
    }

    /// Unobstructed camera position for a focus point.
    pub fn desired_position(&self, focus: Point3<f32>) -> Point3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Point3::new(
            focus.x - yaw_sin * self.distance * pitch_cos,
            focus.y + pitch_sin * self.distance,
            focus.z - yaw_cos * self.distance * pitch_cos,
        )
    }

    /// Pulls `desired` toward `focus` until the line of sight is clear.
    pub fn resolve_collision(
        &self,
        focus: Point3<f32>,
        desired: Point3<f32>,
        store: &ChunkStore,
        colliders: &ColliderSet,
    ) -> Point3<f32> {
        let offset = desired - focus;
        let length = offset.magnitude();
        if !length.is_finite() || length < 1e-4 {
            return desired;
        }
        let direction = offset / length;

        let Some(hit) = first_obstruction(focus, direction, length, store, colliders) else {
            return desired;
        };
        let mut allowed = (hit - self.config.collision_padding).max(MIN_CAMERA_GAP).min(length);
        for _ in 0..REVALIDATION_STEPS {
            if first_obstruction(focus, direction, allowed, store, colliders).is_none() {
                break;
            }
            allowed = (allowed * 0.5).max(MIN_CAMERA_GAP);
        }
        focus + direction * allowed
    }

    /// Moves the camera toward its resolved position.
    ///
    /// An obstructed camera snaps in immediately; otherwise it follows with
    /// exponential smoothing and snaps only if the smoothed position would lose
    /// line of sight.
    pub fn update(&mut self, dt: f32, actor_feet: Point3<f32>, store: &ChunkStore, colliders: &ColliderSet) {
        let focus = self.focus(actor_feet);
        let desired = self.desired_position(focus);
        let resolved = self.resolve_collision(focus, desired, store, colliders);
        let obstructed = (resolved - focus).magnitude() + 1e-3 < (desired - focus).magnitude();

        if !self.initialized || obstructed || !dt.is_finite() {
            self.position = resolved;
            self.initialized = true;
            return;
        }

        let blend = (self.config.follow_lerp * dt.max(0.0)).min(1.0);
        let smoothed = self.position + (resolved - self.position) * blend;
        let sight = smoothed - focus;
        let sight_length = sight.magnitude();
        let blocked = sight_length > 1e-4
            && first_obstruction(focus, sight / sight_length, sight_length, store, colliders).is_some();
        self.position = if blocked { resolved } else { smoothed };
    }

    /// Ray from the camera through the focus point, for picking.
    pub fn view_ray(&self, actor_feet: Point3<f32>) -> (Point3<f32>, Vector3<f32>) {
        let focus = self.focus(actor_feet);
        let direction = focus - self.position;
        if direction.magnitude2() < 1e-8 {
            let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
            return (self.position, Vector3::new(yaw_sin, 0.0, yaw_cos));
        }
        (self.position, direction.normalize())
    }

    /// View matrix looking at the actor's focus point.
    pub fn view_matrix(&self, actor_feet: Point3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.focus(actor_feet), Vector3::unit_y())
    }

    /// Movement heading implied by the camera: straight away from it.
    pub fn heading(&self) -> f32 {
        self.yaw.0
    }
}

fn first_obstruction(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    store: &ChunkStore,
    colliders: &ColliderSet,
) -> Option<f32> {
    let terrain = raycast(|c| store.is_solid_at(c), origin, direction, max_distance, CAMERA_RAY_STEPS)
        .map(|hit| hit.distance);
    let props = colliders.ray_hit(origin, direction, max_distance);
    match (terrain, props) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, ChunkKey},
    };

    fn open_store() -> ChunkStore {
        let mut store = ChunkStore::new(16, 64);
        for cx in -1..=1 {
            for cz in -1..=1 {
                store.insert_chunk(Chunk::empty(ChunkKey::new(cx, cz), 16, 64));
            }
        }
        store
    }

    #[test]
    fn unobstructed_camera_sits_at_the_orbit_distance() {
        let store = open_store();
        let mut camera = ThirdPersonCamera::new(CameraConfig::default());
        let feet = Point3::new(0.5, 20.0, 0.5);
        camera.update(0.016, feet, &store, &ColliderSet::new());
        let gap = (camera.position - camera.focus(feet)).magnitude();
        assert!((gap - camera.distance).abs() < 1e-3);
        assert!(camera.position.z < feet.z);
    }

    #[test]
    fn walls_pull_the_camera_in() {
        let mut store = open_store();
        for x in -4..=4 {
            for y in 15..=30 {
                store.set_block(Point3::new(x, y, -3), BlockType::STONE.id());
            }
        }
        let mut camera = ThirdPersonCamera::new(CameraConfig::default());
        let feet = Point3::new(0.5, 20.0, 0.5);
        let colliders = ColliderSet::new();
        camera.update(0.016, feet, &store, &colliders);

        let focus = camera.focus(feet);
        assert!(camera.position.z > -2.0);
        let sight = camera.position - focus;
        assert!(first_obstruction(focus, sight.normalize(), sight.magnitude(), &store, &colliders).is_none());
    }

    #[test]
    fn pitch_and_zoom_stay_in_range() {
        let config = CameraConfig::default();
        let mut camera = ThirdPersonCamera::new(config.clone());
        camera.rotate(0.0, 10.0);
        assert_eq!(camera.pitch.0, config.max_pitch);
        camera.zoom(-100.0);
        assert_eq!(camera.distance, config.min_distance);
    }
}

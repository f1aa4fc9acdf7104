//! # Actor State
//!
//! Everything that moves the player actor through the voxel world.
//!
//! ## Key Components
//!
//! * `MovementController` - Grounded/Airborne state machine for free movement
//! * `GridMover` - tile-by-tile variant for touch input
//! * `ThirdPersonCamera` - orbiting follow camera that never clips into terrain
//! * `ColliderSet` - non-voxel obstacles
//! * `ground` - the probe ring used by every traversal test
//!
//! ## State Machine
//!
//! ```text
//!            jump / no ground below
//! Grounded ─────────────────────────► Airborne
//!     ▲                                   │
//!     └─── descending through valid ground┘
//! ```
//!
//! Horizontal moves are validated against colliders, the step height, the
//! maximum down-step, the maximum slope and the body's headroom. A rejected move
//! is retried along x alone and then z alone so the actor slides along walls.

use std::f32::consts::PI;

use cgmath::{Point3, Vector2, Zero};
use log::trace;

use crate::engine_state::{
    config::{HazardConfig, PhysicsConfig},
    voxels::chunk_store::ChunkStore,
};

use self::{
    colliders::ColliderSet,
    ground::{body_clear, find_ground, support_height, BodyShape, GroundWindow},
};

pub mod camera;
pub mod colliders;
pub mod grid;
pub mod ground;

/// Longest time step integrated in one tick.
pub const MAX_TICK_SECONDS: f32 = 0.05;

/// Fastest downward speed.
const TERMINAL_VELOCITY: f32 = 60.0;

/// Contact tolerance used when looking for ground under a falling actor.
const LANDING_SKIN: f32 = 0.05;

/// Vertical state of the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    /// Standing on walkable ground.
    #[default]
    Grounded,
    /// Jumping or falling.
    Airborne,
}

/// The player actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Feet position in world space.
    pub position: Point3<f32>,
    /// Facing around the vertical axis; 0 faces +z.
    pub yaw: f32,
    /// Horizontal velocity on (x, z).
    pub velocity: Vector2<f32>,
    /// Vertical velocity, positive upward.
    pub vertical_velocity: f32,
    /// Grounded or airborne.
    pub state: MotionState,
    /// Whether the actor moved horizontally last tick.
    pub moving: bool,
    /// Highest point of the current airborne phase.
    pub fall_start: f32,
}

impl Actor {
    /// A resting actor standing at `position`.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            yaw: 0.0,
            velocity: Vector2::zero(),
            vertical_velocity: 0.0,
            state: MotionState::Grounded,
            moving: false,
            fall_start: position.y,
        }
    }

    /// Returns `true` while standing on ground.
    pub fn is_grounded(&self) -> bool {
        self.state == MotionState::Grounded
    }

    /// The voxel column the actor stands in.
    pub fn grid_cell(&self) -> (i32, i32) {
        (self.position.x.floor() as i32, self.position.z.floor() as i32)
    }

    /// Puts the actor at rest at `position`.
    pub fn teleport(&mut self, position: Point3<f32>) {
        *self = Self {
            yaw: self.yaw,
            ..Self::new(position)
        };
    }
}

/// Movement intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementInput {
    /// Forward axis in `[-1, 1]`.
    pub forward: f32,
    /// Right axis in `[-1, 1]`.
    pub strafe: f32,
    /// Sprint modifier.
    pub sprint: bool,
    /// Jump edge.
    pub jump: bool,
    /// Heading the axes are relative to, usually the camera yaw.
    pub heading: f32,
}

/// A fatal event raised by movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HazardEvent {
    /// A landing ended a fall of `height` voxels.
    FallDeath {
        /// Fall height in voxels.
        height: f32,
    },
    /// The actor sank below the void height.
    VoidDeath,
}

/// What one movement tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementReport {
    /// Horizontal distance travelled.
    pub displacement: f32,
    /// The actor landed this tick.
    pub landed: bool,
    /// Part of the desired motion was rejected.
    pub blocked: bool,
    /// Hazard raised this tick.
    pub hazard: Option<HazardEvent>,
}

/// Outcome of a horizontal traversal test.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Traversal {
    /// Walkable ground at the given height.
    Ground(f32),
    /// No ground in reach but the space is open.
    Fall,
}

/// Free-movement physics.
#[derive(Debug, Clone)]
pub struct MovementController {
    physics: PhysicsConfig,
    hazards: HazardConfig,
}

impl MovementController {
    /// Creates a controller from sanitised tuning.
    pub fn new(physics: PhysicsConfig, hazards: HazardConfig) -> Self {
        Self { physics, hazards }
    }

    /// Movement tuning.
    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// The actor's collision body.
    pub fn body(&self) -> BodyShape {
        BodyShape {
            radius: self.physics.collision_radius,
            height: self.physics.body_height,
        }
    }

    /// Advances the actor by one tick.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the last tick, clamped to [`MAX_TICK_SECONDS`]
    /// * `input` - Movement intent
    /// * `actor` - The actor to move
    /// * `store` - Voxel data
    /// * `colliders` - Static obstacles
    ///
    /// # Returns
    /// A report of the tick.
    pub fn tick(
        &self,
        dt: f32,
        input: &MovementInput,
        actor: &mut Actor,
        store: &ChunkStore,
        colliders: &ColliderSet,
    ) -> MovementReport {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_TICK_SECONDS)
        } else {
            0.0
        };
        let mut report = MovementReport::default();

        self.blend_velocity(dt, input, actor);
        self.move_horizontal(dt, actor, store, colliders, &mut report);

        match actor.state {
            MotionState::Grounded => self.grounded_vertical(input, actor, store),
            MotionState::Airborne => self.airborne_vertical(dt, actor, store, &mut report),
        }

        if self.hazards.void_death_enabled && actor.position.y < self.hazards.void_height {
            report.hazard = Some(HazardEvent::VoidDeath);
        }

        self.turn_toward_travel(dt, actor);
        report
    }

    /// Snaps a grounded actor onto the ground under it.
    ///
    /// # Returns
    /// `false` when there is no ground within reach; the actor is left untouched.
    pub fn snap_to_ground(&self, actor: &mut Actor, store: &ChunkStore) -> bool {
        let window = GroundWindow::around(
            actor.position.y,
            self.physics.step_height,
            self.physics.max_down_step,
        );
        match find_ground(store, actor.position.x, actor.position.z, window, self.body()) {
            Some(hit) => {
                actor.position.y = hit.height;
                true
            }
            None => false,
        }
    }

    /// Ground height reachable by walking from the actor to `(x, z)`.
    ///
    /// Uses the same traversal rules as free movement.
    pub fn can_traverse(
        &self,
        actor: &Actor,
        x: f32,
        z: f32,
        store: &ChunkStore,
        colliders: &ColliderSet,
    ) -> Option<f32> {
        match self.resolve_horizontal(actor, x, z, store, colliders) {
            Some(Traversal::Ground(height)) => Some(height),
            _ => None,
        }
    }

    fn blend_velocity(&self, dt: f32, input: &MovementInput, actor: &mut Actor) {
        let physics = &self.physics;
        let forward = input.forward.clamp(-1.0, 1.0);
        let strafe = input.strafe.clamp(-1.0, 1.0);
        let (sin, cos) = input.heading.sin_cos();
        let mut desired = Vector2::new(
            forward * sin - strafe * cos,
            forward * cos + strafe * sin,
        );
        let length = (desired.x * desired.x + desired.y * desired.y).sqrt();
        if length > 1.0 {
            desired /= length;
        }
        let speed = if input.sprint {
            physics.move_speed * physics.sprint_multiplier
        } else {
            physics.move_speed
        };
        desired *= speed;

        let current_speed = magnitude(actor.velocity);
        let mut rate = if magnitude(desired) > current_speed {
            physics.acceleration
        } else {
            physics.deceleration
        };
        if actor.state == MotionState::Airborne {
            rate *= physics.air_control;
        }
        let blend = (rate * dt).min(1.0);
        actor.velocity += (desired - actor.velocity) * blend;

        let max_speed = physics.max_speed();
        let new_speed = magnitude(actor.velocity);
        if new_speed > max_speed {
            actor.velocity *= max_speed / new_speed;
        }
    }

    fn move_horizontal(
        &self,
        dt: f32,
        actor: &mut Actor,
        store: &ChunkStore,
        colliders: &ColliderSet,
        report: &mut MovementReport,
    ) {
        let step = actor.velocity * dt;
        if magnitude(step) < 1e-6 {
            actor.moving = false;
            return;
        }

        let candidates = [step, Vector2::new(step.x, 0.0), Vector2::new(0.0, step.y)];
        let origin = actor.position;
        let resolved = candidates.iter().enumerate().find_map(|(i, delta)| {
            if magnitude(*delta) < 1e-6 {
                return None;
            }
            self.resolve_horizontal(actor, origin.x + delta.x, origin.z + delta.y, store, colliders)
                .map(|traversal| (i, *delta, traversal))
        });

        let Some((candidate, delta, traversal)) = resolved else {
            trace!("Movement fully blocked at {:?}", origin);
            actor.velocity = Vector2::zero();
            actor.moving = false;
            report.blocked = true;
            return;
        };

        match candidate {
            1 => actor.velocity.y = 0.0,
            2 => actor.velocity.x = 0.0,
            _ => {}
        }
        report.blocked = candidate != 0;
        report.displacement = magnitude(delta);

        actor.position.x += delta.x;
        actor.position.z += delta.y;
        actor.moving = true;
        match traversal {
            Traversal::Ground(height) if actor.state == MotionState::Grounded => {
                actor.position.y = height;
            }
            Traversal::Fall if actor.state == MotionState::Grounded => {
                trace!("Walked off a ledge at {:?}", actor.position);
                actor.state = MotionState::Airborne;
                actor.vertical_velocity = 0.0;
                actor.fall_start = actor.position.y;
            }
            _ => {}
        }
    }

    fn resolve_horizontal(
        &self,
        actor: &Actor,
        x: f32,
        z: f32,
        store: &ChunkStore,
        colliders: &ColliderSet,
    ) -> Option<Traversal> {
        let physics = &self.physics;
        let body = self.body();
        let feet = actor.position.y;
        if colliders.blocks_body(x, feet, z, body.radius, body.height) {
            return None;
        }
        if actor.state == MotionState::Airborne {
            return body_clear(store, x, feet, z, body).then_some(Traversal::Fall);
        }

        let window = GroundWindow::around(feet, physics.step_height, physics.max_down_step);
        match support_height(store, x, z, window, body) {
            Some(height) => {
                let rise = height - feet;
                if rise > 0.0 && rise.atan2(1.0).to_degrees() > physics.max_slope_degrees {
                    return None;
                }
                if colliders.blocks_body(x, height, z, body.radius, body.height)
                    || !body_clear(store, x, height, z, body)
                {
                    return None;
                }
                Some(Traversal::Ground(height))
            }
            None => body_clear(store, x, feet, z, body).then_some(Traversal::Fall),
        }
    }

    fn grounded_vertical(&self, input: &MovementInput, actor: &mut Actor, store: &ChunkStore) {
        if input.jump {
            actor.state = MotionState::Airborne;
            actor.vertical_velocity = self.physics.jump_velocity;
            actor.fall_start = actor.position.y;
            return;
        }
        if !self.snap_to_ground(actor, store) {
            actor.state = MotionState::Airborne;
            actor.vertical_velocity = 0.0;
            actor.fall_start = actor.position.y;
        }
    }

    fn airborne_vertical(
        &self,
        dt: f32,
        actor: &mut Actor,
        store: &ChunkStore,
        report: &mut MovementReport,
    ) {
        let body = self.body();
        actor.vertical_velocity =
            (actor.vertical_velocity - self.physics.gravity * dt).max(-TERMINAL_VELOCITY);
        let y = actor.position.y;
        let next_y = y + actor.vertical_velocity * dt;

        if actor.vertical_velocity > 0.0 {
            if body_clear(store, actor.position.x, next_y, actor.position.z, body) {
                actor.position.y = next_y;
                actor.fall_start = actor.fall_start.max(next_y);
            } else {
                actor.vertical_velocity = 0.0;
            }
            return;
        }

        let window = GroundWindow {
            upper: y + LANDING_SKIN,
            lower: next_y,
            reference: y,
        };
        match find_ground(store, actor.position.x, actor.position.z, window, body) {
            Some(hit) => {
                actor.position.y = hit.height;
                actor.vertical_velocity = 0.0;
                actor.state = MotionState::Grounded;
                report.landed = true;

                let fallen = actor.fall_start - hit.height;
                trace!("Landed at {:?} after falling {fallen:.2}", actor.position);
                if self.hazards.fall_death_enabled && fallen > self.hazards.fall_death_threshold {
                    report.hazard = Some(HazardEvent::FallDeath { height: fallen });
                }
            }
            None => actor.position.y = next_y,
        }
    }

    fn turn_toward_travel(&self, dt: f32, actor: &mut Actor) {
        if magnitude(actor.velocity) < 0.1 {
            return;
        }
        let target = actor.velocity.x.atan2(actor.velocity.y);
        let diff = wrap_angle(target - actor.yaw);
        actor.yaw = wrap_angle(actor.yaw + diff * (self.physics.turn_lerp * dt).min(1.0));
    }
}

fn magnitude(v: Vector2<f32>) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, AIR_ID},
        chunk::{Chunk, ChunkKey},
    };

    const FLOOR: i32 = 20;

    fn floor_store() -> ChunkStore {
        let mut store = ChunkStore::new(16, 64);
        for cx in -1..=1 {
            for cz in -1..=1 {
                store.insert_chunk(Chunk::empty(ChunkKey::new(cx, cz), 16, 64));
            }
        }
        for x in -16..32 {
            for z in -16..32 {
                store.set_block(Point3::new(x, FLOOR, z), BlockType::STONE.id());
            }
        }
        store
    }

    fn controller() -> MovementController {
        MovementController::new(PhysicsConfig::default(), HazardConfig::default())
    }

    fn walk(forward: f32, sprint: bool) -> MovementInput {
        MovementInput {
            forward,
            sprint,
            ..MovementInput::default()
        }
    }

    #[test]
    fn walking_respects_the_speed_bound() {
        let store = floor_store();
        let controller = controller();
        let colliders = ColliderSet::new();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 4.5));
        let bound = controller.physics().max_speed() * 0.016 + 1e-4;
        for _ in 0..120 {
            let report = controller.tick(0.016, &walk(1.0, true), &mut actor, &store, &colliders);
            assert!(report.displacement <= bound);
            assert!(actor.is_grounded());
        }
        assert!(actor.position.z > 10.0);
        assert_eq!(actor.position.y, (FLOOR + 1) as f32);
    }

    #[test]
    fn ledges_above_the_step_height_need_a_jump() {
        let mut store = floor_store();
        for x in 0..16 {
            store.set_block(Point3::new(x, FLOOR + 1, 8), BlockType::STONE.id());
        }
        let colliders = ColliderSet::new();

        let low_step = controller();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        for _ in 0..60 {
            low_step.tick(0.016, &walk(1.0, false), &mut actor, &store, &colliders);
        }
        assert!(actor.position.z < 8.0);

        let physics = PhysicsConfig {
            step_height: 1.0,
            ..PhysicsConfig::default()
        };
        let high_step = MovementController::new(physics, HazardConfig::default());
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        let mut climbed = false;
        for _ in 0..60 {
            high_step.tick(0.016, &walk(1.0, false), &mut actor, &store, &colliders);
            climbed |= actor.position.y == (FLOOR + 2) as f32;
        }
        assert!(climbed);
        assert!(actor.position.z > 8.0);
    }

    #[test]
    fn steep_rises_are_rejected_by_the_slope_limit() {
        let mut store = floor_store();
        for x in 0..16 {
            store.set_block(Point3::new(x, FLOOR + 1, 8), BlockType::STONE.id());
        }
        let physics = PhysicsConfig {
            step_height: 1.0,
            max_slope_degrees: 30.0,
            ..PhysicsConfig::default()
        };
        let controller = MovementController::new(physics, HazardConfig::default());
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        for _ in 0..60 {
            controller.tick(0.016, &walk(1.0, false), &mut actor, &store, &ColliderSet::new());
        }
        assert!(actor.position.z < 8.0);
    }

    #[test]
    fn walls_stop_the_actor() {
        let mut store = floor_store();
        for x in -16..32 {
            for y in 1..=3 {
                store.set_block(Point3::new(x, FLOOR + y, 8), BlockType::STONE.id());
            }
        }
        let controller = controller();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        for _ in 0..120 {
            controller.tick(0.016, &walk(1.0, false), &mut actor, &store, &ColliderSet::new());
        }
        assert!(actor.position.z < 8.0 - controller.physics().collision_radius + 0.01);
    }

    #[test]
    fn diagonal_walks_slide_along_walls() {
        let mut store = floor_store();
        for x in -16..32 {
            for y in 1..=3 {
                store.set_block(Point3::new(x, FLOOR + y, 8), BlockType::STONE.id());
            }
        }
        let controller = controller();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        let diagonal = MovementInput {
            forward: 1.0,
            heading: PI / 4.0,
            ..MovementInput::default()
        };
        let mut blocked = false;
        for _ in 0..60 {
            let report = controller.tick(0.016, &diagonal, &mut actor, &store, &ColliderSet::new());
            blocked |= report.blocked;
        }
        assert!(blocked);
        assert!(actor.position.x > 6.0, "stopped at {:?}", actor.position);
        assert!(actor.position.z < 8.0 - controller.physics().collision_radius + 0.01);
        assert_eq!(actor.position.y, (FLOOR + 1) as f32);
    }

    fn lower_floor_beyond(store: &mut ChunkStore, z_from: i32, depth: i32) {
        for x in -16..32 {
            for z in z_from..32 {
                store.set_block(Point3::new(x, FLOOR, z), AIR_ID);
                store.set_block(Point3::new(x, FLOOR - depth, z), BlockType::STONE.id());
            }
        }
    }

    #[test]
    fn shallow_drops_keep_the_actor_grounded() {
        let mut store = floor_store();
        lower_floor_beyond(&mut store, 8, 1);
        let controller = controller();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        for _ in 0..90 {
            controller.tick(0.016, &walk(1.0, false), &mut actor, &store, &ColliderSet::new());
            assert!(actor.is_grounded(), "left the ground at {:?}", actor.position);
        }
        assert!(actor.position.z > 9.0);
        assert_eq!(actor.position.y, FLOOR as f32);
    }

    #[test]
    fn drops_deeper_than_the_down_step_start_a_fall() {
        let mut store = floor_store();
        lower_floor_beyond(&mut store, 8, 3);
        let controller = controller();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 6.5));
        let mut fell = false;
        for _ in 0..150 {
            controller.tick(0.016, &walk(1.0, false), &mut actor, &store, &ColliderSet::new());
            fell |= actor.state == MotionState::Airborne;
        }
        assert!(fell);
        assert!(actor.is_grounded());
        assert_eq!(actor.position.y, (FLOOR - 2) as f32);
    }

    #[test]
    fn jump_leaves_and_returns_to_the_ground() {
        let store = floor_store();
        let controller = controller();
        let colliders = ColliderSet::new();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 4.5));
        let jump = MovementInput {
            jump: true,
            ..MovementInput::default()
        };
        controller.tick(0.016, &jump, &mut actor, &store, &colliders);
        assert_eq!(actor.state, MotionState::Airborne);

        let mut landed = false;
        for _ in 0..200 {
            let report = controller.tick(0.016, &MovementInput::default(), &mut actor, &store, &colliders);
            if report.landed {
                landed = true;
                assert_eq!(report.hazard, None);
                break;
            }
        }
        assert!(landed);
        assert_eq!(actor.position.y, (FLOOR + 1) as f32);
    }

    #[test]
    fn long_falls_are_fatal() {
        let store = floor_store();
        let controller = controller();
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 20) as f32, 4.5));
        actor.state = MotionState::Airborne;
        actor.fall_start = actor.position.y;
        let mut hazard = None;
        for _ in 0..400 {
            let report = controller.tick(0.016, &MovementInput::default(), &mut actor, &store, &ColliderSet::new());
            if report.landed {
                hazard = report.hazard;
                break;
            }
        }
        assert!(matches!(hazard, Some(HazardEvent::FallDeath { .. })));
    }

    #[test]
    fn colliders_block_horizontal_motion() {
        let store = floor_store();
        let controller = controller();
        let mut colliders = ColliderSet::new();
        colliders.insert(
            7,
            colliders::StaticCollider {
                x: 4.5,
                z: 7.5,
                base_y: (FLOOR + 1) as f32,
                height: 3.0,
                shape: colliders::ColliderShape::Aabb {
                    half_x: 3.0,
                    half_z: 0.5,
                },
            },
        );
        let mut actor = Actor::new(Point3::new(4.5, (FLOOR + 1) as f32, 4.5));
        for _ in 0..120 {
            controller.tick(0.016, &walk(1.0, false), &mut actor, &store, &colliders);
        }
        assert!(actor.position.z < 7.0 - controller.physics().collision_radius + 0.01);
    }

    #[test]
    fn angles_wrap_into_a_half_open_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5) + 0.5).abs() < 1e-6);
    }
}

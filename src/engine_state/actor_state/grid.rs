//! Tile-by-tile movement for touch input.
//!
//! Each accepted step tweens the actor from its cell centre to the neighbouring
//! cell centre over a fixed duration. Steps are gated by the same traversal test
//! as free movement, so anything the free controller refuses is refused here.
//! When the ground disappears the actor falls under the free controller.

use cgmath::Point3;

use crate::engine_state::voxels::chunk_store::ChunkStore;

use super::{colliders::ColliderSet, Actor, MovementController, MovementInput, MovementReport};

/// A grid step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridDirection {
    /// -z
    North,
    /// +z
    South,
    /// +x
    East,
    /// -x
    West,
}

impl GridDirection {
    /// Cell offset of one step.
    pub fn offset(self) -> (i32, i32) {
        match self {
            GridDirection::North => (0, -1),
            GridDirection::South => (0, 1),
            GridDirection::East => (1, 0),
            GridDirection::West => (-1, 0),
        }
    }

    /// Yaw facing this direction.
    pub fn yaw(self) -> f32 {
        let (dx, dz) = self.offset();
        (dx as f32).atan2(dz as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    from: Point3<f32>,
    to: Point3<f32>,
    elapsed: f32,
}

/// Result of one grid tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridReport {
    /// Cell a step started toward this tick.
    pub started: Option<(i32, i32)>,
    /// A step finished this tick.
    pub arrived: bool,
    /// Free-controller report when the actor was falling.
    pub movement: Option<MovementReport>,
}

/// Discrete movement driver.
#[derive(Debug, Clone, Default)]
pub struct GridMover {
    tween: Option<Tween>,
}

impl GridMover {
    /// Creates an idle mover.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a step is in progress.
    pub fn is_moving(&self) -> bool {
        self.tween.is_some()
    }

    /// Advances the tween or starts a new step.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the last tick
    /// * `direction` - Requested step, ignored while a step is in progress
    /// * `actor` - The actor to move
    /// * `controller` - Traversal rules and fall physics
    /// * `store` - Voxel data
    /// * `colliders` - Static obstacles
    pub fn tick(
        &mut self,
        dt: f32,
        direction: Option<GridDirection>,
        actor: &mut Actor,
        controller: &MovementController,
        store: &ChunkStore,
        colliders: &ColliderSet,
    ) -> GridReport {
        let mut report = GridReport::default();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if let Some(mut tween) = self.tween.take() {
            let duration = controller.physics().grid_move_duration.max(1e-3);
            tween.elapsed += dt;
            let t = (tween.elapsed / duration).min(1.0);
            actor.position = Point3::new(
                tween.from.x + (tween.to.x - tween.from.x) * t,
                tween.from.y + (tween.to.y - tween.from.y) * t,
                tween.from.z + (tween.to.z - tween.from.z) * t,
            );
            actor.moving = true;
            if t < 1.0 {
                self.tween = Some(tween);
            } else {
                actor.position = tween.to;
                actor.moving = false;
                report.arrived = true;
            }
            return report;
        }

        if !actor.is_grounded() || !controller.snap_to_ground(actor, store) {
            report.movement = Some(controller.tick(dt, &MovementInput::default(), actor, store, colliders));
            return report;
        }
        actor.velocity = cgmath::Vector2::new(0.0, 0.0);
        actor.moving = false;

        let Some(direction) = direction else {
            return report;
        };
        let (cx, cz) = actor.grid_cell();
        let (dx, dz) = direction.offset();
        let target = (cx.saturating_add(dx), cz.saturating_add(dz));
        let tx = target.0 as f32 + 0.5;
        let tz = target.1 as f32 + 0.5;
        actor.yaw = direction.yaw();

        let Some(height) = controller.can_traverse(actor, tx, tz, store, colliders) else {
            return report;
        };
        self.tween = Some(Tween {
            from: actor.position,
            to: Point3::new(tx, height, tz),
            elapsed: 0.0,
        });
        report.started = Some(target);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::{HazardConfig, PhysicsConfig},
        voxels::{
            block::block_type::BlockType,
            chunk::{Chunk, ChunkKey},
        },
    };

    fn floor_store() -> ChunkStore {
        let mut store = ChunkStore::new(16, 64);
        store.insert_chunk(Chunk::empty(ChunkKey::new(0, 0), 16, 64));
        for x in 0..16 {
            for z in 0..16 {
                store.set_block(Point3::new(x, 10, z), BlockType::STONE.id());
            }
        }
        store
    }

    #[test]
    fn steps_one_cell_per_move() {
        let store = floor_store();
        let controller = MovementController::new(PhysicsConfig::default(), HazardConfig::default());
        let colliders = ColliderSet::new();
        let mut actor = Actor::new(Point3::new(4.5, 11.0, 4.5));
        let mut mover = GridMover::new();

        let report = mover.tick(0.016, Some(GridDirection::East), &mut actor, &controller, &store, &colliders);
        assert_eq!(report.started, Some((5, 4)));
        assert!(mover.is_moving());

        let mut arrived = false;
        for _ in 0..30 {
            arrived |= mover.tick(0.016, None, &mut actor, &controller, &store, &colliders).arrived;
        }
        assert!(arrived);
        assert_eq!(actor.position, Point3::new(5.5, 11.0, 4.5));
        assert!((actor.yaw - GridDirection::East.yaw()).abs() < 1e-6);
    }

    #[test]
    fn blocked_cells_refuse_the_step() {
        let mut store = floor_store();
        store.set_block(Point3::new(4, 11, 3), BlockType::STONE.id());
        store.set_block(Point3::new(4, 12, 3), BlockType::STONE.id());
        let controller = MovementController::new(PhysicsConfig::default(), HazardConfig::default());
        let mut actor = Actor::new(Point3::new(4.5, 11.0, 4.5));
        let mut mover = GridMover::new();
        let report = mover.tick(0.016, Some(GridDirection::North), &mut actor, &controller, &store, &ColliderSet::new());
        assert_eq!(report.started, None);
        assert!(!mover.is_moving());
    }
}

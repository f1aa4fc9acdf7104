//! Rate-limited position reporting.
//!
//! The engine records where the actor is every tick; a position update becomes
//! available only when the actor has moved far enough, enough time has passed
//! since the last one, and the rounded position actually differs. The caller
//! pulls at its own cadence and only ever sees the latest update.

use cgmath::{MetricSpace, Point3};

use super::config::NetworkConfig;

/// A position worth sending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    /// Feet x.
    pub x: f32,
    /// Feet y.
    pub y: f32,
    /// Feet z.
    pub z: f32,
    /// Facing.
    pub yaw: f32,
}

type PositionKey = (i64, i64, i64);

fn position_key(position: Point3<f32>) -> PositionKey {
    (
        (position.x as f64 * 100.0).round() as i64,
        (position.y as f64 * 100.0).round() as i64,
        (position.z as f64 * 100.0).round() as i64,
    )
}

/// Decides when the actor's position is worth reporting.
#[derive(Debug, Clone)]
pub struct PositionReporter {
    min_distance: f32,
    min_interval: f64,
    last_sent: Option<(Point3<f32>, f64, PositionKey)>,
    pending: Option<PositionUpdate>,
    forced: bool,
}

impl PositionReporter {
    /// Creates a reporter that will report the first observation.
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            min_distance: config.position_min_distance,
            min_interval: config.position_min_interval,
            last_sent: None,
            pending: None,
            forced: true,
        }
    }

    /// Records the actor's position at session time `now`.
    ///
    /// # Returns
    /// `true` if an update was queued.
    pub fn observe(&mut self, now: f64, position: Point3<f32>, yaw: f32) -> bool {
        let key = position_key(position);
        let due = match self.last_sent {
            _ if self.forced => true,
            None => true,
            Some((last, at, last_key)) => {
                key != last_key
                    && now - at >= self.min_interval
                    && last.distance(position) >= self.min_distance
            }
        };
        if !due {
            return false;
        }
        self.forced = false;
        self.last_sent = Some((position, now, key));
        self.pending = Some(PositionUpdate {
            x: position.x,
            y: position.y,
            z: position.z,
            yaw,
        });
        true
    }

    /// Makes the next observation report unconditionally, e.g. after a respawn.
    pub fn force(&mut self) {
        self.forced = true;
    }

    /// Takes the latest unsent update.
    pub fn pull(&mut self) -> Option<PositionUpdate> {
        self.pending.take()
    }
}

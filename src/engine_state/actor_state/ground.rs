//! # Ground Probing
//!
//! Ground is found by probing a ring of points around the actor's footprint:
//! the centre plus eight points on the collision radius. For each probe the
//! vertical window is searched top-down for the highest solid voxel whose
//! headroom is clear for the whole body height.
//!
//! Among the probes that found ground, the one closest to the reference height
//! wins; the centre is considered first, so it wins ties.

use std::f32::consts::FRAC_PI_4;

use cgmath::Point3;

use crate::engine_state::voxels::chunk_store::ChunkStore;

/// Number of ground probes: the centre and eight rim points.
pub const PROBE_POINTS: usize = 9;

/// Slack kept off the body's top and bottom when testing overlap.
const BODY_SKIN: f32 = 0.05;

/// Horizontal offsets of the ground probes for a body of `radius`.
pub fn probe_offsets(radius: f32) -> [(f32, f32); PROBE_POINTS] {
    let mut offsets = [(0.0, 0.0); PROBE_POINTS];
    for (i, offset) in offsets.iter_mut().skip(1).enumerate() {
        let angle = i as f32 * FRAC_PI_4;
        *offset = (angle.sin() * radius, angle.cos() * radius);
    }
    offsets
}

/// The actor's collision body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyShape {
    /// Horizontal radius.
    pub radius: f32,
    /// Height above the feet.
    pub height: f32,
}

/// Vertical search window for a ground query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundWindow {
    /// Highest acceptable surface.
    pub upper: f32,
    /// Lowest acceptable surface.
    pub lower: f32,
    /// Height the candidates are ranked against.
    pub reference: f32,
}

impl GroundWindow {
    /// A window of `up` above and `down` below `reference`.
    pub fn around(reference: f32, up: f32, down: f32) -> Self {
        Self {
            upper: reference + up,
            lower: reference - down,
            reference,
        }
    }
}

/// A walkable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// Surface height, one above the top of the supporting voxel.
    pub height: f32,
    /// Index of the probe that found it; 0 is the centre.
    pub probe: usize,
}

/// Walkable surface seen by each probe, centre first.
pub fn probe_surfaces(
    store: &ChunkStore,
    x: f32,
    z: f32,
    window: GroundWindow,
    body: BodyShape,
) -> [Option<f32>; PROBE_POINTS] {
    let mut surfaces = [None; PROBE_POINTS];
    if window.upper < window.lower {
        return surfaces;
    }
    let top = (window.upper - 1.0).floor() as i32;
    let bottom = (window.lower - 1.0).ceil() as i32;
    let headroom = body.height.ceil().max(1.0) as i32;

    for (surface, (dx, dz)) in surfaces.iter_mut().zip(probe_offsets(body.radius)) {
        let cx = (x + dx).floor() as i32;
        let cz = (z + dz).floor() as i32;
        *surface = (bottom..=top)
            .rev()
            .find(|&y| {
                store.is_solid_at(Point3::new(cx, y, cz))
                    && (1..=headroom).all(|h| !store.is_solid_at(Point3::new(cx, y + h, cz)))
            })
            .map(|y| (y + 1) as f32);
    }
    surfaces
}

/// Finds the best ground surface under `(x, z)`.
///
/// # Arguments
/// * `store` - Voxel data; non-resident chunks read as air
/// * `x`, `z` - Horizontal centre of the footprint
/// * `window` - Vertical search window
/// * `body` - Collision body used for the probe ring and the headroom check
///
/// # Returns
/// The surface closest to the window reference, or `None` when there is no
/// ground in the window.
pub fn find_ground(
    store: &ChunkStore,
    x: f32,
    z: f32,
    window: GroundWindow,
    body: BodyShape,
) -> Option<GroundHit> {
    let mut best: Option<GroundHit> = None;
    for (probe, surface) in probe_surfaces(store, x, z, window, body).into_iter().enumerate() {
        let Some(height) = surface else {
            continue;
        };
        let better = best.map_or(true, |current| {
            (height - window.reference).abs() < (current.height - window.reference).abs()
        });
        if better {
            best = Some(GroundHit { height, probe });
        }
    }
    best
}

/// Highest surface under any probe: the height the whole footprint must stand at.
pub fn support_height(
    store: &ChunkStore,
    x: f32,
    z: f32,
    window: GroundWindow,
    body: BodyShape,
) -> Option<f32> {
    probe_surfaces(store, x, z, window, body)
        .into_iter()
        .flatten()
        .reduce(f32::max)
}

/// Returns `true` when the body standing at `feet` overlaps no solid voxel.
pub fn body_clear(store: &ChunkStore, x: f32, feet: f32, z: f32, body: BodyShape) -> bool {
    let low = (feet + BODY_SKIN).floor() as i32;
    let high = (feet + body.height - BODY_SKIN).floor() as i32;
    probe_offsets(body.radius).into_iter().all(|(dx, dz)| {
        let cx = (x + dx).floor() as i32;
        let cz = (z + dz).floor() as i32;
        (low..=high).all(|y| !store.is_solid_at(Point3::new(cx, y, cz)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, ChunkKey},
    };

    const BODY: BodyShape = BodyShape {
        radius: 0.28,
        height: 1.8,
    };

    fn flat_store(top: i32) -> ChunkStore {
        let mut store = ChunkStore::new(16, 64);
        store.insert_chunk(Chunk::empty(ChunkKey::new(0, 0), 16, 64));
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..=top {
                    store.set_block(Point3::new(x, y, z), BlockType::STONE.id());
                }
            }
        }
        store
    }

    #[test]
    fn probe_ring_is_centre_plus_eight() {
        let offsets = probe_offsets(1.0);
        assert_eq!(offsets[0], (0.0, 0.0));
        for &(dx, dz) in &offsets[1..] {
            assert!(((dx * dx + dz * dz).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn finds_flat_ground_inside_the_window() {
        let store = flat_store(10);
        let hit = find_ground(&store, 8.5, 8.5, GroundWindow::around(11.0, 0.75, 1.2), BODY)
            .expect("flat ground");
        assert_eq!(hit.height, 11.0);
        assert_eq!(hit.probe, 0);
    }

    #[test]
    fn ground_outside_the_window_is_not_found() {
        let store = flat_store(10);
        assert!(find_ground(&store, 8.5, 8.5, GroundWindow::around(14.0, 0.75, 1.2), BODY).is_none());
    }

    #[test]
    fn centre_wins_ties_and_support_takes_the_highest_probe() {
        let mut store = flat_store(10);
        store.set_block(Point3::new(9, 11, 8), BlockType::STONE.id());
        let window = GroundWindow::around(11.0, 1.0, 1.2);
        let hit = find_ground(&store, 8.9, 8.5, window, BODY).expect("ground");
        assert_eq!(hit.probe, 0);
        assert_eq!(hit.height, 11.0);
        assert_eq!(support_height(&store, 8.9, 8.5, window, BODY), Some(12.0));
    }

    #[test]
    fn covered_surfaces_are_skipped() {
        let mut store = flat_store(10);
        store.set_block(Point3::new(8, 12, 8), BlockType::STONE.id());
        store.set_block(Point3::new(8, 12, 9), BlockType::STONE.id());
        let window = GroundWindow::around(11.0, 0.75, 1.2);
        let slim = BodyShape {
            radius: 0.1,
            ..BODY
        };
        assert!(find_ground(&store, 8.5, 8.5, window, slim).is_none());
        assert!(!body_clear(&store, 8.5, 11.0, 8.5, slim));
        assert!(body_clear(&store, 5.5, 11.0, 5.5, slim));
    }
}

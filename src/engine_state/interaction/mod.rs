//! # Voxel Interaction
//!
//! Picking, optimistic editing and server reconciliation.
//!
//! ## Flow
//!
//! 1. [`VoxelInteractionController::update_target`] casts the pointer ray and
//!    remembers the targeted block and the empty cell in front of it
//! 2. Break and place requests are written into the chunk store immediately and
//!    queued as pending actions, each with a monotonically increasing index
//! 3. The caller drains the outbound batch and sends it
//! 4. Batch results come back keyed by index: failures are rolled back to the
//!    block that was there before, successes are recorded as overrides
//!
//! The pending queue is capped; once full, new requests are refused until
//! results arrive.

use std::collections::VecDeque;

use cgmath::{Point3, Vector3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine_state::{
    actor_state::{ground::BodyShape, Actor},
    config::InteractionConfig,
    voxels::{
        block::{block_type::BlockType, is_solid_id, BlockId, AIR_ID},
        chunk_store::ChunkStore,
        overrides::VoxelOverride,
    },
};

use self::raycast::{raycast, RayHit};

pub mod raycast;

/// Kind of voxel edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoxelAction {
    /// Replace a solid block with air.
    Break,
    /// Fill an empty cell.
    Place,
}

/// A locally applied edit awaiting the server's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingVoxelAction {
    /// Sequence number the server echoes back.
    pub index: u64,
    /// Break or place.
    pub action: VoxelAction,
    /// Edited voxel.
    pub coordinate: Point3<i32>,
    /// Block before the edit; restored on failure.
    pub previous: BlockId,
    /// Block written by the edit.
    pub next: BlockId,
}

/// The server's verdict on one pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelActionResult {
    /// Index of the action.
    pub index: u64,
    /// Whether the edit was accepted.
    pub ok: bool,
    /// Authoritative block when the server substituted its own.
    pub block_id: Option<BlockId>,
}

/// Outcome of a break or place request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Applied locally and queued under this index.
    Queued(u64),
    /// Nothing targeted, or the target is not editable.
    NoTarget,
    /// The pending queue is at capacity.
    QueueFull,
    /// The placement cell overlaps the actor.
    Occupied,
    /// The cell is outside the world or its chunk is not resident.
    Unavailable,
}

/// A request to interact with whatever the actor is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionIntent {
    /// Targeted block, if any.
    pub target: Option<Point3<i32>>,
    /// Column the actor stands in.
    pub cell: (i32, i32),
}

/// Counts from one batch reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Actions confirmed by the server.
    pub accepted: usize,
    /// Actions rolled back.
    pub rolled_back: usize,
    /// Results whose index matched no pending action.
    pub unknown: usize,
}

/// Picks voxels and tracks optimistic edits.
#[derive(Debug, Clone)]
pub struct VoxelInteractionController {
    config: InteractionConfig,
    ray: Option<(Point3<f32>, Vector3<f32>)>,
    target: Option<RayHit>,
    placement: Option<Point3<i32>>,
    target_stale: bool,
    pending: VecDeque<PendingVoxelAction>,
    outbound: Vec<PendingVoxelAction>,
    intent: Option<InteractionIntent>,
    next_index: u64,
}

impl VoxelInteractionController {
    /// Creates a controller with an empty queue.
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ray: None,
            target: None,
            placement: None,
            target_stale: true,
            pending: VecDeque::new(),
            outbound: Vec::new(),
            intent: None,
            next_index: 1,
        }
    }

    /// Block under the pointer.
    pub fn target(&self) -> Option<RayHit> {
        self.target
    }

    /// Empty cell in front of the targeted face.
    pub fn placement(&self) -> Option<Point3<i32>> {
        self.placement
    }

    /// Actions applied locally but not yet confirmed.
    pub fn pending(&self) -> impl Iterator<Item = &PendingVoxelAction> {
        self.pending.iter()
    }

    /// Number of unconfirmed actions.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Recasts the pointer ray if it moved or the world changed under it.
    ///
    /// # Returns
    /// `true` when the ray was recast.
    pub fn update_target(&mut self, origin: Point3<f32>, direction: Vector3<f32>, store: &ChunkStore) -> bool {
        let ray = (origin, direction);
        if !self.target_stale && self.ray == Some(ray) {
            return false;
        }
        self.ray = Some(ray);
        self.target_stale = false;
        self.target = raycast(
            |c| store.is_solid_at(c),
            origin,
            direction,
            self.config.reach,
            self.config.max_ray_steps,
        );
        self.placement = self.target.and_then(|hit| hit.adjacent());
        true
    }

    /// Forces the next [`Self::update_target`] to recast.
    pub fn invalidate_target(&mut self) {
        self.target_stale = true;
    }

    /// Breaks the targeted block.
    pub fn request_break(&mut self, store: &mut ChunkStore) -> RequestOutcome {
        let Some(hit) = self.target else {
            return RequestOutcome::NoTarget;
        };
        let coordinate = hit.block;
        if !is_solid_id(store.block_at(coordinate)) {
            return RequestOutcome::NoTarget;
        }
        self.apply_local(store, VoxelAction::Break, coordinate, AIR_ID)
    }

    /// Places `block_id` in the placement cell.
    ///
    /// # Arguments
    /// * `store` - Voxel data
    /// * `block_id` - Block to place; must be a known solid block
    /// * `actor` - The actor, whose body may not be covered
    /// * `body` - The actor's collision body
    pub fn request_place(
        &mut self,
        store: &mut ChunkStore,
        block_id: BlockId,
        actor: &Actor,
        body: BodyShape,
    ) -> RequestOutcome {
        let Some(coordinate) = self.placement else {
            return RequestOutcome::NoTarget;
        };
        if !BlockType::from_id(block_id).is_some_and(BlockType::is_solid) {
            return RequestOutcome::NoTarget;
        }
        if store.block_at(coordinate) != AIR_ID {
            return RequestOutcome::NoTarget;
        }
        if cell_overlaps_body(coordinate, actor.position, body) {
            return RequestOutcome::Occupied;
        }
        self.apply_local(store, VoxelAction::Place, coordinate, block_id)
    }

    /// Queues an interaction with the current target.
    pub fn request_interact(&mut self, actor: &Actor) -> InteractionIntent {
        let intent = InteractionIntent {
            target: self.target.map(|hit| hit.block),
            cell: actor.grid_cell(),
        };
        self.intent = Some(intent);
        intent
    }

    /// Takes the queued interaction intent.
    pub fn take_interaction_intent(&mut self) -> Option<InteractionIntent> {
        self.intent.take()
    }

    /// Takes the actions not yet handed to the network.
    ///
    /// They stay pending until their results arrive.
    pub fn drain_outbound_batch(&mut self) -> Vec<PendingVoxelAction> {
        std::mem::take(&mut self.outbound)
    }

    /// Reconciles server verdicts with the pending queue.
    pub fn apply_batch_results(&mut self, results: &[VoxelActionResult], store: &mut ChunkStore) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for result in results {
            let Some(position) = self.pending.iter().position(|p| p.index == result.index) else {
                warn!("Result for unknown voxel action {}", result.index);
                report.unknown += 1;
                continue;
            };
            let Some(action) = self.pending.remove(position) else {
                continue;
            };
            self.outbound.retain(|p| p.index != action.index);

            if result.ok {
                let block_id = result.block_id.unwrap_or(action.next);
                store.apply_override(action.coordinate, block_id);
                report.accepted += 1;
            } else {
                debug!(
                    "Rolling back voxel action {} at {:?} to block {}",
                    action.index, action.coordinate, action.previous
                );
                store.set_block(action.coordinate, action.previous);
                report.rolled_back += 1;
            }
        }
        if report.accepted + report.rolled_back > 0 {
            self.target_stale = true;
        }
        report
    }

    /// Applies an edit made elsewhere.
    ///
    /// # Returns
    /// `false` when the edit lies outside the world.
    pub fn apply_server_edit(&mut self, edit: VoxelOverride, store: &mut ChunkStore) -> bool {
        let applied = store.apply_override(edit.coordinate(), edit.block_id);
        self.target_stale |= applied;
        applied
    }

    fn apply_local(
        &mut self,
        store: &mut ChunkStore,
        action: VoxelAction,
        coordinate: Point3<i32>,
        next: BlockId,
    ) -> RequestOutcome {
        if self.pending.len() >= self.config.max_pending_actions {
            return RequestOutcome::QueueFull;
        }
        let Some(previous) = store.set_block(coordinate, next) else {
            return RequestOutcome::Unavailable;
        };

        let pending = PendingVoxelAction {
            index: self.next_index,
            action,
            coordinate,
            previous,
            next,
        };
        self.next_index += 1;
        self.pending.push_back(pending);
        self.outbound.push(pending);
        self.target_stale = true;
        debug!("Queued voxel action {:?} #{} at {:?}", action, pending.index, coordinate);
        RequestOutcome::Queued(pending.index)
    }
}

fn cell_overlaps_body(cell: Point3<i32>, feet: Point3<f32>, body: BodyShape) -> bool {
    let (x, y, z) = (cell.x as f32, cell.y as f32, cell.z as f32);
    x < feet.x + body.radius
        && x + 1.0 > feet.x - body.radius
        && z < feet.z + body.radius
        && z + 1.0 > feet.z - body.radius
        && y < feet.y + body.height
        && y + 1.0 > feet.y
}

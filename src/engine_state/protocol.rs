//! # Protocol Records
//!
//! Tagged JSON records exchanged with the world server, shaped as
//! `{"action": "...", "payload": {...}}`.
//!
//! Inbound records are parsed with wide integer types and validated against
//! the world bounds before they become [`ServerEvent`]s, so nothing out of range
//! ever reaches the chunk store. Outbound records are built from the engine's
//! pull accessors and serialised with `serde_json`.

use anyhow::Context;
use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::{
    config::WorldBounds,
    interaction::{InteractionIntent, PendingVoxelAction, VoxelAction, VoxelActionResult},
    outbound::PositionUpdate,
    voxels::{block::BlockId, chunk::ChunkKey, overrides::VoxelOverride},
};

/// Largest horizontal world coordinate accepted from the wire.
pub const MAX_HORIZONTAL_COORDINATE: i64 = 30_000_000;

/// Payload of `voxel_changed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelChangedPayload {
    /// World X.
    pub x: i64,
    /// World Y.
    pub y: i64,
    /// World Z.
    pub z: i64,
    /// New block.
    pub block_id: i64,
}

/// One row of `voxel_batch_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResultRow {
    /// Index of the action.
    pub index: u64,
    /// Whether the server accepted it.
    pub ok: bool,
    /// Authoritative block, when the server substituted its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<i64>,
    /// Rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload of `voxel_batch_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResultPayload {
    /// Verdicts in any order.
    pub results: Vec<BatchResultRow>,
}

/// Payload of `voxel_chunk_overrides`: persisted rows of one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkOverridesPayload {
    /// Chunk x.
    pub chunk_x: i64,
    /// Chunk z.
    pub chunk_z: i64,
    /// Rows of `[lx, y, lz, block_id]`.
    pub overrides: Vec<[i64; 4]>,
}

/// Records the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Another client's edit.
    VoxelChanged(VoxelChangedPayload),
    /// Verdicts on our pending actions.
    VoxelBatchResult(BatchResultPayload),
    /// Stored edits of a chunk.
    VoxelChunkOverrides(ChunkOverridesPayload),
}

/// A validated inbound record.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// One edit to apply.
    VoxelChanged(VoxelOverride),
    /// Verdicts to reconcile.
    BatchResults(Vec<VoxelActionResult>),
    /// Edits of one chunk.
    ChunkOverrides {
        /// The chunk.
        key: ChunkKey,
        /// Edits in world coordinates.
        overrides: Vec<VoxelOverride>,
    },
}

/// Parses and validates one inbound record.
///
/// # Arguments
/// * `raw` - JSON text
/// * `bounds` - World limits the record must respect
///
/// # Returns
/// The typed event, or an error naming the offending field.
pub fn parse_server_message(raw: &str, bounds: WorldBounds) -> anyhow::Result<ServerEvent> {
    let message: ServerMessage = serde_json::from_str(raw).context("malformed server message")?;
    message.validate(bounds)
}

impl ServerMessage {
    /// Validates the record against the world bounds.
    pub fn validate(self, bounds: WorldBounds) -> anyhow::Result<ServerEvent> {
        match self {
            ServerMessage::VoxelChanged(p) => {
                let x = horizontal(p.x, "x")?;
                let z = horizontal(p.z, "z")?;
                let y = height(p.y, bounds)?;
                let block_id = block_id(p.block_id)?;
                Ok(ServerEvent::VoxelChanged(VoxelOverride::new(Point3::new(x, y, z), block_id)))
            }
            ServerMessage::VoxelBatchResult(p) => {
                let results = p
                    .results
                    .into_iter()
                    .map(|row| -> anyhow::Result<VoxelActionResult> {
                        Ok(VoxelActionResult {
                            index: row.index,
                            ok: row.ok,
                            block_id: row.block_id.map(block_id).transpose()?,
                        })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(ServerEvent::BatchResults(results))
            }
            ServerMessage::VoxelChunkOverrides(p) => {
                let limit = MAX_HORIZONTAL_COORDINATE / bounds.chunk_size as i64;
                anyhow::ensure!(
                    p.chunk_x.abs() <= limit && p.chunk_z.abs() <= limit,
                    "chunk ({}, {}) is outside the world",
                    p.chunk_x,
                    p.chunk_z
                );
                let key = ChunkKey::new(p.chunk_x as i32, p.chunk_z as i32);
                let (ox, oz) = key.origin(bounds.chunk_size);
                let size = bounds.chunk_size as i64;

                let overrides = p
                    .overrides
                    .into_iter()
                    .map(|[lx, y, lz, id]| -> anyhow::Result<VoxelOverride> {
                        anyhow::ensure!(
                            (0..size).contains(&lx) && (0..size).contains(&lz),
                            "local offset ({lx}, {lz}) is outside a {size}-wide chunk"
                        );
                        let y = height(y, bounds)?;
                        let coordinate = Point3::new(ox + lx as i32, y, oz + lz as i32);
                        Ok(VoxelOverride::new(coordinate, block_id(id)?))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(ServerEvent::ChunkOverrides { key, overrides })
            }
        }
    }
}

fn horizontal(value: i64, field: &str) -> anyhow::Result<i32> {
    anyhow::ensure!(
        value.abs() <= MAX_HORIZONTAL_COORDINATE,
        "{field} = {value} is outside the world"
    );
    Ok(value as i32)
}

fn height(value: i64, bounds: WorldBounds) -> anyhow::Result<i32> {
    anyhow::ensure!(
        (0..bounds.world_height as i64).contains(&value),
        "y = {value} is outside 0..{}",
        bounds.world_height
    );
    Ok(value as i32)
}

fn block_id(value: i64) -> anyhow::Result<BlockId> {
    BlockId::try_from(value).with_context(|| format!("block id {value} is out of range"))
}

/// Position in wire form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePosition {
    /// X.
    pub x: f32,
    /// Y.
    pub y: f32,
    /// Z.
    pub z: f32,
}

/// One pending action in wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelActionRecord {
    /// Index echoed back in the result.
    pub index: u64,
    /// Break or place.
    pub action: VoxelAction,
    /// World X.
    pub x: i32,
    /// World Y.
    pub y: i32,
    /// World Z.
    pub z: i32,
    /// Block before the edit.
    pub previous_block_id: BlockId,
    /// Block written.
    pub block_id: BlockId,
}

impl From<&PendingVoxelAction> for VoxelActionRecord {
    fn from(action: &PendingVoxelAction) -> Self {
        Self {
            index: action.index,
            action: action.action,
            x: action.coordinate.x,
            y: action.coordinate.y,
            z: action.coordinate.z,
            previous_block_id: action.previous,
            block_id: action.next,
        }
    }
}

/// Records the client sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Actor moved.
    PositionUpdate {
        /// Feet position.
        position: WirePosition,
        /// Facing.
        yaw: f32,
    },
    /// Locally applied edits.
    VoxelActions {
        /// Edits in queue order.
        actions: Vec<VoxelActionRecord>,
    },
    /// Interaction with the faced block.
    Interact {
        /// Targeted block.
        target: Option<[i32; 3]>,
        /// Actor column.
        cell: [i32; 2],
    },
    /// Actor entered another biome.
    BiomeChanged {
        /// Biome name.
        biome: String,
    },
}

impl ClientMessage {
    /// Serialises the record.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("failed to encode client message")
    }
}

impl From<PositionUpdate> for ClientMessage {
    fn from(update: PositionUpdate) -> Self {
        ClientMessage::PositionUpdate {
            position: WirePosition {
                x: update.x,
                y: update.y,
                z: update.z,
            },
            yaw: update.yaw,
        }
    }
}

impl From<InteractionIntent> for ClientMessage {
    fn from(intent: InteractionIntent) -> Self {
        ClientMessage::Interact {
            target: intent.target.map(|p| [p.x, p.y, p.z]),
            cell: [intent.cell.0, intent.cell.1],
        }
    }
}

//! # Engine State Module
//!
//! The core engine module that owns the voxel world and runs its simulation tick.
//!
//! ## Key Components
//!
//! * `EngineState` - The owner of every subsystem and the single writer of world state
//! * `voxels` - Terrain sampling, chunk storage, generation and overrides
//! * `rendering` - Face-culled meshing and the mesh change log
//! * `streaming` - Loading and unloading chunks around the actor
//! * `actor_state` - Movement, grid movement, colliders and the follow camera
//! * `interaction` - Voxel picking, optimistic edits and reconciliation
//! * `protocol` / `outbound` - Wire records and rate-limited reporting
//!
//! ## Architecture
//!
//! Everything runs on one thread inside [`EngineState::tick`]. Expensive work is
//! bounded per tick: at most `chunks_per_tick` chunks are generated and only
//! chunks marked dirty are remeshed. Nothing is pushed out of the engine; the
//! caller pulls position updates, voxel actions, intents, hazards and mesh
//! changes at its own cadence, and each pull clears what it returns.
//!
//! ## Tick Order
//!
//! 1. Streaming re-centres on the actor and the generation queue advances
//! 2. The actor moves (free or grid), unless its own chunk is not resident yet
//! 3. The camera follows and the pointer target is recast
//! 4. Break, place and interact requests are applied
//! 5. Dirty chunks are remeshed
//! 6. Position, biome and hazard bookkeeping

use std::collections::VecDeque;

use cgmath::Point3;
use log::{info, warn};
use serde::Serialize;

use self::{
    actor_state::{
        camera::ThirdPersonCamera, colliders::ColliderSet, grid::GridMover, Actor, HazardEvent,
        MovementController, MovementInput,
    },
    config::{ControlMode, WorldConfig},
    input_state::{InputTracker, TickInput},
    interaction::{InteractionIntent, PendingVoxelAction, RequestOutcome, VoxelInteractionController},
    outbound::{PositionReporter, PositionUpdate},
    protocol::{
        parse_server_message, ClientMessage, ServerEvent, VoxelActionRecord, MAX_HORIZONTAL_COORDINATE,
    },
    rendering::{
        meshing::{MeshChange, MeshPalette},
        MeshManager,
    },
    streaming::{StreamingController, StreamingUpdate},
    voxels::{
        chunk::ChunkKey,
        chunk_store::ChunkStore,
        overrides::VoxelOverride,
        terrain::{Biome, TerrainSampler},
    },
};

pub mod actor_state;
pub mod config;
pub mod input_state;
pub mod interaction;
pub mod outbound;
pub mod protocol;
pub mod rendering;
pub mod streaming;
pub mod voxels;

/// Chebyshev radius generated synchronously around the spawn point.
const SPAWN_RADIUS: i32 = 1;

/// Snapshot of the world for debugging overlays and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Chunks generated since the session started.
    pub generated_chunks: u64,
    /// Chunks waiting for generation.
    pub queued_chunks: usize,
    /// Lowest column height generated.
    pub min_height_seen: Option<i32>,
    /// Highest column height generated.
    pub max_height_seen: Option<i32>,
    /// Resident chunks.
    pub resident_chunks: usize,
    /// Live chunk meshes.
    pub meshes: usize,
    /// Unconfirmed voxel actions.
    pub pending_actions: usize,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Streaming work, when the actor changed chunk.
    pub streaming: Option<StreamingUpdate>,
    /// Chunks generated this tick.
    pub generated: Vec<ChunkKey>,
    /// Chunks remeshed this tick.
    pub remeshed: usize,
    /// Break or place outcome this tick.
    pub voxel_request: Option<RequestOutcome>,
}

/// Owner of the voxel world and the actor.
///
/// Holds the chunk store, sampler, meshes and controllers as plain fields; the
/// embedding application keeps one per session and drives it with
/// [`EngineState::tick`].
pub struct EngineState {
    config: WorldConfig,
    sampler: TerrainSampler,
    store: ChunkStore,
    meshes: MeshManager,
    streaming: StreamingController,
    movement: MovementController,
    grid_mover: GridMover,
    actor: Actor,
    camera: ThirdPersonCamera,
    colliders: ColliderSet,
    interaction: VoxelInteractionController,
    reporter: PositionReporter,
    input: InputTracker,
    spawn: Point3<f32>,
    biome: Option<Biome>,
    biome_change: Option<Biome>,
    hazards: VecDeque<HazardEvent>,
    clock: f64,
}

impl EngineState {
    /// Creates a session. This never fails.
    ///
    /// # Arguments
    /// * `config` - World configuration; sanitised again here
    /// * `overrides` - Stored voxel edits to layer over generated terrain
    /// * `spawn` - Requested spawn; only x and z are used, the actor is placed on the ground
    ///
    /// # Returns
    /// A session with the spawn area generated and meshed.
    pub fn new<I>(config: WorldConfig, overrides: I, spawn: Option<Point3<f32>>) -> Self
    where
        I: IntoIterator<Item = VoxelOverride>,
    {
        let config = config.sanitized();
        let sampler = TerrainSampler::new(&config);
        let mut store = ChunkStore::new(config.chunk_size, config.world_height);
        store.load_overrides(overrides);

        let palette = MeshPalette::new(
            sampler.seed_hash(),
            sampler.reference_height(),
            config.world_height,
        );
        let mut meshes = MeshManager::new(palette);

        let requested = spawn.unwrap_or(Point3::new(0.5, 0.0, 0.5));
        let spawn = Self::find_spawn(&mut store, &sampler, &config, requested);
        meshes.rebuild_dirty(&mut store);

        let mut streaming = StreamingController::new(config.view_distance, config.chunk_size);
        streaming.update(spawn, &mut store, &mut meshes);

        info!(
            "World session started: seed {:?}, style {:?}, spawn ({:.1}, {:.1}, {:.1}), {} overrides",
            config.seed,
            config.world_style,
            spawn.x,
            spawn.y,
            spawn.z,
            store.overrides().len()
        );

        Self {
            sampler,
            store,
            meshes,
            streaming,
            movement: MovementController::new(config.physics.clone(), config.hazards.clone()),
            grid_mover: GridMover::new(),
            actor: Actor::new(spawn),
            camera: ThirdPersonCamera::new(config.camera.clone()),
            colliders: ColliderSet::new(),
            interaction: VoxelInteractionController::new(config.interaction.clone()),
            reporter: PositionReporter::new(&config.network),
            input: InputTracker::default(),
            spawn,
            biome: None,
            biome_change: None,
            hazards: VecDeque::new(),
            clock: 0.0,
            config,
        }
    }

    /// Parses a JSON configuration and creates a session. This never fails.
    pub fn from_json_config<I>(raw: &str, overrides: I, spawn: Option<Point3<f32>>) -> Self
    where
        I: IntoIterator<Item = VoxelOverride>,
    {
        Self::new(WorldConfig::from_json_str(raw), overrides, spawn)
    }

    fn find_spawn(
        store: &mut ChunkStore,
        sampler: &TerrainSampler,
        config: &WorldConfig,
        requested: Point3<f32>,
    ) -> Point3<f32> {
        let columns = [
            (requested.x, requested.z),
            (0.5, 0.5),
        ];
        for (x, z) in columns {
            let limit = MAX_HORIZONTAL_COORDINATE as f32;
            if !(x.abs() <= limit && z.abs() <= limit) {
                warn!("Spawn column ({x}, {z}) is outside the world");
                continue;
            }
            let center = ChunkKey::from_position(Point3::new(x, 0.0, z), config.chunk_size);
            for key in StreamingController::chunks_in_view(center, SPAWN_RADIUS) {
                if !store.is_resident(key) {
                    store.generate_now(key, sampler);
                }
            }
            if let Some(top) = store.column_top(x.floor() as i32, z.floor() as i32) {
                return Point3::new(x, (top + 1) as f32, z);
            }
            warn!("Spawn column ({x:.1}, {z:.1}) has no ground");
        }
        Point3::new(0.5, (sampler.reference_height() + 1) as f32, 0.5)
    }

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> TickSummary {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt as f64;
        let buttons = self.input.process(input);
        let mut summary = TickSummary::default();

        self.camera.rotate(input.camera_rotate.0, input.camera_rotate.1);
        self.camera.zoom(input.zoom);

        summary.streaming = self
            .streaming
            .update(self.actor.position, &mut self.store, &mut self.meshes);
        let center = ChunkKey::from_position(self.actor.position, self.config.chunk_size);
        summary.generated = self
            .store
            .process_queue(&self.sampler, self.config.chunks_per_tick, center);
        let unloaded = summary
            .streaming
            .as_ref()
            .is_some_and(|update| !update.unloaded.is_empty());
        if unloaded || !summary.generated.is_empty() {
            self.interaction.invalidate_target();
        }

        if self.store.is_resident(center) {
            let hazard = match self.config.control_mode {
                ControlMode::Free => {
                    let movement = MovementInput {
                        forward: input.forward,
                        strafe: input.strafe,
                        sprint: input.sprint,
                        jump: buttons.jump.is_just_pressed(),
                        heading: self.camera.heading(),
                    };
                    self.movement
                        .tick(dt, &movement, &mut self.actor, &self.store, &self.colliders)
                        .hazard
                }
                ControlMode::Grid => self
                    .grid_mover
                    .tick(
                        dt,
                        input.grid_direction,
                        &mut self.actor,
                        &self.movement,
                        &self.store,
                        &self.colliders,
                    )
                    .movement
                    .and_then(|report| report.hazard),
            };
            if let Some(hazard) = hazard {
                self.handle_hazard(hazard);
            }
        }

        self.camera
            .update(dt, self.actor.position, &self.store, &self.colliders);
        let (origin, direction) = input
            .pointer_ray
            .unwrap_or_else(|| self.camera.view_ray(self.actor.position));
        self.interaction.update_target(origin, direction, &self.store);

        if buttons.break_block.is_just_pressed() {
            summary.voxel_request = Some(self.interaction.request_break(&mut self.store));
        } else if buttons.place_block.is_just_pressed() {
            let block_id = input
                .selected_block
                .unwrap_or(self.config.interaction.default_place_block);
            summary.voxel_request = Some(self.interaction.request_place(
                &mut self.store,
                block_id,
                &self.actor,
                self.movement.body(),
            ));
        }
        if buttons.interact.is_just_pressed() {
            self.interaction.request_interact(&self.actor);
        }

        summary.remeshed = self.meshes.rebuild_dirty(&mut self.store);

        self.reporter
            .observe(self.clock, self.actor.position, self.actor.yaw);
        self.track_biome();
        summary
    }

    fn handle_hazard(&mut self, hazard: HazardEvent) {
        info!("Actor hazard {hazard:?}; respawning at {:?}", self.spawn);
        self.hazards.push_back(hazard);
        self.actor.teleport(self.spawn);
        self.grid_mover = GridMover::new();
        self.reporter.force();
    }

    fn track_biome(&mut self) {
        let (x, z) = self.actor.grid_cell();
        let biome = self.sampler.sample(x, z).biome;
        if biome == Biome::Void || self.biome == Some(biome) {
            return;
        }
        self.biome = Some(biome);
        self.biome_change = Some(biome);
    }

    /// Parses, validates and applies one server record.
    ///
    /// Invalid records are rejected without touching the world.
    pub fn handle_server_message(&mut self, raw: &str) -> anyhow::Result<()> {
        let event = parse_server_message(raw, self.config.bounds()).inspect_err(|err| {
            warn!("Rejected server message: {err:#}");
        })?;
        self.apply_server_event(event);
        Ok(())
    }

    /// Applies a validated server event.
    pub fn apply_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::VoxelChanged(edit) => {
                self.interaction.apply_server_edit(edit, &mut self.store);
            }
            ServerEvent::BatchResults(results) => {
                self.interaction.apply_batch_results(&results, &mut self.store);
            }
            ServerEvent::ChunkOverrides { overrides, .. } => {
                for edit in overrides {
                    self.interaction.apply_server_edit(edit, &mut self.store);
                }
            }
        }
    }

    /// Takes the latest position update, if one is due.
    pub fn take_position_update(&mut self) -> Option<PositionUpdate> {
        self.reporter.pull()
    }

    /// Takes the voxel actions not yet sent.
    pub fn take_voxel_actions(&mut self) -> Vec<PendingVoxelAction> {
        self.interaction.drain_outbound_batch()
    }

    /// Takes the queued interaction intent.
    pub fn take_interaction_intent(&mut self) -> Option<InteractionIntent> {
        self.interaction.take_interaction_intent()
    }

    /// Takes the biome the actor most recently entered.
    pub fn take_biome_change(&mut self) -> Option<Biome> {
        self.biome_change.take()
    }

    /// Takes hazard events in the order they happened.
    pub fn take_hazard_events(&mut self) -> Vec<HazardEvent> {
        self.hazards.drain(..).collect()
    }

    /// Takes the mesh change log.
    pub fn take_mesh_changes(&mut self) -> Vec<MeshChange> {
        self.meshes.take_changes()
    }

    /// Takes every outbound intent as wire records.
    pub fn take_outbound_messages(&mut self) -> Vec<ClientMessage> {
        let mut messages = Vec::new();
        if let Some(update) = self.take_position_update() {
            messages.push(update.into());
        }
        let actions = self.take_voxel_actions();
        if !actions.is_empty() {
            messages.push(ClientMessage::VoxelActions {
                actions: actions.iter().map(VoxelActionRecord::from).collect(),
            });
        }
        if let Some(intent) = self.take_interaction_intent() {
            messages.push(intent.into());
        }
        if let Some(biome) = self.take_biome_change() {
            messages.push(ClientMessage::BiomeChanged {
                biome: biome.name().to_string(),
            });
        }
        messages
    }

    /// Current world statistics.
    pub fn diagnostics(&self) -> Diagnostics {
        let stats = self.store.stats();
        Diagnostics {
            generated_chunks: stats.generated_chunks,
            queued_chunks: self.store.queued_len(),
            min_height_seen: stats.min_height_seen,
            max_height_seen: stats.max_height_seen,
            resident_chunks: self.store.resident_len(),
            meshes: self.meshes.len(),
            pending_actions: self.interaction.pending_len(),
        }
    }

    /// The sanitised configuration.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The terrain sampler.
    pub fn sampler(&self) -> &TerrainSampler {
        &self.sampler
    }

    /// Resident chunks and overrides.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Live chunk meshes.
    pub fn meshes(&self) -> &MeshManager {
        &self.meshes
    }

    /// The streaming controller.
    pub fn streaming(&self) -> &StreamingController {
        &self.streaming
    }

    /// The actor.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The spawn point the actor respawns at.
    pub fn spawn(&self) -> Point3<f32> {
        self.spawn
    }

    /// The follow camera.
    pub fn camera(&self) -> &ThirdPersonCamera {
        &self.camera
    }

    /// Picking and pending edits.
    pub fn interaction(&self) -> &VoxelInteractionController {
        &self.interaction
    }

    /// Static colliders, for the caller to populate with decor.
    pub fn colliders_mut(&mut self) -> &mut ColliderSet {
        &mut self.colliders
    }

    /// Returns `true` when `(x, z)` is inside the streamed area.
    pub fn is_within_stream_range(&self, x: f32, z: f32) -> bool {
        self.streaming.is_within_stream_range(x, z)
    }
}

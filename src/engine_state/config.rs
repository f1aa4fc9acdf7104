//! # World Configuration
//!
//! Session configuration for the world engine. A `WorldConfig` is created once,
//! sanitised, and then treated as immutable for the lifetime of an `EngineState`.
//!
//! ## Loading
//!
//! Every section carries `#[serde(default)]`, so partial JSON documents are
//! accepted and missing fields take their documented defaults.
//! [`WorldConfig::from_json_str`] never fails: unreadable documents fall back to
//! the defaults and out-of-range numbers are clamped, each with a warning.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::voxels::block::{block_type::BlockType, BlockId};

/// Selects the terrain shape produced by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldStyle {
    /// Rolling fractal value-noise terrain.
    #[default]
    Noise,
    /// Biome cells from an explicit table or a quadrant split.
    FixedBiomeGrid,
    /// A central hub with four biome islands over the void.
    FloatingHubIslands,
}

/// Selects how the actor is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Continuous physics movement.
    #[default]
    Free,
    /// Tile-by-tile movement for touch devices.
    Grid,
}

/// Parameters of the `noise` world style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTerrainConfig {
    /// Mean surface height in voxels.
    pub base_height: f64,
    /// Maximum deviation from the base height.
    pub height_variation: f64,
    /// World-to-noise coordinate scale.
    pub noise_scale: f64,
    /// Number of fractal octaves.
    pub octaves: u32,
}

impl Default for NoiseTerrainConfig {
    fn default() -> Self {
        Self {
            base_height: 52.0,
            height_variation: 14.0,
            noise_scale: 0.11,
            octaves: 3,
        }
    }
}

/// Biome names for the four quadrants of the `fixed_biome_grid` style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrantBiomes {
    /// Biome where `x >= 0` and `z >= 0`.
    pub xp_zp: String,
    /// Biome where `x < 0` and `z >= 0`.
    pub xn_zp: String,
    /// Biome where `x < 0` and `z < 0`.
    pub xn_zn: String,
    /// Biome where `x >= 0` and `z < 0`.
    pub xp_zn: String,
}

impl Default for QuadrantBiomes {
    fn default() -> Self {
        Self {
            xp_zp: "fire".to_string(),
            xn_zp: "grass".to_string(),
            xn_zn: "earth".to_string(),
            xp_zn: "wind".to_string(),
        }
    }
}

/// Parameters of the `fixed_biome_grid` style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedGridConfig {
    /// Surface height the roughness noise is layered on.
    pub surface_height: i32,
    /// Noise amplitude in voxels before the per-biome roughness factor.
    pub amplitude: f64,
    /// World-to-noise coordinate scale.
    pub noise_scale: f64,
    /// Number of fractal octaves.
    pub octaves: u32,
    /// Roughness multiplier of the stone hub biome.
    pub hub_roughness: f64,
    /// Roughness multiplier of the bridge biome.
    pub bridge_roughness: f64,
    /// Quadrant biomes used when `cells` is empty.
    pub quadrants: QuadrantBiomes,
    /// Sparse `"x,z" -> biome` table. When non-empty, absent cells are void.
    pub cells: HashMap<String, String>,
}

impl Default for FixedGridConfig {
    fn default() -> Self {
        Self {
            surface_height: 64,
            amplitude: 20.0,
            noise_scale: 0.02,
            octaves: 2,
            hub_roughness: 1.0,
            bridge_roughness: 1.0,
            quadrants: QuadrantBiomes::default(),
            cells: HashMap::new(),
        }
    }
}

/// Parameters of the `floating_hub_islands` style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingIslandsConfig {
    /// Requested hub half-size; the layout never goes below 14.
    pub hub_radius: f64,
    /// Largest island radius; islands use 95% of it, never below 12.
    pub island_radius_max: f64,
    /// Requested distance from the origin to each island centre.
    pub ring_radius: f64,
    /// Flat surface height shared by the hub and the islands.
    pub hub_height: i32,
}

impl Default for FloatingIslandsConfig {
    fn default() -> Self {
        Self {
            hub_radius: 28.0,
            island_radius_max: 16.0,
            ring_radius: 72.0,
            hub_height: 58,
        }
    }
}

/// Movement and collision tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Walking speed in voxels per second.
    pub move_speed: f32,
    /// Speed multiplier while sprinting.
    pub sprint_multiplier: f32,
    /// Blend rate toward a faster desired velocity.
    pub acceleration: f32,
    /// Blend rate toward a slower desired velocity.
    pub deceleration: f32,
    /// Highest ledge the actor walks up without jumping.
    pub step_height: f32,
    /// Deepest drop the actor snaps down to while staying grounded.
    pub max_down_step: f32,
    /// Steepest climbable rise in degrees.
    pub max_slope_degrees: f32,
    /// Initial upward speed of a jump.
    pub jump_velocity: f32,
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Fraction of the blend rate available while airborne.
    pub air_control: f32,
    /// Horizontal radius of the actor body.
    pub collision_radius: f32,
    /// Height of the actor body above its feet.
    pub body_height: f32,
    /// Rate at which the actor yaw turns toward its travel direction.
    pub turn_lerp: f32,
    /// Seconds a single grid step takes.
    pub grid_move_duration: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.6,
            sprint_multiplier: 1.45,
            acceleration: 16.0,
            deceleration: 18.0,
            step_height: 0.75,
            max_down_step: 1.2,
            max_slope_degrees: 48.0,
            jump_velocity: 8.8,
            gravity: 26.0,
            air_control: 0.45,
            collision_radius: 0.28,
            body_height: 1.8,
            turn_lerp: 14.0,
            grid_move_duration: 0.14,
        }
    }
}

impl PhysicsConfig {
    /// Largest horizontal speed the controller can ever reach.
    pub fn max_speed(&self) -> f32 {
        self.move_speed * self.sprint_multiplier.max(1.0)
    }
}

/// Third-person camera tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Height of the focus point above the actor's feet.
    pub target_height: f32,
    /// Initial distance from the focus point.
    pub distance: f32,
    /// Closest zoom.
    pub min_distance: f32,
    /// Furthest zoom.
    pub max_distance: f32,
    /// Initial pitch in radians.
    pub pitch: f32,
    /// Lowest pitch in radians.
    pub min_pitch: f32,
    /// Highest pitch in radians.
    pub max_pitch: f32,
    /// Distance kept between the camera and whatever blocked it.
    pub collision_padding: f32,
    /// Follow smoothing rate.
    pub follow_lerp: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target_height: 1.45,
            distance: 7.8,
            min_distance: 3.2,
            max_distance: 15.0,
            pitch: 0.48,
            min_pitch: 0.2,
            max_pitch: 1.1,
            collision_padding: 0.25,
            follow_lerp: 12.0,
        }
    }
}

/// Voxel picking and editing limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Longest pick ray.
    pub reach: f32,
    /// Iteration cap of the DDA traversal.
    pub max_ray_steps: usize,
    /// Capacity of the unacknowledged action queue.
    pub max_pending_actions: usize,
    /// Block placed when the input does not select one.
    pub default_place_block: BlockId,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reach: 8.0,
            max_ray_steps: 256,
            max_pending_actions: 24,
            default_place_block: BlockType::DIRT.id(),
        }
    }
}

/// Outbound rate limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Minimum travelled distance before another position update.
    pub position_min_distance: f32,
    /// Minimum seconds between position updates.
    pub position_min_interval: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            position_min_distance: 0.35,
            position_min_interval: 0.1,
        }
    }
}

/// Fall and void hazards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Emit a fall death when a landing ends a long fall.
    pub fall_death_enabled: bool,
    /// Fall height, in voxels, that is fatal.
    pub fall_death_threshold: f32,
    /// Emit a void death when the actor sinks below `void_height`.
    pub void_death_enabled: bool,
    /// Height below which the actor is lost to the void.
    pub void_height: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            fall_death_enabled: true,
            fall_death_threshold: 10.0,
            void_death_enabled: true,
            void_height: -64.0,
        }
    }
}

/// Immutable per-session world configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed string; hashed into the noise lattice.
    pub seed: String,
    /// Terrain style.
    pub world_style: WorldStyle,
    /// Actor control mode.
    pub control_mode: ControlMode,
    /// Horizontal chunk edge in voxels.
    pub chunk_size: i32,
    /// Number of voxel layers; valid heights are `0..world_height`.
    pub world_height: i32,
    /// Chebyshev streaming radius in chunks.
    pub view_distance: i32,
    /// Chunks generated per tick.
    pub chunks_per_tick: usize,
    /// `noise` style parameters.
    pub noise: NoiseTerrainConfig,
    /// `fixed_biome_grid` style parameters.
    pub fixed_grid: FixedGridConfig,
    /// `floating_hub_islands` style parameters.
    pub floating: FloatingIslandsConfig,
    /// Movement tuning.
    pub physics: PhysicsConfig,
    /// Camera tuning.
    pub camera: CameraConfig,
    /// Picking and editing limits.
    pub interaction: InteractionConfig,
    /// Outbound rate limits.
    pub network: NetworkConfig,
    /// Fall and void hazards.
    pub hazards: HazardConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: "voxel-world".to_string(),
            world_style: WorldStyle::default(),
            control_mode: ControlMode::default(),
            chunk_size: 16,
            world_height: 128,
            view_distance: 3,
            chunks_per_tick: 4,
            noise: NoiseTerrainConfig::default(),
            fixed_grid: FixedGridConfig::default(),
            floating: FloatingIslandsConfig::default(),
            physics: PhysicsConfig::default(),
            camera: CameraConfig::default(),
            interaction: InteractionConfig::default(),
            network: NetworkConfig::default(),
            hazards: HazardConfig::default(),
        }
    }
}

/// Chunk and height limits shared by validation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    /// Horizontal chunk edge in voxels.
    pub chunk_size: i32,
    /// Number of voxel layers.
    pub world_height: i32,
}

impl WorldBounds {
    /// Returns `true` when `y` addresses a voxel layer.
    #[inline]
    pub fn contains_height(&self, y: i32) -> bool {
        (0..self.world_height).contains(&y)
    }
}

impl WorldConfig {
    /// Parses a JSON document, falling back to defaults when it cannot be read.
    ///
    /// # Arguments
    /// * `raw` - A JSON object; any subset of fields may be present
    ///
    /// # Returns
    /// A sanitised configuration. This never fails.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<WorldConfig>(raw) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                warn!("World config could not be parsed ({err}); using defaults");
                Self::default()
            }
        }
    }

    /// Returns the chunk/height limits of this configuration.
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds {
            chunk_size: self.chunk_size,
            world_height: self.world_height,
        }
    }

    /// Clamps every numeric field into its supported range.
    ///
    /// Non-finite values are replaced by the default of the field.
    pub fn sanitized(mut self) -> Self {
        let defaults = WorldConfig::default();

        if self.seed.is_empty() {
            warn!("Empty world seed; using {:?}", defaults.seed);
            self.seed = defaults.seed.clone();
        }
        self.chunk_size = clamp_int("chunk_size", self.chunk_size, 4, 64);
        self.world_height = clamp_int("world_height", self.world_height, 16, 512);
        self.view_distance = clamp_int("view_distance", self.view_distance, 1, 16);
        if self.chunks_per_tick == 0 {
            warn!("chunks_per_tick must be positive; using {}", defaults.chunks_per_tick);
            self.chunks_per_tick = defaults.chunks_per_tick;
        }

        let top = (self.world_height - 1) as f64;
        let noise = &mut self.noise;
        let noise_defaults = &defaults.noise;
        noise.base_height =
            clamp_f64("noise.base_height", noise.base_height, noise_defaults.base_height, 2.0, top);
        noise.height_variation = clamp_f64(
            "noise.height_variation",
            noise.height_variation,
            noise_defaults.height_variation,
            0.0,
            top,
        );
        noise.noise_scale =
            clamp_f64("noise.noise_scale", noise.noise_scale, noise_defaults.noise_scale, 1e-4, 10.0);
        noise.octaves = noise.octaves.clamp(1, 6);

        let grid = &mut self.fixed_grid;
        let grid_defaults = &defaults.fixed_grid;
        grid.surface_height = clamp_int(
            "fixed_grid.surface_height",
            grid.surface_height,
            1,
            self.world_height - 1,
        );
        grid.amplitude =
            clamp_f64("fixed_grid.amplitude", grid.amplitude, grid_defaults.amplitude, 0.0, top);
        grid.noise_scale = clamp_f64(
            "fixed_grid.noise_scale",
            grid.noise_scale,
            grid_defaults.noise_scale,
            1e-4,
            10.0,
        );
        grid.octaves = grid.octaves.clamp(1, 6);
        grid.hub_roughness =
            clamp_f64("fixed_grid.hub_roughness", grid.hub_roughness, 1.0, 0.0, 10.0);
        grid.bridge_roughness =
            clamp_f64("fixed_grid.bridge_roughness", grid.bridge_roughness, 1.0, 0.0, 10.0);

        let floating = &mut self.floating;
        let floating_defaults = &defaults.floating;
        floating.hub_radius = clamp_f64(
            "floating.hub_radius",
            floating.hub_radius,
            floating_defaults.hub_radius,
            1.0,
            4096.0,
        );
        floating.island_radius_max = clamp_f64(
            "floating.island_radius_max",
            floating.island_radius_max,
            floating_defaults.island_radius_max,
            1.0,
            4096.0,
        );
        floating.ring_radius = clamp_f64(
            "floating.ring_radius",
            floating.ring_radius,
            floating_defaults.ring_radius,
            1.0,
            16384.0,
        );
        floating.hub_height =
            clamp_int("floating.hub_height", floating.hub_height, 1, self.world_height - 1);

        let physics = &mut self.physics;
        let p = &defaults.physics;
        physics.move_speed = clamp_f32("physics.move_speed", physics.move_speed, p.move_speed, 0.0, 100.0);
        physics.sprint_multiplier = clamp_f32(
            "physics.sprint_multiplier",
            physics.sprint_multiplier,
            p.sprint_multiplier,
            1.0,
            10.0,
        );
        physics.acceleration =
            clamp_f32("physics.acceleration", physics.acceleration, p.acceleration, 0.0, 1000.0);
        physics.deceleration =
            clamp_f32("physics.deceleration", physics.deceleration, p.deceleration, 0.0, 1000.0);
        physics.step_height =
            clamp_f32("physics.step_height", physics.step_height, p.step_height, 0.0, 4.0);
        physics.max_down_step =
            clamp_f32("physics.max_down_step", physics.max_down_step, p.max_down_step, 0.0, 8.0);
        physics.max_slope_degrees = clamp_f32(
            "physics.max_slope_degrees",
            physics.max_slope_degrees,
            p.max_slope_degrees,
            0.0,
            89.0,
        );
        physics.jump_velocity =
            clamp_f32("physics.jump_velocity", physics.jump_velocity, p.jump_velocity, 0.0, 100.0);
        physics.gravity = clamp_f32("physics.gravity", physics.gravity, p.gravity, 0.0, 500.0);
        physics.air_control =
            clamp_f32("physics.air_control", physics.air_control, p.air_control, 0.0, 1.0);
        physics.collision_radius = clamp_f32(
            "physics.collision_radius",
            physics.collision_radius,
            p.collision_radius,
            0.05,
            0.49,
        );
        physics.body_height =
            clamp_f32("physics.body_height", physics.body_height, p.body_height, 0.5, 8.0);
        physics.turn_lerp = clamp_f32("physics.turn_lerp", physics.turn_lerp, p.turn_lerp, 0.0, 100.0);
        physics.grid_move_duration = clamp_f32(
            "physics.grid_move_duration",
            physics.grid_move_duration,
            p.grid_move_duration,
            0.01,
            5.0,
        );

        let camera = &mut self.camera;
        let c = &defaults.camera;
        camera.min_distance =
            clamp_f32("camera.min_distance", camera.min_distance, c.min_distance, 0.5, 100.0);
        camera.max_distance = clamp_f32(
            "camera.max_distance",
            camera.max_distance,
            c.max_distance,
            camera.min_distance,
            200.0,
        );
        camera.distance = clamp_f32(
            "camera.distance",
            camera.distance,
            c.distance,
            camera.min_distance,
            camera.max_distance,
        );
        camera.min_pitch = clamp_f32("camera.min_pitch", camera.min_pitch, c.min_pitch, -1.5, 1.5);
        camera.max_pitch =
            clamp_f32("camera.max_pitch", camera.max_pitch, c.max_pitch, camera.min_pitch, 1.5);
        camera.pitch =
            clamp_f32("camera.pitch", camera.pitch, c.pitch, camera.min_pitch, camera.max_pitch);
        camera.target_height =
            clamp_f32("camera.target_height", camera.target_height, c.target_height, 0.0, 10.0);
        camera.collision_padding = clamp_f32(
            "camera.collision_padding",
            camera.collision_padding,
            c.collision_padding,
            0.0,
            5.0,
        );
        camera.follow_lerp =
            clamp_f32("camera.follow_lerp", camera.follow_lerp, c.follow_lerp, 0.0, 100.0);

        let interaction = &mut self.interaction;
        let i = &defaults.interaction;
        interaction.reach = clamp_f32("interaction.reach", interaction.reach, i.reach, 0.5, 256.0);
        if interaction.max_ray_steps == 0 {
            interaction.max_ray_steps = i.max_ray_steps;
        }
        if interaction.max_pending_actions == 0 {
            warn!("interaction.max_pending_actions must be positive; using {}", i.max_pending_actions);
            interaction.max_pending_actions = i.max_pending_actions;
        }

        let network = &mut self.network;
        let n = &defaults.network;
        network.position_min_distance = clamp_f32(
            "network.position_min_distance",
            network.position_min_distance,
            n.position_min_distance,
            0.0,
            100.0,
        );
        if !network.position_min_interval.is_finite() || network.position_min_interval < 0.0 {
            warn!("network.position_min_interval is invalid; using {}", n.position_min_interval);
            network.position_min_interval = n.position_min_interval;
        }

        let hazards = &mut self.hazards;
        let h = &defaults.hazards;
        hazards.fall_death_threshold = clamp_f32(
            "hazards.fall_death_threshold",
            hazards.fall_death_threshold,
            h.fall_death_threshold,
            1.0,
            10_000.0,
        );
        hazards.void_height = clamp_f32(
            "hazards.void_height",
            hazards.void_height,
            h.void_height,
            -100_000.0,
            0.0,
        );

        self
    }
}

fn clamp_int(name: &str, value: i32, min: i32, max: i32) -> i32 {
    let clamped = value.clamp(min, max.max(min));
    if clamped != value {
        warn!("{name} = {value} is out of range; clamped to {clamped}");
    }
    clamped
}

fn clamp_f64(name: &str, value: f64, fallback: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        warn!("{name} is not finite; using {fallback}");
        return fallback;
    }
    let clamped = value.clamp(min, max.max(min));
    if clamped != value {
        warn!("{name} = {value} is out of range; clamped to {clamped}");
    }
    clamped
}

fn clamp_f32(name: &str, value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    if !value.is_finite() {
        warn!("{name} is not finite; using {fallback}");
        return fallback;
    }
    let clamped = value.clamp(min, max.max(min));
    if clamped != value {
        warn!("{name} = {value} is out of range; clamped to {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = WorldConfig::from_json_str(
            r#"{"seed": "abc", "world_style": "floating_hub_islands", "physics": {"gravity": 30.0}}"#,
        );
        assert_eq!(config.seed, "abc");
        assert_eq!(config.world_style, WorldStyle::FloatingHubIslands);
        assert_eq!(config.physics.gravity, 30.0);
        assert_eq!(config.physics.move_speed, 4.6);
        assert_eq!(config.view_distance, 3);
    }

    #[test]
    fn unreadable_json_falls_back_to_defaults() {
        assert_eq!(WorldConfig::from_json_str("not json"), WorldConfig::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = WorldConfig::from_json_str(
            r#"{"chunk_size": 1000, "view_distance": -3, "chunks_per_tick": 0, "camera": {"distance": 99.0}}"#,
        );
        assert_eq!(config.chunk_size, 64);
        assert_eq!(config.view_distance, 1);
        assert_eq!(config.chunks_per_tick, 4);
        assert_eq!(config.camera.distance, config.camera.max_distance);
    }
}

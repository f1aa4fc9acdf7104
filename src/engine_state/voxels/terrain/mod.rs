//! # Terrain Sampler
//!
//! Pure function from a world column `(wx, wz)` to its surface height and biome.
//! The sampler holds no mutable state, so identical seed, configuration and
//! coordinate always produce the identical column.
//!
//! ## World Styles
//!
//! * `noise` - fractal lattice value noise around a base height
//! * `fixed_biome_grid` - a biome table or quadrant split, roughened per biome
//! * `floating_hub_islands` - a flat hub and four islands, void elsewhere

use phf::phf_map;

use crate::engine_state::config::{NoiseTerrainConfig, WorldConfig, WorldStyle};

use self::layout::{FloatingLayout, GridLayout};
use self::value_noise::{hash_seed, LatticeNoise};

use super::block::{block_type::BlockType, BlockId};

pub mod layout;
pub mod value_noise;

/// Number of dirt layers between a surface block and stone.
pub const DIRT_DEPTH: i32 = 3;

/// Surface material families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    /// No terrain.
    Void,
    /// Grass plains.
    Grass,
    /// Bare stone, used for the hub.
    Stone,
    /// Fire biome.
    Fire,
    /// Wind biome.
    Wind,
    /// Bridge decks.
    Bridge,
    /// Earth biome.
    Earth,
}

static BIOME_NAMES: phf::Map<&'static str, Biome> = phf_map! {
    "void" => Biome::Void,
    "grass" => Biome::Grass,
    "stone" => Biome::Stone,
    "hub" => Biome::Stone,
    "fire" => Biome::Fire,
    "wind" => Biome::Wind,
    "bridge" => Biome::Bridge,
    "earth" => Biome::Earth,
};

impl Biome {
    /// Resolves a biome name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        BIOME_NAMES.get(name.trim().to_ascii_lowercase().as_str()).copied()
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Biome::Void => "void",
            Biome::Grass => "grass",
            Biome::Stone => "stone",
            Biome::Fire => "fire",
            Biome::Wind => "wind",
            Biome::Bridge => "bridge",
            Biome::Earth => "earth",
        }
    }

    /// Block placed on the surface of this biome.
    pub fn surface_block(self) -> BlockType {
        match self {
            Biome::Void => BlockType::AIR,
            Biome::Grass => BlockType::GRASS,
            Biome::Stone => BlockType::STONE,
            Biome::Fire => BlockType::FIRE,
            Biome::Wind => BlockType::WIND,
            Biome::Bridge => BlockType::BRIDGE,
            Biome::Earth => BlockType::EARTH,
        }
    }

    /// Material for a voxel `depth` layers below the surface.
    pub fn block_for_depth(self, depth: i32) -> BlockId {
        match depth {
            0 => self.surface_block().id(),
            d if d <= DIRT_DEPTH => BlockType::DIRT.id(),
            _ => BlockType::STONE.id(),
        }
    }
}

/// Layout region a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainZone {
    /// Open terrain of the noise and grid styles.
    Field,
    /// The central hub.
    Hub,
    /// One of the ring islands.
    Island,
    /// Empty space.
    Void,
}

/// Result of sampling one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSample {
    /// Highest solid layer, or `None` for void columns.
    pub height: Option<i32>,
    /// Surface biome.
    pub biome: Biome,
    /// Layout region.
    pub zone: TerrainZone,
}

impl ColumnSample {
    /// An empty column.
    pub const VOID: ColumnSample = ColumnSample {
        height: None,
        biome: Biome::Void,
        zone: TerrainZone::Void,
    };
}

/// Deterministic column sampler for one world configuration.
#[derive(Debug, Clone)]
pub struct TerrainSampler {
    style: WorldStyle,
    world_height: i32,
    noise: LatticeNoise,
    noise_params: NoiseTerrainConfig,
    grid: GridLayout,
    floating: FloatingLayout,
}

impl TerrainSampler {
    /// Builds a sampler from a sanitised configuration.
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            style: config.world_style,
            world_height: config.world_height,
            noise: LatticeNoise::new(hash_seed(&config.seed)),
            noise_params: config.noise.clone(),
            grid: GridLayout::from_config(&config.fixed_grid),
            floating: FloatingLayout::from_config(&config.floating),
        }
    }

    /// The world style being sampled.
    pub fn style(&self) -> WorldStyle {
        self.style
    }

    /// FNV-1a hash of the configured seed.
    pub fn seed_hash(&self) -> u32 {
        self.noise.seed_hash()
    }

    /// The floating layout, meaningful for `floating_hub_islands`.
    pub fn floating_layout(&self) -> &FloatingLayout {
        &self.floating
    }

    /// Samples the column at world coordinates `(wx, wz)`.
    ///
    /// # Returns
    /// The column's top solid height (clamped below the world height) and biome,
    /// or [`ColumnSample::VOID`].
    pub fn sample(&self, wx: i32, wz: i32) -> ColumnSample {
        match self.style {
            WorldStyle::Noise => {
                let params = &self.noise_params;
                let n = self.noise.fractal(
                    wx as f64 * params.noise_scale,
                    wz as f64 * params.noise_scale,
                    params.octaves,
                );
                let height = (params.base_height + n * params.height_variation).max(2.0).round();
                ColumnSample {
                    height: Some(self.clamp_height(height as i32)),
                    biome: Biome::Grass,
                    zone: TerrainZone::Field,
                }
            }
            WorldStyle::FixedBiomeGrid => match self.grid.biome_at(wx, wz) {
                Some(biome) if biome != Biome::Void => {
                    let n = self.noise.fractal(
                        wx as f64 * self.grid.noise_scale,
                        wz as f64 * self.grid.noise_scale,
                        self.grid.octaves,
                    );
                    let offset = (n * self.grid.amplitude * self.grid.roughness(biome)).round() as i32;
                    ColumnSample {
                        height: Some(self.clamp_height(self.grid.surface_height + offset).max(1)),
                        biome,
                        zone: if biome == Biome::Stone {
                            TerrainZone::Hub
                        } else {
                            TerrainZone::Field
                        },
                    }
                }
                _ => ColumnSample::VOID,
            },
            WorldStyle::FloatingHubIslands => match self.floating.classify(wx, wz) {
                Some((zone, biome)) => ColumnSample {
                    height: Some(self.clamp_height(self.floating.surface_height)),
                    biome,
                    zone,
                },
                None => ColumnSample::VOID,
            },
        }
    }

    /// Typical surface height of the style, used as the neutral altitude for shading.
    pub fn reference_height(&self) -> i32 {
        let height = match self.style {
            WorldStyle::Noise => self.noise_params.base_height.round() as i32,
            WorldStyle::FixedBiomeGrid => self.grid.surface_height,
            WorldStyle::FloatingHubIslands => self.floating.surface_height,
        };
        self.clamp_height(height)
    }

    /// Top voxel height of a column, ignoring overrides.
    pub fn ground_height(&self, wx: i32, wz: i32) -> Option<i32> {
        self.sample(wx, wz).height
    }

    fn clamp_height(&self, height: i32) -> i32 {
        height.clamp(0, self.world_height - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn biome_names_resolve_case_insensitively() {
        assert_eq!(Biome::from_name("Fire"), Some(Biome::Fire));
        assert_eq!(Biome::from_name(" hub "), Some(Biome::Stone));
        assert_eq!(Biome::from_name("lava"), None);
    }

    #[test]
    fn depth_profile_is_surface_then_dirt_then_stone() {
        assert_eq!(Biome::Fire.block_for_depth(0), BlockType::FIRE.id());
        assert_eq!(Biome::Fire.block_for_depth(1), BlockType::DIRT.id());
        assert_eq!(Biome::Fire.block_for_depth(3), BlockType::DIRT.id());
        assert_eq!(Biome::Fire.block_for_depth(4), BlockType::STONE.id());
    }

    #[test]
    fn flat_noise_terrain_sits_at_base_height() {
        let mut config = WorldConfig::default();
        config.noise.height_variation = 0.0;
        let sampler = TerrainSampler::new(&config);
        for (x, z) in [(0, 0), (-40, 17), (1000, -1000)] {
            assert_eq!(sampler.sample(x, z).height, Some(52));
        }
    }

    #[test]
    fn noise_heights_stay_inside_the_world() {
        let mut config = WorldConfig::default();
        config.world_height = 32;
        config.noise.base_height = 30.0;
        config.noise.height_variation = 30.0;
        let sampler = TerrainSampler::new(&config);
        for x in -50..50 {
            let h = sampler.sample(x, x * 2).height.unwrap_or_default();
            assert!((2..32).contains(&h), "height {h} escaped the world");
        }
    }

    #[test]
    fn grid_table_treats_missing_cells_as_void() {
        let mut config = WorldConfig::default();
        config.world_style = WorldStyle::FixedBiomeGrid;
        config.fixed_grid.cells.insert("0,0".to_string(), "bridge".to_string());
        let sampler = TerrainSampler::new(&config);
        assert_eq!(sampler.sample(0, 0).biome, Biome::Bridge);
        assert!(sampler.sample(0, 0).height.is_some());
        assert_eq!(sampler.sample(1, 0), ColumnSample::VOID);
    }

    #[test]
    fn grid_quadrants_follow_coordinate_signs() {
        let mut config = WorldConfig::default();
        config.world_style = WorldStyle::FixedBiomeGrid;
        let sampler = TerrainSampler::new(&config);
        assert_eq!(sampler.sample(5, 5).biome, Biome::Fire);
        assert_eq!(sampler.sample(-5, 5).biome, Biome::Grass);
        assert_eq!(sampler.sample(-5, -5).biome, Biome::Earth);
        assert_eq!(sampler.sample(5, -5).biome, Biome::Wind);
    }

    #[test]
    fn floating_layout_has_hub_islands_and_void() {
        let mut config = WorldConfig::default();
        config.world_style = WorldStyle::FloatingHubIslands;
        let sampler = TerrainSampler::new(&config);

        let hub = sampler.sample(0, 0);
        assert_eq!((hub.zone, hub.biome), (TerrainZone::Hub, Biome::Stone));
        assert_eq!(hub.height, Some(58));

        let east = sampler.sample(72, 0);
        assert_eq!((east.zone, east.biome), (TerrainZone::Island, Biome::Wind));
        assert_eq!(sampler.sample(0, 72).biome, Biome::Fire);

        assert_eq!(sampler.sample(40, 40), ColumnSample::VOID);
        assert_eq!(sampler.ground_height(40, 40), None);
    }
}

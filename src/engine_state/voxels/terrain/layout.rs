//! Biome layouts for the `fixed_biome_grid` and `floating_hub_islands` styles.

use std::collections::HashMap;

use log::warn;

use crate::engine_state::config::{FixedGridConfig, FloatingIslandsConfig};

use super::{Biome, TerrainZone};

/// Square hub plus four square islands on a ring.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingLayout {
    /// Half the edge of the hub square.
    pub hub_half_size: i32,
    /// Half the edge of each island square.
    pub island_half_size: i32,
    /// Distance from the origin to each island centre.
    pub ring_distance: i32,
    /// Flat surface height.
    pub surface_height: i32,
    islands: [(i32, i32, Biome); 4],
}

impl FloatingLayout {
    /// Derives the layout from its configuration section.
    pub fn from_config(config: &FloatingIslandsConfig) -> Self {
        let hub_half_size = (config.hub_radius.round() as i32).max(14);
        let island_half_size = ((config.island_radius_max * 0.95).round() as i32).max(12);
        let ring_distance =
            (config.ring_radius.round() as i32).max(hub_half_size + island_half_size + 8);

        Self {
            hub_half_size,
            island_half_size,
            ring_distance,
            surface_height: config.hub_height,
            islands: [
                (0, ring_distance, Biome::Fire),
                (0, -ring_distance, Biome::Earth),
                (ring_distance, 0, Biome::Wind),
                (-ring_distance, 0, Biome::Grass),
            ],
        }
    }

    /// Island centres and their biomes.
    pub fn islands(&self) -> &[(i32, i32, Biome); 4] {
        &self.islands
    }

    /// Finds the landmass covering a column.
    ///
    /// # Returns
    /// `None` for columns over the void.
    pub fn classify(&self, wx: i32, wz: i32) -> Option<(TerrainZone, Biome)> {
        if wx.abs() <= self.hub_half_size && wz.abs() <= self.hub_half_size {
            return Some((TerrainZone::Hub, Biome::Stone));
        }
        self.islands
            .iter()
            .find(|(cx, cz, _)| {
                (wx - cx).abs() <= self.island_half_size && (wz - cz).abs() <= self.island_half_size
            })
            .map(|&(_, _, biome)| (TerrainZone::Island, biome))
    }
}

/// Quadrant split or explicit cell table with per-biome roughness.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Surface height the roughness noise is layered on.
    pub surface_height: i32,
    /// Noise amplitude before roughness.
    pub amplitude: f64,
    /// World-to-noise coordinate scale.
    pub noise_scale: f64,
    /// Octave count.
    pub octaves: u32,
    hub_roughness: f64,
    bridge_roughness: f64,
    /// `[xp_zp, xn_zp, xn_zn, xp_zn]`
    quadrants: [Biome; 4],
    cells: HashMap<(i32, i32), Biome>,
}

impl GridLayout {
    /// Parses biome names and cell keys of the configuration section.
    ///
    /// Unknown biome names and malformed cell keys are skipped with a warning;
    /// an unknown quadrant biome falls back to grass.
    pub fn from_config(config: &FixedGridConfig) -> Self {
        let quadrant = |name: &str| {
            Biome::from_name(name).unwrap_or_else(|| {
                warn!("Unknown quadrant biome {name:?}; using grass");
                Biome::Grass
            })
        };

        let mut cells = HashMap::with_capacity(config.cells.len());
        for (key, name) in &config.cells {
            let Some(cell) = parse_cell_key(key) else {
                warn!("Skipping malformed biome cell key {key:?}");
                continue;
            };
            match Biome::from_name(name) {
                Some(biome) => {
                    cells.insert(cell, biome);
                }
                None => warn!("Skipping cell {key:?} with unknown biome {name:?}"),
            }
        }

        Self {
            surface_height: config.surface_height,
            amplitude: config.amplitude,
            noise_scale: config.noise_scale,
            octaves: config.octaves,
            hub_roughness: config.hub_roughness,
            bridge_roughness: config.bridge_roughness,
            quadrants: [
                quadrant(&config.quadrants.xp_zp),
                quadrant(&config.quadrants.xn_zp),
                quadrant(&config.quadrants.xn_zn),
                quadrant(&config.quadrants.xp_zn),
            ],
            cells,
        }
    }

    /// Returns `true` when an explicit cell table is in use.
    pub fn uses_table(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Biome of a column, or `None` for table cells that are absent.
    pub fn biome_at(&self, wx: i32, wz: i32) -> Option<Biome> {
        if self.uses_table() {
            return self.cells.get(&(wx, wz)).copied();
        }
        let index = match (wx >= 0, wz >= 0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        Some(self.quadrants[index])
    }

    /// Roughness multiplier applied to the noise amplitude of a biome.
    pub fn roughness(&self, biome: Biome) -> f64 {
        match biome {
            Biome::Stone => self.hub_roughness,
            Biome::Bridge => self.bridge_roughness,
            Biome::Fire => 1.25,
            Biome::Wind => 0.75,
            Biome::Grass | Biome::Earth => 1.0,
            Biome::Void => 0.0,
        }
    }
}

fn parse_cell_key(key: &str) -> Option<(i32, i32)> {
    let (x, z) = key.split_once(',')?;
    Some((x.trim().parse().ok()?, z.trim().parse().ok()?))
}

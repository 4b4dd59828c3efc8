//! World generation configuration - serializable parameters for world generation
//!
//! The seed is NOT part of the config: the same config with a different seed
//! gives a different world. Configs round-trip through RON for presets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::automaton::MIN_DIMENSION;

/// Rejected world generation parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid size {0} is below the minimum of {min}", min = MIN_DIMENSION)]
    GridTooSmall(usize),
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("{name} must be in (0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },
    #[error("mutation rate must be finite and non-negative, got {0}")]
    InvalidMutationRate(f32),
    #[error("max_generations must be at least 1")]
    NoGenerations,
    #[error(
        "terrain resolution {resolution} is not grid size {grid_size} doubled a whole number of times"
    )]
    ResolutionMismatch { grid_size: usize, resolution: usize },
    #[error("failed to parse world config: {0}")]
    Parse(String),
    #[error("failed to serialize world config: {0}")]
    Serialize(String),
}

/// Complete world generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Display name for this configuration
    pub name: String,
    /// Cells per side of the coarse terrain/object grid
    pub grid_size: usize,
    /// World units per coarse cell
    pub cell_size: f32,
    /// Tiles per side of the fine land/water layers
    pub terrain_resolution: usize,
    pub land_probability: f32,
    pub tree_probability: f32,
    pub shrub_probability: f32,
    pub rock_probability: f32,
    /// Relative gene jitter applied when creatures mate
    ///
    /// At 1.0 or above a gene can flip sign, so some children carry flocking
    /// genes a herd rejects and [`World::mate`](crate::world::World::mate)
    /// fails for them.
    pub mutation_rate: f32,
    /// Cap on generations per stabilisation pass
    pub max_generations: usize,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            grid_size: 32,
            cell_size: 10.0,
            terrain_resolution: 128,
            land_probability: 0.55,
            tree_probability: 0.5,
            shrub_probability: 0.5,
            rock_probability: 0.05,
            mutation_rate: 0.5,
            max_generations: 500,
        }
    }
}

impl WorldGenConfig {
    /// Check every parameter; generation assumes a validated config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_DIMENSION {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        for (name, value) in [
            ("land_probability", self.land_probability),
            ("tree_probability", self.tree_probability),
            ("shrub_probability", self.shrub_probability),
            ("rock_probability", self.rock_probability),
        ] {
            // NaN fails both comparisons
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if !(self.mutation_rate.is_finite() && self.mutation_rate >= 0.0) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        if self.max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        self.upscale_steps().map(|_| ())
    }

    /// Number of resolution doublings from `grid_size` to `terrain_resolution`
    pub fn upscale_steps(&self) -> Result<u32, ConfigError> {
        let mismatch = ConfigError::ResolutionMismatch {
            grid_size: self.grid_size,
            resolution: self.terrain_resolution,
        };
        if self.grid_size == 0 || self.terrain_resolution % self.grid_size != 0 {
            return Err(mismatch);
        }
        let factor = self.terrain_resolution / self.grid_size;
        if !factor.is_power_of_two() {
            return Err(mismatch);
        }
        Ok(factor.trailing_zeros())
    }

    /// Parse and validate a config from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty RON text for saving as a preset file
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Side length of the world in world units
    pub fn world_extent(&self) -> f32 {
        self.grid_size as f32 * self.cell_size
    }

    /// World units per fine terrain tile
    pub fn tile_size(&self) -> f32 {
        self.world_extent() / self.terrain_resolution as f32
    }
}

// ============================================================================
// Preset helpers
// ============================================================================

impl WorldGenConfig {
    /// Scattered islands in open water
    pub fn preset_archipelago() -> Self {
        Self {
            name: "Archipelago".to_string(),
            land_probability: 0.45,
            ..Self::default()
        }
    }

    /// Dense vegetation on mostly solid land
    pub fn preset_forest() -> Self {
        Self {
            name: "Forest".to_string(),
            land_probability: 0.6,
            tree_probability: 0.65,
            shrub_probability: 0.6,
            ..Self::default()
        }
    }

    /// Small world that generates in milliseconds (tests and demos)
    ///
    /// Seeded denser than the default: on a 12x12 interior a 0.55 seed often
    /// erodes to nothing under the majority rule.
    pub fn preset_tiny() -> Self {
        Self {
            name: "Tiny".to_string(),
            grid_size: 16,
            cell_size: 5.0,
            terrain_resolution: 64,
            land_probability: 0.65,
            tree_probability: 0.6,
            shrub_probability: 0.6,
            max_generations: 200,
            ..Self::default()
        }
    }

    /// Look up a preset by name (case-insensitive)
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "archipelago" => Some(Self::preset_archipelago()),
            "forest" => Some(Self::preset_forest()),
            "tiny" => Some(Self::preset_tiny()),
            _ => None,
        }
    }
}

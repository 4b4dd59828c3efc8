//! Run configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `terrarium.ron` file (if exists)
//! 3. Environment variables prefixed with `TERRARIUM_`
//!
//! Example environment variable: `TERRARIUM_SIMULATION__TICKS=500`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use terrarium_core::creature::SpeedLimitPolicy;

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_FILE: &str = "terrarium";

/// Top-level run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub world: WorldSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Which world to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSettings {
    /// World generation preset: default, archipelago, forest, tiny
    pub preset: String,
    pub seed: u64,
    /// Steer creatures away from shore water
    pub avoid_water: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            preset: "default".to_string(),
            seed: 42,
            avoid_water: false,
        }
    }
}

/// How long and how crowded the run is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub ticks: u64,
    /// Seconds per tick
    pub dt: f32,
    /// Number of herds, one species each
    pub herds: usize,
    pub herd_size: usize,
    /// Spawn scatter around each herd's land tile, in world units
    pub spawn_spread: f32,
    /// Breed one pair every this many ticks (0 disables breeding)
    pub mating_interval: u64,
    pub speed_limit: SpeedLimitPolicy,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            ticks: 200,
            dt: 0.1,
            herds: 3,
            herd_size: 12,
            spawn_spread: 10.0,
            mating_interval: 50,
            speed_limit: SpeedLimitPolicy::Leader,
        }
    }
}

impl AppConfig {
    /// Load configuration from `terrarium.ron` and `TERRARIUM_*` variables
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `<name>.ron` file (if exists)
    /// 3. Environment variables prefixed with `TERRARIUM_` (highest priority)
    pub fn load_from(name: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("world.preset", "default")?
            .set_default("world.seed", 42_i64)?
            .set_default("world.avoid_water", false)?
            .set_default("simulation.ticks", 200_i64)?
            .set_default("simulation.dt", 0.1)?
            .set_default("simulation.herds", 3_i64)?
            .set_default("simulation.herd_size", 12_i64)?
            .set_default("simulation.spawn_spread", 10.0)?
            .set_default("simulation.mating_interval", 50_i64)?
            .set_default("simulation.speed_limit", "Leader")?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(name)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (TERRARIUM_WORLD__SEED, etc.)
            .add_source(Environment::with_prefix("TERRARIUM").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.world.preset, "default");
        assert_eq!(config.world.seed, 42);
        assert!(!config.world.avoid_water);
        assert_eq!(config.simulation.ticks, 200);
        assert_eq!(config.simulation.herd_size, 12);
        assert_eq!(config.simulation.speed_limit, SpeedLimitPolicy::Leader);
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = AppConfig::load_from("no-such-terrarium-config").expect("Failed to load config");
        assert_eq!(config.world.preset, "default");
        assert_eq!(config.simulation.dt, 0.1);
        assert_eq!(config.simulation.mating_interval, 50);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = AppConfig::default();
        config.simulation.speed_limit = SpeedLimitPolicy::PerAgent;
        let text = ron::to_string(&config).expect("Failed to serialize");
        let parsed: AppConfig = ron::from_str(&text).expect("Failed to deserialize");
        assert_eq!(parsed, config);
    }
}

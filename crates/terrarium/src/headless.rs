//! Headless simulation runs
//!
//! Builds a world from an [`AppConfig`], populates it with herds, runs the
//! configured number of ticks and summarises the outcome.

use anyhow::{Context, Result, anyhow};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use terrarium_core::creature::flocking::centroid;
use terrarium_core::creature::{HerdError, HerdId};
use terrarium_core::world::{TickStats, World, WorldError, WorldGenConfig};

use crate::config::AppConfig;

/// Final state of one herd
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdReport {
    pub id: u32,
    pub species: String,
    pub size: usize,
    pub centroid: Vec2,
    pub mean_speed: f32,
}

/// Summary of a headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub world: String,
    pub seed: u64,
    pub land_tiles: usize,
    pub water_tiles: usize,
    pub trees: usize,
    pub shrubs: usize,
    pub rocks: usize,
    pub unstable_passes: Vec<String>,
    pub ticks: u64,
    pub births: usize,
    pub last_tick: TickStats,
    pub herds: Vec<HerdReport>,
}

impl SimulationReport {
    /// Pretty RON text
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize report")
    }

    fn log_summary(&self) {
        log::info!(
            "'{}' after {} ticks: {} herds, {} births",
            self.world,
            self.ticks,
            self.herds.len(),
            self.births
        );
        for herd in &self.herds {
            log::info!(
                "  Herd({}) '{}': {} creatures, centroid ({:.1}, {:.1}), mean speed {:.2}",
                herd.id,
                herd.species,
                herd.size,
                herd.centroid.x,
                herd.centroid.y,
                herd.mean_speed
            );
        }
    }
}

/// Generate a world, populate it and run it to completion
pub fn run(config: &AppConfig) -> Result<SimulationReport> {
    let world_config = WorldGenConfig::preset(&config.world.preset)
        .ok_or_else(|| anyhow!("Unknown world preset '{}'", config.world.preset))?;
    let mut world = World::new(world_config, config.world.seed).context("Failed to create world")?;
    world.set_avoid_water(config.world.avoid_water);
    world.set_speed_limit(config.simulation.speed_limit);

    populate(&mut world, config)?;

    let sim = &config.simulation;
    let mut rng = Xoshiro256StarStar::seed_from_u64(config.world.seed);
    let mut births = 0;
    let mut last_tick = TickStats::default();
    for tick in 1..=sim.ticks {
        last_tick = world
            .update(sim.dt)
            .with_context(|| format!("Tick {} failed", tick))?;
        if sim.mating_interval > 0 && tick % sim.mating_interval == 0 && breed(&mut world, &mut rng)? {
            births += 1;
        }
    }

    let report = report(&world, births, last_tick);
    report.log_summary();
    Ok(report)
}

/// One species and one herd per configured herd, each on a random land tile
fn populate(world: &mut World, config: &AppConfig) -> Result<()> {
    let sim = &config.simulation;
    let center = Vec2::splat(world.config().world_extent() / 2.0);
    for i in 0..sim.herds {
        let species = world.generate_species(format!("species-{}", i));
        let around = world.random_land_position().unwrap_or_else(|| {
            log::warn!("World has no land, spawning herd {} at the centre", i);
            center
        });
        world
            .spawn_herd(species, sim.herd_size, around, sim.spawn_spread)
            .with_context(|| format!("Failed to spawn herd {}", i))?;
    }
    Ok(())
}

/// Mate two distinct members of a random herd
///
/// Returns false if no herd has a pair or the child's genes were not viable.
fn breed(world: &mut World, rng: &mut Xoshiro256StarStar) -> Result<bool> {
    let candidates: Vec<HerdId> = world
        .herds()
        .iter()
        .filter(|h| h.len() >= 2)
        .map(|h| h.id())
        .collect();
    if candidates.is_empty() {
        return Ok(false);
    }

    let herd = candidates[rng.gen_range(0..candidates.len())];
    let len = world.herd(herd).map_or(0, |h| h.len());
    let a = rng.gen_range(0..len);
    let b = (a + rng.gen_range(1..len)) % len;
    match world.mate(herd, a, herd, b) {
        Ok(_) => Ok(true),
        Err(WorldError::Herd(err @ HerdError::Genes { .. })) => {
            log::warn!("{}: child of {} and {} not viable: {}", herd, a, b, err);
            Ok(false)
        }
        Err(err) => Err(err).context("Mating failed"),
    }
}

fn report(world: &World, births: usize, last_tick: TickStats) -> SimulationReport {
    let layers = world.layers();
    let herds = world
        .herds()
        .iter()
        .map(|herd| {
            let speeds: f32 = herd.velocities().iter().map(|v| v.length()).sum();
            HerdReport {
                id: herd.id().0,
                species: herd.species().to_string(),
                size: herd.len(),
                centroid: centroid(herd.positions()),
                mean_speed: if herd.is_empty() {
                    0.0
                } else {
                    speeds / herd.len() as f32
                },
            }
        })
        .collect();

    SimulationReport {
        world: world.config().name.clone(),
        seed: world.seed(),
        land_tiles: layers.land.len(),
        water_tiles: layers.water.len(),
        trees: layers.trees.len(),
        shrubs: layers.shrubs.len(),
        rocks: layers.rocks.len(),
        unstable_passes: layers.unstable_passes.iter().map(|p| p.to_string()).collect(),
        ticks: world.ticks(),
        births,
        last_tick,
        herds,
    }
}

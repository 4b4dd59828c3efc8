use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::creature::flocking::{FlockError, FlockSimulator, FlockStats, SpeedLimitPolicy};
use crate::creature::world_interaction::avoid_water;
use crate::creature::{Creature, Herd, HerdError, HerdId, Species, WorldAccess};
use crate::world::automaton::{AutomatonError, Cell};
use crate::world::generation::{GeneratedWorld, WorldGenerator};
use crate::world::worldgen_config::{ConfigError, WorldGenConfig};

/// Errors from building or driving a world
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("world generation failed: {0}")]
    Generation(#[from] AutomatonError),
    #[error(transparent)]
    Herd(#[from] HerdError),
    #[error(transparent)]
    Flock(#[from] FlockError),
    #[error("no species at index {0}")]
    UnknownSpecies(usize),
    #[error("no such herd: {0}")]
    UnknownHerd(HerdId),
    #[error("{herd} has no creature at index {index}")]
    UnknownCreature { herd: HerdId, index: usize },
    #[error("spawn spread must be finite and non-negative, got {0}")]
    InvalidSpread(f32),
}

/// Per-tick summary across all herds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub tick: u64,
    pub herds: usize,
    pub agents: usize,
    pub separated: usize,
    pub clamped: usize,
    /// Agents nudged away from water this tick
    pub avoided_water: usize,
}

impl TickStats {
    fn absorb(&mut self, flock: FlockStats, avoided_water: usize) {
        self.herds += 1;
        self.agents += flock.agents;
        self.separated += flock.separated;
        self.clamped += flock.clamped;
        self.avoided_water += avoided_water;
    }
}

/// Generated layers plus the sizes needed to map tiles to world space
#[derive(Debug, Clone)]
struct Landscape {
    cell_size: f32,
    tile_size: f32,
    layers: GeneratedWorld,
}

impl WorldAccess for Landscape {
    fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn water_tiles(&self) -> &[Cell] {
        &self.layers.water.tiles
    }
}

/// A generated world populated by herds
///
/// The terrain layers are fixed after construction; herds move over them.
pub struct World {
    config: WorldGenConfig,
    seed: u64,
    landscape: Landscape,
    species: Vec<Species>,
    herds: Vec<Herd>,
    flock: FlockSimulator,
    avoid_water: bool,
    tick: u64,
    rng: Xoshiro256StarStar,
}

impl World {
    /// Validate the config and generate the world layers
    pub fn new(config: WorldGenConfig, seed: u64) -> Result<Self, WorldError> {
        let generator = WorldGenerator::from_config(seed, config)?;
        let layers = generator.generate()?;
        let config = generator.config().clone();

        log::info!(
            "World '{}' ready: {:.0}x{:.0} units, {} land tiles, {} water tiles, {} objects",
            config.name,
            config.world_extent(),
            config.world_extent(),
            layers.land.len(),
            layers.water.len(),
            layers.object_count()
        );
        if !layers.unstable_passes.is_empty() {
            log::warn!("Unstable generation passes: {:?}", layers.unstable_passes);
        }

        Ok(Self {
            landscape: Landscape {
                cell_size: config.cell_size,
                tile_size: config.tile_size(),
                layers,
            },
            config,
            seed,
            species: Vec::new(),
            herds: Vec::new(),
            flock: FlockSimulator::default(),
            avoid_water: false,
            tick: 0,
            // Separate stream from generation so spawning never shifts terrain
            rng: Xoshiro256StarStar::seed_from_u64(seed.wrapping_add(1)),
        })
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Static terrain and object layers
    pub fn layers(&self) -> &GeneratedWorld {
        &self.landscape.layers
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Register a species; returns its index
    pub fn add_species(&mut self, species: Species) -> usize {
        log::info!("Added species '{}'", species.name);
        self.species.push(species);
        self.species.len() - 1
    }

    /// Grow a random species from the world's RNG; returns its index
    pub fn generate_species(&mut self, name: impl Into<String>) -> usize {
        let species = Species::generate(name, &mut self.rng);
        self.add_species(species)
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn herds(&self) -> &[Herd] {
        &self.herds
    }

    pub fn herd(&self, id: HerdId) -> Option<&Herd> {
        self.herds.get(id.0 as usize)
    }

    pub fn herd_mut(&mut self, id: HerdId) -> Option<&mut Herd> {
        self.herds.get_mut(id.0 as usize)
    }

    pub fn avoids_water(&self) -> bool {
        self.avoid_water
    }

    /// Enable or disable steering away from water during `update`
    pub fn set_avoid_water(&mut self, enabled: bool) {
        self.avoid_water = enabled;
    }

    pub fn set_speed_limit(&mut self, policy: SpeedLimitPolicy) {
        self.flock.speed_limit = policy;
    }

    /// Centre of a randomly chosen land tile, or `None` on a world without land
    pub fn random_land_position(&mut self) -> Option<Vec2> {
        let land = &self.landscape.layers.land.tiles;
        if land.is_empty() {
            return None;
        }
        let tile = land[self.rng.gen_range(0..land.len())];
        let half = Vec2::splat(self.landscape.tile_size / 2.0);
        Some(self.landscape.tile_position(tile) + half)
    }

    /// Create a herd of `count` creatures of one species
    ///
    /// Creatures start at rest, scattered uniformly within `spread` of `around`
    /// on each axis.
    pub fn spawn_herd(
        &mut self,
        species_index: usize,
        count: usize,
        around: Vec2,
        spread: f32,
    ) -> Result<HerdId, WorldError> {
        let species = self
            .species
            .get(species_index)
            .ok_or(WorldError::UnknownSpecies(species_index))?;
        if !(spread.is_finite() && spread >= 0.0) {
            return Err(WorldError::InvalidSpread(spread));
        }

        let id = HerdId(self.herds.len() as u32);
        let mut herd = Herd::new(id, species.name.clone());
        for _ in 0..count {
            let offset = Vec2::new(
                self.rng.gen_range(-spread..=spread),
                self.rng.gen_range(-spread..=spread),
            );
            herd.add(Creature::from_species(species), around + offset)?;
        }

        log::info!(
            "Spawned {} with {} '{}' creatures around ({:.1}, {:.1})",
            id,
            count,
            species.name,
            around.x,
            around.y
        );
        self.herds.push(herd);
        Ok(id)
    }

    /// Breed two creatures and add the child to one parent's herd
    ///
    /// Uses the configured mutation rate. The child starts at rest at its
    /// parents' midpoint. Returns the child's herd and index.
    pub fn mate(
        &mut self,
        herd_a: HerdId,
        index_a: usize,
        herd_b: HerdId,
        index_b: usize,
    ) -> Result<(HerdId, usize), WorldError> {
        let (parent_a, position_a) = Self::member(&self.herds, herd_a, index_a)?;
        let (parent_b, position_b) = Self::member(&self.herds, herd_b, index_b)?;

        let child = parent_a.mate(parent_b, self.config.mutation_rate, &mut self.rng);
        let target = child.herd().unwrap_or(herd_a);
        let midpoint = (position_a + position_b) / 2.0;

        let herd = self
            .herds
            .get_mut(target.0 as usize)
            .ok_or(WorldError::UnknownHerd(target))?;
        let index = herd.add(child, midpoint)?;
        log::debug!("Child born into {} at index {}", target, index);
        Ok((target, index))
    }

    fn member(herds: &[Herd], id: HerdId, index: usize) -> Result<(&Creature, Vec2), WorldError> {
        let herd = herds.get(id.0 as usize).ok_or(WorldError::UnknownHerd(id))?;
        let creature = herd
            .creature(index)
            .ok_or(WorldError::UnknownCreature { herd: id, index })?;
        let position = herd
            .position(index)
            .ok_or(WorldError::UnknownCreature { herd: id, index })?;
        Ok((creature, position))
    }

    /// Advance every herd by `dt`
    ///
    /// Herds share no state, so on native targets they are updated in parallel.
    pub fn update(&mut self, dt: f32) -> Result<TickStats, WorldError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(FlockError::InvalidTimeStep(dt).into());
        }

        let landscape = &self.landscape;
        let flock = self.flock;
        let avoid = self.avoid_water;
        let tick_herd = |herd: &mut Herd| -> Result<(FlockStats, usize), FlockError> {
            let avoided = if avoid { avoid_water(herd, landscape) } else { 0 };
            Ok((flock.step(herd, dt)?, avoided))
        };

        #[cfg(not(target_arch = "wasm32"))]
        let results: Vec<_> = {
            use rayon::prelude::*;
            self.herds.par_iter_mut().map(tick_herd).collect()
        };

        #[cfg(target_arch = "wasm32")]
        let results: Vec<_> = self.herds.iter_mut().map(tick_herd).collect();

        let mut stats = TickStats {
            tick: self.tick + 1,
            ..TickStats::default()
        };
        for result in results {
            let (flock_stats, avoided) = result?;
            stats.absorb(flock_stats, avoided);
        }
        self.tick = stats.tick;

        log::trace!(
            "Tick {}: {} agents in {} herds, {} clamped",
            stats.tick,
            stats.agents,
            stats.herds,
            stats.clamped
        );
        Ok(stats)
    }
}

impl WorldAccess for World {
    fn cell_size(&self) -> f32 {
        self.landscape.cell_size
    }

    fn tile_size(&self) -> f32 {
        self.landscape.tile_size
    }

    fn water_tiles(&self) -> &[Cell] {
        self.landscape.water_tiles()
    }
}

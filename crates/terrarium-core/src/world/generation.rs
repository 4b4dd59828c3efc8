use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::world::automaton::{AutomatonError, Cell, CellularAutomaton, RuleSet};
use crate::world::objects::{Rock, Shrub, Tree, cell_position};
use crate::world::worldgen_config::{ConfigError, WorldGenConfig};
use crate::world::WorldRng;

/// Set of tiles on a square grid, sorted row-major
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileLayer {
    pub resolution: usize,
    pub tiles: Vec<Cell>,
}

impl TileLayer {
    fn from_automaton(ca: &CellularAutomaton) -> Self {
        Self {
            resolution: ca.rows(),
            tiles: ca.cells(),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.tiles.binary_search(&(row, col)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.tiles.iter()
    }
}

/// Static layers produced once at world creation
#[derive(Debug, Clone, Default)]
pub struct GeneratedWorld {
    /// Land tiles at terrain resolution
    pub land: TileLayer,
    /// Shore water tiles at terrain resolution; never overlaps `land`
    pub water: TileLayer,
    pub trees: Vec<Tree>,
    pub shrubs: Vec<Shrub>,
    pub rocks: Vec<Rock>,
    /// Stabilised land mask at grid resolution (object placement mask)
    pub coarse_terrain: TileLayer,
    /// Passes that hit the generation cap before reaching a fixed point
    pub unstable_passes: Vec<&'static str>,
}

impl GeneratedWorld {
    pub fn object_count(&self) -> usize {
        self.trees.len() + self.shrubs.len() + self.rocks.len()
    }
}

/// World generator built on life-like cellular automata
///
/// Can be created with default parameters via `new(seed)` or with a full
/// configuration via `from_config(seed, config)`. The same seed and config
/// always produce the same world.
pub struct WorldGenerator {
    pub seed: u64,
    config: WorldGenConfig,
    upscale_steps: u32,
}

impl WorldGenerator {
    /// Create a new WorldGenerator with default configuration
    pub fn new(seed: u64) -> Self {
        let config = WorldGenConfig::default();
        // Default resolution is the grid doubled twice
        Self {
            seed,
            config,
            upscale_steps: 2,
        }
    }

    /// Create a WorldGenerator from a validated configuration
    pub fn from_config(seed: u64, config: WorldGenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let upscale_steps = config.upscale_steps()?;
        Ok(Self {
            seed,
            config,
            upscale_steps,
        })
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    /// Generate the world from this generator's seed
    pub fn generate(&self) -> Result<GeneratedWorld, AutomatonError> {
        let mut rng = Xoshiro256StarStar::seed_from_u64(self.seed);
        self.generate_with_rng(&mut rng)
    }

    /// Generate the world drawing all randomness from `rng`
    ///
    /// Randomness is consumed in a fixed order: terrain mask, tree mask and
    /// trees, shrub mask and shrubs, rocks. Upscaling and the water pass are
    /// deterministic.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<GeneratedWorld, AutomatonError> {
        let config = &self.config;
        let mut world = GeneratedWorld::default();

        let terrain = self.stabilized_mask("terrain", config.land_probability, rng, &mut world)?;
        let land_cells = terrain.cells();

        let tree_mask = self.stabilized_mask("trees", config.tree_probability, rng, &mut world)?;
        world.trees = self.place(&land_cells, &tree_mask, rng, Tree::generate);

        let shrub_mask =
            self.stabilized_mask("shrubs", config.shrub_probability, rng, &mut world)?;
        world.shrubs = self.place(&land_cells, &shrub_mask, rng, Shrub::generate);

        for &(row, col) in &land_cells {
            if rng.check_probability(config.rock_probability) {
                let position = cell_position(row, col, config.cell_size, rng);
                world.rocks.push(Rock::generate(position, rng));
            }
        }

        world.coarse_terrain = TileLayer::from_automaton(&terrain);

        let mut fine = terrain;
        for _ in 0..self.upscale_steps {
            fine.upscale();
        }
        world.land = TileLayer::from_automaton(&fine);

        fine.set_rules(RuleSet::shoreline());
        fine.step();
        world.water = TileLayer::from_automaton(&fine);

        log::info!(
            "Generated '{}' (seed {}): {} land / {} water tiles at {}x{}, {} trees, {} shrubs, {} rocks",
            config.name,
            self.seed,
            world.land.len(),
            world.water.len(),
            world.land.resolution,
            world.land.resolution,
            world.trees.len(),
            world.shrubs.len(),
            world.rocks.len()
        );
        Ok(world)
    }

    /// Seed a coarse mask, clear its borders and run it to a fixed point
    fn stabilized_mask<R: Rng + ?Sized>(
        &self,
        pass: &'static str,
        probability: f32,
        rng: &mut R,
        world: &mut GeneratedWorld,
    ) -> Result<CellularAutomaton, AutomatonError> {
        let size = self.config.grid_size;
        let mut ca = CellularAutomaton::new(size, size, RuleSet::terrain())?;
        ca.seed_random(probability, rng);
        ca.clear_borders();

        match ca.run_until_stable(self.config.max_generations) {
            Ok(generations) => log::debug!(
                "{} mask stable after {} generations, {} cells alive",
                pass,
                generations,
                ca.alive_count()
            ),
            Err(AutomatonError::NotConverged { generations }) => {
                log::warn!(
                    "{} mask did not stabilise within {} generations, keeping last board",
                    pass,
                    generations
                );
                world.unstable_passes.push(pass);
            }
            Err(e) => return Err(e),
        }
        Ok(ca)
    }

    /// Instantiate an object on every land cell that is also alive in `mask`
    fn place<R, T, F>(&self, land: &[Cell], mask: &CellularAutomaton, rng: &mut R, make: F) -> Vec<T>
    where
        R: Rng + ?Sized,
        F: Fn(Vec2, &mut R) -> T,
    {
        let cell_size = self.config.cell_size;
        land.iter()
            .filter(|&&(row, col)| mask.is_alive(row, col))
            .map(|&(row, col)| {
                let position = cell_position(row, col, cell_size, rng);
                make(position, rng)
            })
            .collect()
    }
}

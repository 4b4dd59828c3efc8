//! World generation and the simulated world

pub mod automaton;
pub mod generation;
pub mod objects;
pub mod rng_trait;
#[allow(clippy::module_inception)]
mod world;
pub mod worldgen_config;

pub use automaton::{AutomatonError, Cell, CellularAutomaton, NeighborCounts, RuleSet};
pub use generation::{GeneratedWorld, TileLayer, WorldGenerator};
pub use objects::{Rock, Shrub, Tree};
pub use rng_trait::WorldRng;
pub use world::{TickStats, World, WorldError};
pub use worldgen_config::{ConfigError, WorldGenConfig};

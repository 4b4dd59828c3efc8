//! Terrarium core: cellular-automaton worlds populated by flocking herds

pub mod world;

// Re-export from terrarium-creature so callers only need one crate
pub mod creature {
    pub use terrarium_creature::*;
}

pub use world::{GeneratedWorld, World, WorldError, WorldGenConfig, WorldGenerator, WorldRng};

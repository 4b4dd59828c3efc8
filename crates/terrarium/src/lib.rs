//! # Terrarium - artificial-life sandbox
//!
//! Cellular-automaton islands populated by herds of genetically parameterised,
//! flocking creatures. This crate is the headless driver around `terrarium-core`.

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod headless;

// Re-export core modules for convenience
pub use terrarium_core::creature;
pub use terrarium_core::world;

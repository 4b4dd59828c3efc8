//! Genetically parameterized creatures for Terrarium
//!
//! This crate implements:
//! - Named numeric genes, crossover and mutation (`mate`)
//! - Species with randomly grown body-part trees and body-derived physiology genes
//! - Herds that keep creatures, positions and velocities index-aligned
//! - Boids-style flocking driven by each agent's own genes
//! - World access traits for water avoidance and steering

pub mod creature;
pub mod flocking;
pub mod genome;
pub mod herd;
pub mod species;
pub mod traits;
pub mod types;
pub mod vector;
pub mod world_interaction;

// Re-export main types for convenience
pub use creature::{BehaviorState, Creature};
pub use flocking::{FlockError, FlockSimulator, FlockStats, PairwiseField, SpeedLimitPolicy};
pub use genome::{FlockingGenes, GeneError, GeneKey, Genes};
pub use herd::{Herd, HerdError};
pub use species::{BodyPart, PartKind, Species};
pub use traits::WorldAccess;
pub use types::{EntityId, HerdId};
pub use vector::{Vec2Ext, VectorError};

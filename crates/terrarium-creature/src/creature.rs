//! Creature entity
//!
//! A creature carries its species' body and its own genes. Where it is and how
//! fast it moves live in its herd, not here.

use rand::Rng;
use std::sync::Arc;

use crate::genome::{Genes, crossover_genes};
use crate::species::{BodyPart, Species};
use crate::types::{EntityId, HerdId};

/// Starting energy of a newborn creature
pub const INITIAL_ENERGY: f32 = 100.0;

/// What a creature is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorState {
    /// Moving with its herd (boids flocking)
    #[default]
    Herding,
}

/// A single creature
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: EntityId,
    pub species: String,
    pub genes: Genes,
    pub body: Arc<BodyPart>,
    pub energy: f32,
    pub age: u32,
    pub state: BehaviorState,

    // Managed by `Herd`
    pub(crate) herd: Option<HerdId>,
    pub(crate) herd_index: Option<usize>,
}

impl Creature {
    /// Create a creature with explicit genes
    pub fn with_genes(species: impl Into<String>, genes: Genes, body: Arc<BodyPart>) -> Self {
        Self {
            id: EntityId::new(),
            species: species.into(),
            genes,
            body,
            energy: INITIAL_ENERGY,
            age: 0,
            state: BehaviorState::Herding,
            herd: None,
            herd_index: None,
        }
    }

    /// Create a creature carrying a species' body and genes
    pub fn from_species(species: &Species) -> Self {
        Self::with_genes(
            species.name.clone(),
            species.genes.clone(),
            Arc::new(species.body.clone()),
        )
    }

    /// Herd this creature belongs to (or, for an unborn child, will join)
    pub fn herd(&self) -> Option<HerdId> {
        self.herd
    }

    /// Current index inside its herd; `None` when not a herd member
    pub fn herd_index(&self) -> Option<usize> {
        self.herd_index
    }

    /// Produce a child of two creatures
    ///
    /// Genes come from [`crossover_genes`]. The child is destined for one of
    /// the parents' herds, picked at random, and takes that parent's species
    /// and body. It is not a herd member until added.
    pub fn mate<R: Rng + ?Sized>(&self, other: &Creature, mutation_rate: f32, rng: &mut R) -> Self {
        let genes = crossover_genes(&self.genes, &other.genes, mutation_rate, rng);
        let template = if rng.gen_bool(0.5) { self } else { other };

        let mut child = Self::with_genes(template.species.clone(), genes, template.body.clone());
        child.herd = template.herd;
        log::debug!(
            "{} and {} produced {} for {:?}",
            self.id,
            other.id,
            child.id,
            child.herd
        );
        child
    }
}

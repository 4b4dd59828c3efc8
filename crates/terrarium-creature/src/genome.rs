//! Named numeric genes and crossover
//!
//! Genes are produced once when a creature is created and only change through
//! [`crossover_genes`], which builds a child's genes from two parents.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Name of a single gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneKey {
    // Physiology, derived from the body
    Strength,
    Speed,
    Intelligence,
    Ferocity,

    // Flocking weights
    CohesionFactor,
    HerdingSeparationFactor,
    HerdingDistance,
    VelocityMatchingFactor,
    VelocityLimit,

    // Steering towards (or away from) a target
    MoveTowardsFactor,
}

impl GeneKey {
    pub const ALL: [GeneKey; 10] = [
        GeneKey::Strength,
        GeneKey::Speed,
        GeneKey::Intelligence,
        GeneKey::Ferocity,
        GeneKey::CohesionFactor,
        GeneKey::HerdingSeparationFactor,
        GeneKey::HerdingDistance,
        GeneKey::VelocityMatchingFactor,
        GeneKey::VelocityLimit,
        GeneKey::MoveTowardsFactor,
    ];

    /// Genes every herd member must carry
    pub const FLOCKING: [GeneKey; 5] = [
        GeneKey::HerdingDistance,
        GeneKey::HerdingSeparationFactor,
        GeneKey::CohesionFactor,
        GeneKey::VelocityMatchingFactor,
        GeneKey::VelocityLimit,
    ];

    /// External (camelCase) name of this gene
    pub fn name(&self) -> &'static str {
        match self {
            GeneKey::Strength => "strength",
            GeneKey::Speed => "speed",
            GeneKey::Intelligence => "intelligence",
            GeneKey::Ferocity => "ferocity",
            GeneKey::CohesionFactor => "cohesionFactor",
            GeneKey::HerdingSeparationFactor => "herdingSeparationFactor",
            GeneKey::HerdingDistance => "herdingDistance",
            GeneKey::VelocityMatchingFactor => "velocityMatchingFactor",
            GeneKey::VelocityLimit => "velocityLimit",
            GeneKey::MoveTowardsFactor => "moveTowardsFactor",
        }
    }
}

impl std::fmt::Display for GeneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for GeneKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| format!("Unknown gene: {}", s))
    }
}

/// Errors raised when reading genes
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneError {
    #[error("missing gene `{0}`")]
    Missing(GeneKey),
    #[error("gene `{key}` has invalid value {value}: {reason}")]
    Invalid {
        key: GeneKey,
        value: f32,
        reason: &'static str,
    },
}

/// Mapping from gene name to value
///
/// Ordered so that crossover consumes randomness in a fixed key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genes(BTreeMap<GeneKey, f32>);

impl Genes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: GeneKey) -> Option<f32> {
        self.0.get(&key).copied()
    }

    pub fn set(&mut self, key: GeneKey, value: f32) {
        self.0.insert(key, value);
    }

    pub fn contains(&self, key: GeneKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Get a gene that has to be present
    pub fn require(&self, key: GeneKey) -> Result<f32, GeneError> {
        self.get(key).ok_or(GeneError::Missing(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GeneKey, f32)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(GeneKey, f32)> for Genes {
    fn from_iter<I: IntoIterator<Item = (GeneKey, f32)>>(iter: I) -> Self {
        Genes(iter.into_iter().collect())
    }
}

/// The flocking weights of one agent, validated and unpacked from its genes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlockingGenes {
    /// Neighbours closer than this push the agent away
    pub herding_distance: f32,
    pub herding_separation_factor: f32,
    pub cohesion_factor: f32,
    pub velocity_matching_factor: f32,
    /// Maximum speed
    pub velocity_limit: f32,
}

impl FlockingGenes {
    pub fn from_genes(genes: &Genes) -> Result<Self, GeneError> {
        for key in GeneKey::FLOCKING {
            let value = genes.require(key)?;
            if !value.is_finite() {
                return Err(GeneError::Invalid {
                    key,
                    value,
                    reason: "must be finite",
                });
            }
        }

        let herding_distance = genes.require(GeneKey::HerdingDistance)?;
        if herding_distance <= 0.0 {
            return Err(GeneError::Invalid {
                key: GeneKey::HerdingDistance,
                value: herding_distance,
                reason: "must be positive",
            });
        }
        let velocity_limit = genes.require(GeneKey::VelocityLimit)?;
        if velocity_limit <= 0.0 {
            return Err(GeneError::Invalid {
                key: GeneKey::VelocityLimit,
                value: velocity_limit,
                reason: "must be positive",
            });
        }

        Ok(Self {
            herding_distance,
            herding_separation_factor: genes.require(GeneKey::HerdingSeparationFactor)?,
            cohesion_factor: genes.require(GeneKey::CohesionFactor)?,
            velocity_matching_factor: genes.require(GeneKey::VelocityMatchingFactor)?,
            velocity_limit,
        })
    }
}

// ===== Crossover =====

/// Combine two parents' genes into a child's
///
/// For every gene both parents carry, one parent's value is picked uniformly
/// and then perturbed by up to `mutation_rate` of itself in either direction.
/// Genes carried by only one parent are not inherited.
pub fn crossover_genes<R: Rng + ?Sized>(
    parent1: &Genes,
    parent2: &Genes,
    mutation_rate: f32,
    rng: &mut R,
) -> Genes {
    parent1
        .iter()
        .filter_map(|(key, value1)| parent2.get(key).map(|value2| (key, value1, value2)))
        .map(|(key, value1, value2)| {
            let chosen = if rng.gen_bool(0.5) { value1 } else { value2 };
            let perturbation: f32 = rng.gen_range(-1.0..=1.0);
            (key, chosen + chosen * mutation_rate * perturbation)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn flocking_genes() -> Genes {
        [
            (GeneKey::CohesionFactor, 0.01),
            (GeneKey::HerdingSeparationFactor, 1.0),
            (GeneKey::HerdingDistance, 10.0),
            (GeneKey::VelocityMatchingFactor, 0.001),
            (GeneKey::VelocityLimit, 10.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_gene_names_round_trip() {
        for key in GeneKey::ALL {
            assert_eq!(key.name().parse::<GeneKey>(), Ok(key));
        }
        assert_eq!("herdingDistance".parse::<GeneKey>(), Ok(GeneKey::HerdingDistance));
        assert!("herdingDistace".parse::<GeneKey>().is_err());
    }

    #[test]
    fn test_serde_uses_external_names() {
        let genes: Genes = [(GeneKey::VelocityLimit, 4.0)].into_iter().collect();
        let text = ron::to_string(&genes).expect("Failed to serialize");
        assert!(text.contains("velocityLimit"), "got {}", text);
        let back: Genes = ron::from_str(&text).expect("Failed to deserialize");
        assert_eq!(back, genes);
    }

    #[test]
    fn test_require_missing_gene() {
        let genes = Genes::new();
        assert_eq!(
            genes.require(GeneKey::CohesionFactor),
            Err(GeneError::Missing(GeneKey::CohesionFactor))
        );
    }

    #[test]
    fn test_flocking_genes_from_complete_set() {
        let flocking = FlockingGenes::from_genes(&flocking_genes()).unwrap();
        assert_eq!(flocking.herding_distance, 10.0);
        assert_eq!(flocking.velocity_limit, 10.0);
        assert_eq!(flocking.cohesion_factor, 0.01);
    }

    #[test]
    fn test_flocking_genes_rejects_missing_and_invalid() {
        let mut genes = flocking_genes();
        genes.0.remove(&GeneKey::VelocityLimit);
        assert_eq!(
            FlockingGenes::from_genes(&genes),
            Err(GeneError::Missing(GeneKey::VelocityLimit))
        );

        let mut genes = flocking_genes();
        genes.set(GeneKey::HerdingDistance, 0.0);
        assert!(matches!(
            FlockingGenes::from_genes(&genes),
            Err(GeneError::Invalid {
                key: GeneKey::HerdingDistance,
                ..
            })
        ));

        let mut genes = flocking_genes();
        genes.set(GeneKey::CohesionFactor, f32::NAN);
        assert!(matches!(
            FlockingGenes::from_genes(&genes),
            Err(GeneError::Invalid {
                key: GeneKey::CohesionFactor,
                ..
            })
        ));
    }

    #[test]
    fn test_crossover_identical_parents_without_mutation() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        let parent = flocking_genes();
        let child = crossover_genes(&parent, &parent.clone(), 0.0, &mut rng);
        assert_eq!(child, parent);
    }

    #[test]
    fn test_crossover_picks_from_either_parent() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let parent1: Genes = [(GeneKey::Speed, 1.0)].into_iter().collect();
        let parent2: Genes = [(GeneKey::Speed, 2.0)].into_iter().collect();

        let mut seen_first = false;
        let mut seen_second = false;
        for _ in 0..100 {
            let child = crossover_genes(&parent1, &parent2, 0.0, &mut rng);
            match child.get(GeneKey::Speed) {
                Some(v) if v == 1.0 => seen_first = true,
                Some(v) if v == 2.0 => seen_second = true,
                other => panic!("unexpected gene value {:?}", other),
            }
        }
        assert!(seen_first);
        assert!(seen_second);
    }

    #[test]
    fn test_crossover_mutation_is_bounded() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(99);
        let parent: Genes = [(GeneKey::HerdingDistance, 10.0)].into_iter().collect();

        for _ in 0..200 {
            let child = crossover_genes(&parent, &parent, 0.5, &mut rng);
            let value = child.require(GeneKey::HerdingDistance).unwrap();
            assert!((5.0..=15.0).contains(&value), "value {} out of ±50%", value);
        }
    }

    #[test]
    fn test_crossover_drops_unshared_genes() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let parent1: Genes = [(GeneKey::Speed, 1.0), (GeneKey::Strength, 3.0)]
            .into_iter()
            .collect();
        let parent2: Genes = [(GeneKey::Speed, 1.0)].into_iter().collect();

        let child = crossover_genes(&parent1, &parent2, 0.0, &mut rng);
        assert_eq!(child.len(), 1);
        assert!(!child.contains(GeneKey::Strength));
    }
}

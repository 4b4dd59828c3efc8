//! Herd membership and per-agent state arrays
//!
//! A herd stores its members' creatures, positions, velocities and flocking
//! genes as parallel vectors. Index `i` refers to the same agent in all four,
//! and each creature's `herd_index` is always its current index.

use glam::Vec2;
use thiserror::Error;

use crate::creature::Creature;
use crate::genome::{FlockingGenes, GeneError};
use crate::types::{EntityId, HerdId};

/// Errors from adding or removing herd members
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HerdError {
    #[error("creature {0} is already a member of a herd")]
    AlreadyMember(EntityId),
    #[error("index {index} out of range for herd of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("creature {0} is not a member of this herd")]
    UnknownCreature(EntityId),
    #[error("creature {id} cannot flock: {source}")]
    Genes {
        id: EntityId,
        #[source]
        source: GeneError,
    },
}

/// A group of creatures sharing one flocking computation
#[derive(Debug, Clone)]
pub struct Herd {
    id: HerdId,
    species: String,
    creatures: Vec<Creature>,
    pub(crate) positions: Vec<Vec2>,
    pub(crate) velocities: Vec<Vec2>,
    flocking: Vec<FlockingGenes>,
}

impl Herd {
    /// Create an empty herd
    pub fn new(id: HerdId, species: impl Into<String>) -> Self {
        Self {
            id,
            species: species.into(),
            creatures: Vec::new(),
            positions: Vec::new(),
            velocities: Vec::new(),
            flocking: Vec::new(),
        }
    }

    pub fn id(&self) -> HerdId {
        self.id
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// Number of agents (N)
    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    /// Add a creature at rest at `position`
    ///
    /// The creature's flocking genes are validated before anything is stored,
    /// so a rejected creature leaves the herd untouched. Returns the new index.
    pub fn add(&mut self, mut creature: Creature, position: Vec2) -> Result<usize, HerdError> {
        if creature.herd_index.is_some() {
            return Err(HerdError::AlreadyMember(creature.id));
        }
        let flocking =
            FlockingGenes::from_genes(&creature.genes).map_err(|source| HerdError::Genes {
                id: creature.id,
                source,
            })?;

        let index = self.creatures.len();
        creature.herd = Some(self.id);
        creature.herd_index = Some(index);

        log::debug!(
            "{} joined {} at ({:.1}, {:.1}), index {}",
            creature.id,
            self.id,
            position.x,
            position.y,
            index
        );

        self.creatures.push(creature);
        self.positions.push(position);
        self.velocities.push(Vec2::ZERO);
        self.flocking.push(flocking);
        Ok(index)
    }

    /// Remove the agent at `index`
    ///
    /// Later members shift down by one and have their `herd_index` renumbered.
    pub fn remove(&mut self, index: usize) -> Result<Creature, HerdError> {
        if index >= self.creatures.len() {
            return Err(HerdError::IndexOutOfRange {
                index,
                len: self.creatures.len(),
            });
        }

        let mut creature = self.creatures.remove(index);
        self.positions.remove(index);
        self.velocities.remove(index);
        self.flocking.remove(index);

        for (i, member) in self.creatures.iter_mut().enumerate().skip(index) {
            member.herd_index = Some(i);
        }

        creature.herd = None;
        creature.herd_index = None;
        log::debug!("{} left {}", creature.id, self.id);
        Ok(creature)
    }

    /// Remove a member by its stable id
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Creature, HerdError> {
        let index = self.find(id).ok_or(HerdError::UnknownCreature(id))?;
        self.remove(index)
    }

    /// Current index of a member
    pub fn find(&self, id: EntityId) -> Option<usize> {
        self.creatures.iter().position(|c| c.id == id)
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creature(&self, index: usize) -> Option<&Creature> {
        self.creatures.get(index)
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    /// Flocking weights, index-aligned with the agents
    pub fn flocking_genes(&self) -> &[FlockingGenes] {
        &self.flocking
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }

    pub fn velocity(&self, index: usize) -> Option<Vec2> {
        self.velocities.get(index).copied()
    }

    /// Overwrite one agent's velocity
    pub fn set_velocity(&mut self, index: usize, velocity: Vec2) -> Result<(), HerdError> {
        let len = self.velocities.len();
        let slot = self
            .velocities
            .get_mut(index)
            .ok_or(HerdError::IndexOutOfRange { index, len })?;
        *slot = velocity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GeneKey, Genes};
    use crate::species::{BodyPart, PartKind, PartShape, default_behavior_genes};
    use std::sync::Arc;

    fn creature() -> Creature {
        Creature::with_genes(
            "grazer",
            default_behavior_genes(),
            Arc::new(BodyPart::new(PartKind::Core, PartShape::Round { radius: 1.0 })),
        )
    }

    fn assert_consistent(herd: &Herd) {
        let n = herd.len();
        assert_eq!(herd.positions().len(), n);
        assert_eq!(herd.velocities().len(), n);
        assert_eq!(herd.flocking_genes().len(), n);
        for (i, c) in herd.creatures().iter().enumerate() {
            assert_eq!(c.herd_index(), Some(i));
            assert_eq!(c.herd(), Some(herd.id()));
        }
    }

    #[test]
    fn test_add_appends_at_rest() {
        let mut herd = Herd::new(HerdId(0), "grazer");
        assert!(herd.is_empty());

        let index = herd.add(creature(), Vec2::new(3.0, 4.0)).unwrap();
        assert_eq!(index, 0);
        assert_eq!(herd.len(), 1);
        assert_eq!(herd.position(0), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(herd.velocity(0), Some(Vec2::ZERO));
        assert_consistent(&herd);
    }

    #[test]
    fn test_add_rejects_creature_without_flocking_genes() {
        let mut herd = Herd::new(HerdId(0), "grazer");
        herd.add(creature(), Vec2::ZERO).unwrap();

        let genes: Genes = [(GeneKey::Speed, 2.0)].into_iter().collect();
        let bad = Creature::with_genes("grazer", genes, creature().body);
        let err = herd.add(bad, Vec2::ONE).unwrap_err();
        assert!(matches!(err, HerdError::Genes { .. }));

        // Nothing was stored for the rejected creature
        assert_eq!(herd.len(), 1);
        assert_consistent(&herd);
    }

    #[test]
    fn test_add_rejects_existing_member() {
        let mut herd = Herd::new(HerdId(0), "grazer");
        herd.add(creature(), Vec2::ZERO).unwrap();
        let copy = herd.creature(0).unwrap().clone();
        assert!(matches!(
            herd.add(copy, Vec2::ZERO),
            Err(HerdError::AlreadyMember(_))
        ));
    }

    #[test]
    fn test_remove_renumbers_later_members() {
        let mut herd = Herd::new(HerdId(2), "grazer");
        for i in 0..5 {
            herd.add(creature(), Vec2::new(i as f32, 0.0)).unwrap();
        }
        let removed_id = herd.creature(1).unwrap().id;
        let last_id = herd.creature(4).unwrap().id;

        let removed = herd.remove(1).unwrap();
        assert_eq!(removed.id, removed_id);
        assert!(removed.herd().is_none());
        assert!(removed.herd_index().is_none());

        assert_eq!(herd.len(), 4);
        assert_eq!(herd.find(last_id), Some(3));
        assert_eq!(herd.position(1), Some(Vec2::new(2.0, 0.0)));
        assert_consistent(&herd);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut herd = Herd::new(HerdId(0), "grazer");
        assert_eq!(
            herd.remove(0).unwrap_err(),
            HerdError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_add_remove_sequence_keeps_arrays_aligned() {
        let mut herd = Herd::new(HerdId(0), "grazer");
        for i in 0..10 {
            herd.add(creature(), Vec2::splat(i as f32)).unwrap();
        }
        for index in [9, 0, 3, 3, 1] {
            herd.remove(index).unwrap();
            assert_consistent(&herd);
        }
        for _ in 0..3 {
            herd.add(creature(), Vec2::ZERO).unwrap();
            assert_consistent(&herd);
        }
        assert_eq!(herd.len(), 8);
    }

    #[test]
    fn test_removed_creature_can_join_another_herd() {
        let mut first = Herd::new(HerdId(0), "grazer");
        let mut second = Herd::new(HerdId(1), "grazer");
        first.add(creature(), Vec2::ZERO).unwrap();
        let id = first.creature(0).unwrap().id;

        let moved = first.remove_entity(id).unwrap();
        assert_eq!(second.add(moved, Vec2::ONE).unwrap(), 0);
        assert_eq!(second.creature(0).unwrap().id, id);
        assert!(first.remove_entity(id).is_err());
    }

    #[test]
    fn test_set_velocity() {
        let mut herd = Herd::new(HerdId(0), "grazer");
        herd.add(creature(), Vec2::ZERO).unwrap();
        herd.set_velocity(0, Vec2::new(1.0, 2.0)).unwrap();
        assert_eq!(herd.velocity(0), Some(Vec2::new(1.0, 2.0)));
        assert!(herd.set_velocity(1, Vec2::ZERO).is_err());
    }
}

//! Steering creatures relative to world features

use glam::Vec2;

use crate::genome::GeneKey;
use crate::herd::Herd;
use crate::traits::WorldAccess;

/// Velocity nudge that steers from `position` towards `target`
pub fn move_towards(position: Vec2, target: Vec2, factor: f32) -> Vec2 {
    (target - position) * factor
}

/// Velocity changes that push each agent away from nearby water
///
/// Every water tile within one cell width of an agent contributes the
/// negated `move_towards` nudge, scaled by the agent's `moveTowardsFactor`.
/// Agents without that gene are left alone.
pub fn water_avoidance<W: WorldAccess + ?Sized>(herd: &Herd, world: &W) -> Vec<Vec2> {
    let radius = world.cell_size();
    herd.creatures()
        .iter()
        .zip(herd.positions())
        .map(|(creature, &position)| {
            let Some(factor) = creature.genes.get(GeneKey::MoveTowardsFactor) else {
                return Vec2::ZERO;
            };
            world
                .water_near(position, radius)
                .into_iter()
                .map(|water| -move_towards(position, water, factor))
                .sum()
        })
        .collect()
}

/// Apply [`water_avoidance`] to the herd's velocities
///
/// Returns the number of agents that were nudged.
pub fn avoid_water<W: WorldAccess + ?Sized>(herd: &mut Herd, world: &W) -> usize {
    let nudges = water_avoidance(herd, world);
    let mut nudged = 0;
    for (velocity, nudge) in herd.velocities.iter_mut().zip(nudges) {
        if nudge != Vec2::ZERO {
            *velocity += nudge;
            nudged += 1;
        }
    }
    if nudged > 0 {
        log::trace!("{}: {} agents steered away from water", herd.id(), nudged);
    }
    nudged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::Creature;
    use crate::species::{BodyPart, PartKind, PartShape, default_behavior_genes};
    use crate::types::HerdId;
    use std::sync::Arc;

    struct Pond {
        water: Vec<(usize, usize)>,
    }

    impl WorldAccess for Pond {
        fn cell_size(&self) -> f32 {
            10.0
        }

        fn tile_size(&self) -> f32 {
            2.5
        }

        fn water_tiles(&self) -> &[(usize, usize)] {
            &self.water
        }
    }

    fn herd_at(positions: &[Vec2]) -> Herd {
        let body = Arc::new(BodyPart::new(PartKind::Core, PartShape::Round { radius: 1.0 }));
        let mut herd = Herd::new(HerdId(0), "test");
        for &p in positions {
            herd.add(
                Creature::with_genes("test", default_behavior_genes(), body.clone()),
                p,
            )
            .unwrap();
        }
        herd
    }

    #[test]
    fn test_move_towards() {
        let v = move_towards(Vec2::new(1.0, 1.0), Vec2::new(3.0, 5.0), 0.5);
        assert_eq!(v, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_tile_position_scales_by_tile_size() {
        let pond = Pond { water: vec![] };
        // (row, col) maps to (x = col, y = row)
        assert_eq!(pond.tile_position((2, 4)), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn test_water_near_filters_by_radius() {
        let pond = Pond {
            water: vec![(0, 2), (0, 8)],
        };
        let near = pond.water_near(Vec2::ZERO, 10.0);
        assert_eq!(near, vec![Vec2::new(5.0, 0.0)]);
    }

    #[test]
    fn test_avoid_water_pushes_away() {
        // Water at (5, 0), agent at the origin and one far away
        let pond = Pond {
            water: vec![(0, 2)],
        };
        let mut herd = herd_at(&[Vec2::ZERO, Vec2::new(100.0, 100.0)]);

        let nudged = avoid_water(&mut herd, &pond);
        assert_eq!(nudged, 1);
        // moveTowardsFactor defaults to 1
        assert_eq!(herd.velocity(0), Some(Vec2::new(-5.0, 0.0)));
        assert_eq!(herd.velocity(1), Some(Vec2::ZERO));
    }

    #[test]
    fn test_agents_without_factor_are_skipped() {
        let pond = Pond {
            water: vec![(0, 2)],
        };
        let mut herd = Herd::new(HerdId(0), "test");
        let body = Arc::new(BodyPart::new(PartKind::Core, PartShape::Round { radius: 1.0 }));
        let bare: crate::genome::Genes = default_behavior_genes()
            .iter()
            .filter(|(key, _)| *key != GeneKey::MoveTowardsFactor)
            .collect();
        herd.add(Creature::with_genes("test", bare, body), Vec2::ZERO)
            .unwrap();

        assert_eq!(water_avoidance(&herd, &pond), vec![Vec2::ZERO]);
    }
}

//! Boids-style flocking with per-agent genetic weights
//!
//! Each tick, every agent in a herd is steered by three contributions:
//! - separation: away from herd mates closer than its own `herdingDistance`
//! - cohesion: towards the herd centroid
//! - alignment: towards the herd's mean velocity
//!
//! All contributions are computed from one snapshot of the herd and committed
//! together, so the result does not depend on agent order.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::herd::Herd;
use crate::vector::{Vec2Ext, VectorError};

/// Errors from a flocking step
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlockError {
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),
    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// Arithmetic mean of a set of vectors (zero for an empty set)
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// All pairwise position differences and distances of a herd
///
/// Row-major N×N matrices: entry `(i, j)` holds `p_i - p_j` and its length.
#[derive(Debug, Clone, Default)]
pub struct PairwiseField {
    n: usize,
    differences: Vec<Vec2>,
    distances: Vec<f32>,
}

impl PairwiseField {
    pub fn compute(positions: &[Vec2]) -> Self {
        let n = positions.len();
        let mut differences = Vec::with_capacity(n * n);
        for &pi in positions {
            for &pj in positions {
                differences.push(pi - pj);
            }
        }
        let distances = differences.iter().map(|d| d.length()).collect();
        Self {
            n,
            differences,
            distances,
        }
    }

    /// Number of agents (the matrices are `len() × len()`)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// `p_i - p_j`
    pub fn difference(&self, i: usize, j: usize) -> Vec2 {
        self.differences[i * self.n + j]
    }

    pub fn distance(&self, i: usize, j: usize) -> f32 {
        self.distances[i * self.n + j]
    }

    /// Row `i` of the distance matrix
    pub fn distances_from(&self, i: usize) -> &[f32] {
        &self.distances[i * self.n..(i + 1) * self.n]
    }
}

/// Which velocity limit caps each agent's speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedLimitPolicy {
    /// The first agent's `velocityLimit` caps the whole herd
    #[default]
    Leader,
    /// Every agent is capped by its own `velocityLimit`
    PerAgent,
}

/// Summary of one flocking step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlockStats {
    pub agents: usize,
    /// Agents with at least one other herd mate inside their herding distance
    pub separated: usize,
    /// Agents whose speed was clamped
    pub clamped: usize,
}

/// Advances herds by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlockSimulator {
    pub speed_limit: SpeedLimitPolicy,
}

impl FlockSimulator {
    pub fn new(speed_limit: SpeedLimitPolicy) -> Self {
        Self { speed_limit }
    }

    /// Steer every agent, clamp speeds, then move by `velocity * dt`
    pub fn step(&self, herd: &mut Herd, dt: f32) -> Result<FlockStats, FlockError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(FlockError::InvalidTimeStep(dt));
        }
        let n = herd.len();
        if n == 0 {
            return Ok(FlockStats::default());
        }

        let (mut velocities, separated) = self.steer(herd);
        let clamped = self.clamp_speeds(herd, &mut velocities)?;

        for ((position, velocity), next) in herd
            .positions
            .iter_mut()
            .zip(herd.velocities.iter_mut())
            .zip(velocities)
        {
            *velocity = next;
            *position += next * dt;
        }

        log::trace!(
            "{}: {} agents, {} separating, {} clamped",
            herd.id(),
            n,
            separated,
            clamped
        );
        Ok(FlockStats {
            agents: n,
            separated,
            clamped,
        })
    }

    /// New velocities before speed clamping, plus the number of agents that
    /// had a herd mate inside their separation radius
    fn steer(&self, herd: &Herd) -> (Vec<Vec2>, usize) {
        let positions = herd.positions();
        let velocities = herd.velocities();
        let genes = herd.flocking_genes();

        let center = centroid(positions);
        let center_velocity = centroid(velocities);
        let field = PairwiseField::compute(positions);

        let mut separated = 0;
        let next = (0..positions.len())
            .map(|i| {
                let g = &genes[i];

                // The agent itself is always inside the radius (distance 0) and
                // adds a zero difference.
                let mut push = Vec2::ZERO;
                let mut too_close = 0;
                for (j, &distance) in field.distances_from(i).iter().enumerate() {
                    if distance < g.herding_distance {
                        push += field.difference(i, j);
                        too_close += 1;
                    }
                }
                if too_close > 1 {
                    separated += 1;
                }

                let separation = push * g.herding_separation_factor;
                let cohesion = (center - positions[i]) * g.cohesion_factor;
                let alignment = (center_velocity - velocities[i]) * g.velocity_matching_factor;
                velocities[i] + separation + cohesion + alignment
            })
            .collect();
        (next, separated)
    }

    fn clamp_speeds(&self, herd: &Herd, velocities: &mut [Vec2]) -> Result<usize, FlockError> {
        let genes = herd.flocking_genes();
        let leader_limit = genes[0].velocity_limit;

        let mut clamped = 0;
        for (velocity, g) in velocities.iter_mut().zip(genes) {
            let limit = match self.speed_limit {
                SpeedLimitPolicy::Leader => leader_limit,
                SpeedLimitPolicy::PerAgent => g.velocity_limit,
            };
            if velocity.length() > limit {
                *velocity = velocity.unit()? * limit;
                clamped += 1;
            }
        }
        Ok(clamped)
    }
}

//! Static scenery placed on coarse terrain cells
//!
//! Each object records its world position and the randomised attributes a
//! renderer needs to draw it. Nothing here changes after generation.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Branching levels of a tree
pub const TREE_BRANCH_DEPTH: u32 = 5;
/// Leaves on each tree branch tip
pub const TREE_LEAF_COUNT: u32 = 5;
/// Branching levels of a shrub
pub const SHRUB_BRANCH_DEPTH: u32 = 4;

/// World position for an object in coarse cell (row, col)
///
/// The cell centre jittered by up to half a cell on each axis, so the result
/// stays inside the cell.
pub fn cell_position<R: Rng + ?Sized>(row: usize, col: usize, cell_size: f32, rng: &mut R) -> Vec2 {
    let half = cell_size / 2.0;
    let x = col as f32 * cell_size + half + rng.gen_range(-half..=half);
    let y = row as f32 * cell_size + half + rng.gen_range(-half..=half);
    Vec2::new(x, y)
}

/// A recursively branching tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub position: Vec2,
    pub branch_depth: u32,
    /// Degrees
    pub rotation: f32,
    /// Degrees between sibling branches
    pub spread: f32,
    /// Degrees
    pub tilt: f32,
    pub length: f32,
    pub thickness: f32,
    pub leaf_size: f32,
    pub leaf_count: u32,
    pub trunk_color: [f32; 3],
    pub leaf_color: [f32; 3],
}

impl Tree {
    pub fn generate<R: Rng + ?Sized>(position: Vec2, rng: &mut R) -> Self {
        Self {
            position,
            branch_depth: TREE_BRANCH_DEPTH,
            rotation: rng.gen_range(80.0..100.0),
            spread: rng.gen_range(15.0..45.0),
            tilt: rng.gen_range(-40.0..40.0),
            length: rng.gen_range(1.0..3.0),
            thickness: rng.gen_range(1.0..2.0),
            leaf_size: rng.gen_range(1.0..3.0),
            leaf_count: TREE_LEAF_COUNT,
            trunk_color: [rng.gen_range(0.4..0.5), rng.gen_range(0.2..0.4), 0.0],
            leaf_color: [rng.gen_range(0.0..0.2), rng.gen_range(0.1..1.0), 0.0],
        }
    }
}

/// A low bush of curved stems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shrub {
    pub position: Vec2,
    pub branch_depth: u32,
    pub leaves: u32,
    pub length: f32,
    /// Degrees
    pub spread: f32,
    /// Degrees
    pub curve: f32,
    /// Degrees
    pub tilt: f32,
    pub thickness: f32,
    pub color: [f32; 3],
}

impl Shrub {
    pub fn generate<R: Rng + ?Sized>(position: Vec2, rng: &mut R) -> Self {
        Self {
            position,
            branch_depth: SHRUB_BRANCH_DEPTH,
            leaves: rng.gen_range(4..=8),
            length: rng.gen_range(0.5..1.0),
            spread: rng.gen_range(50.0..120.0),
            curve: rng.gen_range(0.0..40.0),
            tilt: rng.gen_range(-10.0..10.0),
            thickness: rng.gen_range(0.1..1.0),
            color: [rng.gen_range(0.0..0.2), rng.gen_range(0.5..1.0), 0.0],
        }
    }
}

/// A grey polygonal rock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    pub position: Vec2,
    pub sides: u32,
    pub radius: f32,
    pub color: [f32; 3],
}

impl Rock {
    pub fn generate<R: Rng + ?Sized>(position: Vec2, rng: &mut R) -> Self {
        let sides = rng.gen_range(7..=15);
        let radius = rng.gen_range(1.0..3.0);
        let grey = rng.gen_range(0.2..0.3);
        Self {
            position,
            sides,
            radius,
            color: [grey; 3],
        }
    }
}

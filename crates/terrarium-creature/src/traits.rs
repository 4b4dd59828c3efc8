//! World access traits for creature-world interaction
//!
//! These traits define the interface between creatures and the world,
//! allowing the creature crate to be decoupled from world generation.

use glam::Vec2;

/// Read-only access to the generated world
pub trait WorldAccess {
    /// World units covered by one coarse grid cell
    fn cell_size(&self) -> f32;

    /// World units covered by one fine terrain tile
    fn tile_size(&self) -> f32;

    /// Water tiles as (row, col) at terrain resolution
    fn water_tiles(&self) -> &[(usize, usize)];

    /// World-space anchor of a terrain tile (its top-left corner)
    fn tile_position(&self, tile: (usize, usize)) -> Vec2 {
        let (row, col) = tile;
        Vec2::new(col as f32, row as f32) * self.tile_size()
    }

    /// Water tiles whose anchor lies strictly within `radius` of `position`
    fn water_near(&self, position: Vec2, radius: f32) -> Vec<Vec2> {
        self.water_tiles()
            .iter()
            .map(|&tile| self.tile_position(tile))
            .filter(|water| water.distance(position) < radius)
            .collect()
    }
}

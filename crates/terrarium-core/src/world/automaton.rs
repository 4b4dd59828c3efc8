//! Life-like cellular automaton on a toroidal grid
//!
//! The board is a sparse set of alive cells. A generation only looks at alive
//! cells and their eight neighbours, so mostly-empty boards step cheaply.
//! Neighbour lookups wrap around both axes at the current grid size.

use ahash::AHashSet;
use bitflags::bitflags;
use thiserror::Error;

use crate::world::WorldRng;

/// Grid coordinate as (row, col)
pub type Cell = (usize, usize);

/// Smallest supported grid dimension; border clearing removes two cells per edge
pub const MIN_DIMENSION: usize = 5;

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

bitflags! {
    /// Set of neighbour counts (0 through 8)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NeighborCounts: u16 {
        const ZERO = 1 << 0;
        const ONE = 1 << 1;
        const TWO = 1 << 2;
        const THREE = 1 << 3;
        const FOUR = 1 << 4;
        const FIVE = 1 << 5;
        const SIX = 1 << 6;
        const SEVEN = 1 << 7;
        const EIGHT = 1 << 8;
    }
}

impl NeighborCounts {
    /// Build a set from a list of counts; values above 8 can never occur and are ignored
    pub fn of(counts: &[u8]) -> Self {
        counts
            .iter()
            .filter(|&&count| count <= 8)
            .fold(Self::empty(), |set, &count| {
                set | Self::from_bits_retain(1 << count)
            })
    }

    pub fn contains_count(&self, count: u8) -> bool {
        count <= 8 && self.bits() & (1 << count) != 0
    }
}

/// Survival (`stay`) and birth (`begin`) conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    /// An alive cell survives if its alive-neighbour count is in this set
    pub stay: NeighborCounts,
    /// A dead cell comes alive if its alive-neighbour count is in this set
    pub begin: NeighborCounts,
}

impl RuleSet {
    pub fn new(stay: &[u8], begin: &[u8]) -> Self {
        Self {
            stay: NeighborCounts::of(stay),
            begin: NeighborCounts::of(begin),
        }
    }

    /// Conway's Game of Life (B3/S23)
    pub fn conway() -> Self {
        Self::new(&[2, 3], &[3])
    }

    /// Clumping rule for land and vegetation masks
    pub fn terrain() -> Self {
        Self::new(&[4, 5, 6, 7, 8], &[5, 6, 7, 8])
    }

    /// Rounds off the blockiness left by doubling the resolution
    pub fn smoothing() -> Self {
        Self::new(&[5, 6, 7, 8], &[5, 6, 7, 8])
    }

    /// Everything alive dies; dead cells beside the old pattern come alive.
    /// One step of this turns a land mask into the ring of tiles around it.
    pub fn shoreline() -> Self {
        Self::new(&[], &[2, 3, 4, 5])
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::conway()
    }
}

/// Errors raised by the automaton
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("grid of {rows}x{cols} is too small, both dimensions must be at least {min}", min = MIN_DIMENSION)]
    TooSmall { rows: usize, cols: usize },
    #[error("no stable state after {generations} generations")]
    NotConverged { generations: usize },
}

/// Binary cellular automaton on an R×C torus
#[derive(Debug, Clone)]
pub struct CellularAutomaton {
    rows: usize,
    cols: usize,
    rules: RuleSet,
    board: AHashSet<Cell>,
    stable: bool,
}

impl CellularAutomaton {
    /// Create an empty automaton
    pub fn new(rows: usize, cols: usize, rules: RuleSet) -> Result<Self, AutomatonError> {
        if rows < MIN_DIMENSION || cols < MIN_DIMENSION {
            return Err(AutomatonError::TooSmall { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            rules,
            board: AHashSet::default(),
            stable: false,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Replace the rule set; the board is kept
    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
        self.stable = false;
    }

    /// True when the last generation left the board unchanged
    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn alive_count(&self) -> usize {
        self.board.len()
    }

    /// Whether a cell is alive (coordinates wrap)
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.board.contains(&(row % self.rows, col % self.cols))
    }

    /// Mark a cell alive (coordinates wrap)
    pub fn set_alive(&mut self, row: usize, col: usize) {
        if self.board.insert((row % self.rows, col % self.cols)) {
            self.stable = false;
        }
    }

    /// Alive cells in row-major order
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.board.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Clear the board, then mark every cell alive with probability `p`
    pub fn seed_random<R: WorldRng + ?Sized>(&mut self, p: f32, rng: &mut R) {
        self.board.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if rng.check_probability(p) {
                    self.board.insert((row, col));
                }
            }
        }
        self.stable = false;
    }

    /// Kill every cell in the outer two rows and columns
    ///
    /// Keeps patterns from leaking across the wrap-around at world edges.
    pub fn clear_borders(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        let before = self.board.len();
        self.board
            .retain(|&(row, col)| row >= 2 && row < rows - 2 && col >= 2 && col < cols - 2);
        if self.board.len() != before {
            self.stable = false;
        }
    }

    fn wrap(&self, row: usize, col: usize, dr: isize, dc: isize) -> Cell {
        let r = (row as isize + dr).rem_euclid(self.rows as isize) as usize;
        let c = (col as isize + dc).rem_euclid(self.cols as isize) as usize;
        (r, c)
    }

    /// Number of alive cells among the eight toroidal neighbours
    pub fn count_neighbors(&self, row: usize, col: usize) -> u8 {
        NEIGHBOR_OFFSETS
            .iter()
            .filter(|&&(dr, dc)| self.board.contains(&self.wrap(row, col, dr, dc)))
            .count() as u8
    }

    /// Advance one generation
    ///
    /// Dead cells are only considered when they border an alive cell, so a
    /// `begin` count of zero never fires.
    pub fn step(&mut self) {
        let mut next = AHashSet::with_capacity(self.board.len());
        let mut checked_dead: AHashSet<Cell> = AHashSet::default();

        for &(row, col) in &self.board {
            if self.rules.stay.contains_count(self.count_neighbors(row, col)) {
                next.insert((row, col));
            }

            for &(dr, dc) in &NEIGHBOR_OFFSETS {
                let cell = self.wrap(row, col, dr, dc);
                if self.board.contains(&cell) || !checked_dead.insert(cell) {
                    continue;
                }
                if self
                    .rules
                    .begin
                    .contains_count(self.count_neighbors(cell.0, cell.1))
                {
                    next.insert(cell);
                }
            }
        }

        self.stable = next == self.board;
        self.board = next;
    }

    /// Step until a generation leaves the board unchanged
    ///
    /// Returns the number of generations run. After `max_generations` without
    /// reaching a fixed point the latest board is kept and
    /// [`AutomatonError::NotConverged`] is returned.
    pub fn run_until_stable(&mut self, max_generations: usize) -> Result<usize, AutomatonError> {
        let mut generations = 0;
        while !self.stable {
            if generations == max_generations {
                return Err(AutomatonError::NotConverged { generations });
            }
            self.step();
            generations += 1;
        }
        Ok(generations)
    }

    /// Double both dimensions, turning every alive cell into a 2×2 block
    pub fn double_resolution(&mut self) {
        self.board = self
            .board
            .iter()
            .flat_map(|&(row, col)| {
                let (r, c) = (2 * row, 2 * col);
                [(r, c), (r + 1, c), (r, c + 1), (r + 1, c + 1)]
            })
            .collect();
        self.rows *= 2;
        self.cols *= 2;
        self.stable = false;
    }

    /// Double the resolution, switch to [`RuleSet::smoothing`] and run one
    /// generation to round off the 2×2 blocks
    pub fn upscale(&mut self) {
        self.double_resolution();
        self.rules = RuleSet::smoothing();
        self.step();
    }
}

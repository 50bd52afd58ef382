//! Pest layer: a boolean infestation grid with 8-neighbour spread.
//!
//! Infestation is permanent until treated. Spread is evaluated from a
//! snapshot of the grid, so cells infected this tick do not propagate
//! further within the same tick. Pesticide clears the treated cell
//! deterministically and each of its neighbours with a fixed probability.

use agrimesh_types::{GridPos, GridSize};
use rand::Rng;

use crate::grid::moore_neighbors;
use crate::params::{P_SPREAD, PESTICIDE_NEIGHBOR_EFFECT};

/// The pest layer of the field.
///
/// The layer is inactive until an infestation is seeded; spread only runs
/// while active, and clearing the last infested cell deactivates it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PestGrid {
    size: GridSize,
    infested: Vec<bool>,
    active: bool,
}

impl PestGrid {
    /// Create a pest-free, inactive layer.
    pub fn new(size: GridSize) -> Self {
        Self { size, infested: vec![false; size.cell_count()], active: false }
    }

    /// Whether the pest system is currently active.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn offset(&self, pos: GridPos) -> Option<usize> {
        if !self.size.contains(pos) {
            return None;
        }
        pos.row.checked_mul(self.size.cols)?.checked_add(pos.col)
    }

    /// Whether pests infest the cell. Out-of-bounds reads as clean.
    pub fn is_infested(&self, pos: GridPos) -> bool {
        self.offset(pos)
            .and_then(|o| self.infested.get(o))
            .copied()
            .unwrap_or(false)
    }

    /// Soil pest load of the cell: 1.0 when infested, 0.0 otherwise.
    pub fn load(&self, pos: GridPos) -> f64 {
        if self.is_infested(pos) { 1.0 } else { 0.0 }
    }

    /// Number of infested cells.
    pub fn infested_count(&self) -> usize {
        self.infested.iter().filter(|i| **i).count()
    }

    fn set(&mut self, pos: GridPos, value: bool) {
        if let Some(offset) = self.offset(pos) {
            if let Some(cell) = self.infested.get_mut(offset) {
                *cell = value;
            }
        }
    }

    /// Seed an infestation and activate the layer.
    pub fn infest(&mut self, pos: GridPos) {
        if self.size.contains(pos) {
            self.set(pos, true);
            self.active = true;
        }
    }

    /// Clear a cell unconditionally. Clearing the last infested cell
    /// deactivates the layer.
    pub fn clear(&mut self, pos: GridPos) {
        self.set(pos, false);
        if self.infested_count() == 0 {
            self.active = false;
        }
    }

    /// Clear the whole grid and deactivate the layer.
    pub fn clear_all(&mut self) {
        self.infested.fill(false);
        self.active = false;
    }

    /// One spread step: each clean cell with `n` infested Moore neighbours
    /// becomes infested with probability `1 - (1 - P_SPREAD)^n`. A no-op
    /// while the layer is inactive.
    pub fn step_spread<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.active {
            return;
        }
        let snapshot = self.clone();
        for row in 0..self.size.rows {
            for col in 0..self.size.cols {
                let pos = GridPos::new(row, col);
                if snapshot.is_infested(pos) {
                    continue;
                }
                let infested_neighbors = moore_neighbors(self.size, pos)
                    .into_iter()
                    .filter(|n| snapshot.is_infested(*n))
                    .count();
                if infested_neighbors == 0 {
                    continue;
                }
                let exponent = i32::try_from(infested_neighbors).unwrap_or(i32::MAX);
                let p_infect = 1.0 - (1.0 - P_SPREAD).powi(exponent);
                if rng.random_bool(p_infect.clamp(0.0, 1.0)) {
                    self.set(pos, true);
                }
            }
        }
    }

    /// Treat a cell with pesticide: the cell itself is always cleared, and
    /// each Moore neighbour is cleared with probability
    /// [`PESTICIDE_NEIGHBOR_EFFECT`].
    pub fn apply_pesticide<R: Rng + ?Sized>(&mut self, pos: GridPos, rng: &mut R) {
        self.set(pos, false);
        for neighbor in moore_neighbors(self.size, pos) {
            if self.is_infested(neighbor) && rng.random_bool(PESTICIDE_NEIGHBOR_EFFECT) {
                self.set(neighbor, false);
            }
        }
        if self.infested_count() == 0 {
            self.active = false;
        }
    }
}

//! Dense scalar layers over the field grid.
//!
//! Moisture and nutrients are stored as row-major `f64` layers. Neighbour
//! queries are bounds-filtered: edge cells simply have fewer neighbours,
//! there is no wrap-around.

use agrimesh_types::{GridPos, GridSize};

/// A row-major grid of `f64` values, one per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    size: GridSize,
    cells: Vec<f64>,
}

impl ScalarGrid {
    /// Create a grid with every cell set to `fill`.
    pub fn new(size: GridSize, fill: f64) -> Self {
        Self { size, cells: vec![fill; size.cell_count()] }
    }

    /// Grid dimensions.
    pub const fn size(&self) -> GridSize {
        self.size
    }

    fn offset(&self, pos: GridPos) -> Option<usize> {
        if !self.size.contains(pos) {
            return None;
        }
        pos.row.checked_mul(self.size.cols)?.checked_add(pos.col)
    }

    /// Value at a position, or `None` when out of bounds.
    pub fn get(&self, pos: GridPos) -> Option<f64> {
        self.cells.get(self.offset(pos)?).copied()
    }

    /// Overwrite the value at a position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: GridPos, value: f64) {
        if let Some(offset) = self.offset(pos) {
            if let Some(cell) = self.cells.get_mut(offset) {
                *cell = value;
            }
        }
    }

    /// Add a delta to the value at a position.
    pub fn add(&mut self, pos: GridPos, delta: f64) {
        if let Some(value) = self.get(pos) {
            self.set(pos, value + delta);
        }
    }

    /// Clamp every cell into `[lo, hi]`.
    pub fn clamp_all(&mut self, lo: f64, hi: f64) {
        for cell in &mut self.cells {
            *cell = cell.clamp(lo, hi);
        }
    }

    /// Mean over all cells; zero for an empty grid.
    pub fn mean(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.cells.len() as f64;
        self.cells.iter().sum::<f64>() / count
    }

    /// Mean of the in-bounds orthogonal neighbours of a position.
    ///
    /// Returns `None` for an out-of-bounds position or a 1x1 grid with no
    /// neighbours at all.
    pub fn neighbor_mean(&self, pos: GridPos) -> Option<f64> {
        if !self.size.contains(pos) {
            return None;
        }
        let neighbors = orthogonal_neighbors(self.size, pos);
        if neighbors.is_empty() {
            return None;
        }
        let sum: f64 = neighbors.iter().filter_map(|n| self.get(*n)).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = neighbors.len() as f64;
        Some(sum / count)
    }

    /// Iterate over `(position, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, f64)> + '_ {
        let size = self.size;
        (0..size.rows).flat_map(move |row| {
            (0..size.cols).filter_map(move |col| {
                let pos = GridPos::new(row, col);
                self.get(pos).map(|value| (pos, value))
            })
        })
    }
}

/// In-bounds orthogonal (4-connected) neighbours of a position.
pub fn orthogonal_neighbors(size: GridSize, pos: GridPos) -> Vec<GridPos> {
    let mut neighbors = Vec::with_capacity(4);
    if let Some(row) = pos.row.checked_sub(1) {
        neighbors.push(GridPos::new(row, pos.col));
    }
    if let Some(col) = pos.col.checked_sub(1) {
        neighbors.push(GridPos::new(pos.row, col));
    }
    neighbors.push(GridPos::new(pos.row.saturating_add(1), pos.col));
    neighbors.push(GridPos::new(pos.row, pos.col.saturating_add(1)));
    neighbors.retain(|n| size.contains(*n));
    neighbors
}

/// In-bounds Moore (8-connected) neighbours of a position.
pub fn moore_neighbors(size: GridSize, pos: GridPos) -> Vec<GridPos> {
    let mut neighbors = Vec::with_capacity(8);
    let row_lo = pos.row.saturating_sub(1);
    let col_lo = pos.col.saturating_sub(1);
    for row in row_lo..=pos.row.saturating_add(1) {
        for col in col_lo..=pos.col.saturating_add(1) {
            let candidate = GridPos::new(row, col);
            if candidate != pos && size.contains(candidate) {
                neighbors.push(candidate);
            }
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: GridSize = GridSize::new(3, 3);

    #[test]
    fn get_set_roundtrip() {
        let mut grid = ScalarGrid::new(SIZE, 50.0);
        grid.set(GridPos::new(1, 2), 75.0);
        assert_eq!(grid.get(GridPos::new(1, 2)), Some(75.0));
        assert_eq!(grid.get(GridPos::new(0, 0)), Some(50.0));
        assert_eq!(grid.get(GridPos::new(3, 0)), None);
    }

    #[test]
    fn clamp_bounds_values() {
        let mut grid = ScalarGrid::new(SIZE, 50.0);
        grid.add(GridPos::new(0, 0), 100.0);
        grid.add(GridPos::new(2, 2), -100.0);
        grid.clamp_all(0.0, 100.0);
        assert_eq!(grid.get(GridPos::new(0, 0)), Some(100.0));
        assert_eq!(grid.get(GridPos::new(2, 2)), Some(0.0));
    }

    #[test]
    fn corner_has_two_orthogonal_neighbors() {
        let neighbors = orthogonal_neighbors(SIZE, GridPos::new(0, 0));
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&GridPos::new(1, 0)));
        assert!(neighbors.contains(&GridPos::new(0, 1)));
    }

    #[test]
    fn center_has_eight_moore_neighbors() {
        assert_eq!(moore_neighbors(SIZE, GridPos::new(1, 1)).len(), 8);
        assert_eq!(moore_neighbors(SIZE, GridPos::new(0, 0)).len(), 3);
        assert_eq!(moore_neighbors(SIZE, GridPos::new(0, 1)).len(), 5);
    }

    #[test]
    fn neighbor_mean_uses_in_bounds_cells_only() {
        let mut grid = ScalarGrid::new(SIZE, 0.0);
        grid.set(GridPos::new(0, 1), 30.0);
        grid.set(GridPos::new(1, 0), 60.0);
        let mean = grid.neighbor_mean(GridPos::new(0, 0));
        assert_eq!(mean, Some(45.0));
    }

    #[test]
    fn single_cell_grid_has_no_neighbor_mean() {
        let grid = ScalarGrid::new(GridSize::new(1, 1), 10.0);
        assert_eq!(grid.neighbor_mean(GridPos::new(0, 0)), None);
    }
}

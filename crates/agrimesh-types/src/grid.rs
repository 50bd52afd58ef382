//! Grid addressing for the field.
//!
//! The field is a fixed `rows x cols` grid of cells. Positions are
//! zero-based `(row, col)` pairs; a [`Zone`] names either a single cell, a
//! 2x2 block anchored at its top-left corner, or a whole column. Zones may
//! partially overflow the grid; resolution filters out-of-bounds members,
//! and only a zone with zero in-bounds cells is an addressing error.

use serde::{Deserialize, Serialize};

/// Zero-based cell coordinate on the field grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Row index, 0 at the top.
    pub row: usize,
    /// Column index, 0 at the left.
    pub col: usize,
}

impl GridPos {
    /// Create a position from row and column indexes.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another position, in cells.
    pub const fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row).saturating_add(self.col.abs_diff(other.col))
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Dimensions of the field grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl GridSize {
    /// Create a grid size.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Whether the position lies inside the grid.
    pub const fn contains(self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Total number of cells.
    pub const fn cell_count(self) -> usize {
        self.rows.saturating_mul(self.cols)
    }
}

/// A named region of the field that a reading or task applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Zone {
    /// A single cell.
    Cell {
        /// The cell position.
        pos: GridPos,
    },
    /// A 2x2 block anchored at its top-left cell.
    Block2x2 {
        /// Top-left corner of the block.
        anchor: GridPos,
    },
    /// An entire column.
    Column {
        /// The column index.
        col: usize,
    },
}

impl Zone {
    /// Resolve the zone to its in-bounds member cells, in row-major order.
    ///
    /// Members outside the grid are silently dropped; the returned vector is
    /// empty only when the whole zone lies off-grid.
    pub fn cells(self, size: GridSize) -> Vec<GridPos> {
        match self {
            Self::Cell { pos } => {
                if size.contains(pos) {
                    vec![pos]
                } else {
                    Vec::new()
                }
            }
            Self::Block2x2 { anchor } => {
                let mut cells = Vec::with_capacity(4);
                for dr in 0..2 {
                    for dc in 0..2 {
                        let pos = GridPos::new(
                            anchor.row.saturating_add(dr),
                            anchor.col.saturating_add(dc),
                        );
                        if size.contains(pos) {
                            cells.push(pos);
                        }
                    }
                }
                cells
            }
            Self::Column { col } => {
                if col >= size.cols {
                    return Vec::new();
                }
                (0..size.rows).map(|row| GridPos::new(row, col)).collect()
            }
        }
    }

    /// The anchor cell used for distance calculations (bidding ETAs).
    ///
    /// Single cells anchor at themselves, blocks at their top-left corner,
    /// columns at row 0 of the column.
    pub const fn reference_cell(self) -> GridPos {
        match self {
            Self::Cell { pos } => pos,
            Self::Block2x2 { anchor } => anchor,
            Self::Column { col } => GridPos::new(0, col),
        }
    }
}

impl core::fmt::Display for Zone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cell { pos } => write!(f, "cell {pos}"),
            Self::Block2x2 { anchor } => write!(f, "block {anchor}"),
            Self::Column { col } => write!(f, "column {col}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: GridSize = GridSize::new(3, 3);

    #[test]
    fn manhattan_distance() {
        assert_eq!(GridPos::new(0, 0).manhattan(GridPos::new(2, 2)), 4);
        assert_eq!(GridPos::new(2, 1).manhattan(GridPos::new(0, 2)), 3);
        assert_eq!(GridPos::new(1, 1).manhattan(GridPos::new(1, 1)), 0);
    }

    #[test]
    fn cell_zone_in_bounds() {
        let zone = Zone::Cell { pos: GridPos::new(1, 2) };
        assert_eq!(zone.cells(SIZE), vec![GridPos::new(1, 2)]);
    }

    #[test]
    fn cell_zone_out_of_bounds_is_empty() {
        let zone = Zone::Cell { pos: GridPos::new(3, 0) };
        assert!(zone.cells(SIZE).is_empty());
    }

    #[test]
    fn block_fully_inside() {
        let zone = Zone::Block2x2 { anchor: GridPos::new(0, 0) };
        assert_eq!(
            zone.cells(SIZE),
            vec![
                GridPos::new(0, 0),
                GridPos::new(0, 1),
                GridPos::new(1, 0),
                GridPos::new(1, 1),
            ]
        );
    }

    #[test]
    fn block_at_corner_clips_to_one_cell() {
        let zone = Zone::Block2x2 { anchor: GridPos::new(2, 2) };
        assert_eq!(zone.cells(SIZE), vec![GridPos::new(2, 2)]);
    }

    #[test]
    fn block_on_edge_clips_to_two_cells() {
        let zone = Zone::Block2x2 { anchor: GridPos::new(2, 1) };
        assert_eq!(zone.cells(SIZE), vec![GridPos::new(2, 1), GridPos::new(2, 2)]);
    }

    #[test]
    fn column_zone_covers_all_rows() {
        let zone = Zone::Column { col: 1 };
        assert_eq!(
            zone.cells(SIZE),
            vec![GridPos::new(0, 1), GridPos::new(1, 1), GridPos::new(2, 1)]
        );
    }

    #[test]
    fn column_out_of_bounds_is_empty() {
        let zone = Zone::Column { col: 5 };
        assert!(zone.cells(SIZE).is_empty());
    }

    #[test]
    fn reference_cells() {
        assert_eq!(
            Zone::Cell { pos: GridPos::new(1, 1) }.reference_cell(),
            GridPos::new(1, 1)
        );
        assert_eq!(
            Zone::Block2x2 { anchor: GridPos::new(1, 0) }.reference_cell(),
            GridPos::new(1, 0)
        );
        assert_eq!(Zone::Column { col: 2 }.reference_cell(), GridPos::new(0, 2));
    }

    #[test]
    fn zone_serde_tagged() {
        let zone = Zone::Cell { pos: GridPos::new(0, 2) };
        let json = serde_json::to_value(zone).unwrap_or_default();
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("cell"));
    }
}

//! Error types for field operations.

use agrimesh_types::{CropStage, GridPos, Zone};
use thiserror::Error;

/// Errors returned by field queries and interventions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The position lies outside the grid. Positions are never clamped.
    #[error("position {pos} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// The offending position.
        pos: GridPos,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// Every cell of the zone lies outside the grid.
    #[error("zone {zone} has no cells inside the {rows}x{cols} grid")]
    EmptyZone {
        /// The offending zone.
        zone: Zone,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// Harvest was attempted on a cell whose crop is not mature.
    #[error("cell {pos} is not ready for harvest (stage {stage:?})")]
    NotMature {
        /// The target cell.
        pos: GridPos,
        /// Its current growth stage.
        stage: CropStage,
    },
}

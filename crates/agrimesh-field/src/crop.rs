//! Crop layer: per-cell growth state, stress factors, and the growth pass.
//!
//! Growth speed and plant health both derive from a combined stress factor,
//! the product of moisture, nutrient, and temperature stress. Stages only
//! move forward; a plant that reaches zero health dies and frees its cell.

use agrimesh_types::{CropKind, CropStage, GridPos, GridSize};

use crate::error::FieldError;
use crate::grid::ScalarGrid;
use crate::params::{
    DAYS_BEFORE_ROT, DROUGHT_TOLERANCE, IDEAL_MOISTURE_TARGET, PEST_DAMAGE_PER_HOUR, ROT_RATE,
    STAGE_DURATIONS_HOURS, UPTAKE_RATES_MM_PER_HOUR,
};
use crate::pest::PestGrid;

/// Growth state of one field cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropCell {
    /// Current growth stage.
    pub stage: CropStage,
    /// Which crop occupies the cell, if any.
    pub kind: Option<CropKind>,
    /// Plant health, 0..=100.
    pub health: f64,
    /// Stress-weighted hours left in the current stage.
    pub hours_remaining: f64,
    /// Days spent in the mature stage.
    pub days_mature: f64,
}

impl CropCell {
    /// An unplanted cell.
    pub const fn empty() -> Self {
        Self {
            stage: CropStage::Empty,
            kind: None,
            health: 0.0,
            hours_remaining: 0.0,
            days_mature: 0.0,
        }
    }

    /// Whether a plant occupies the cell.
    pub const fn is_planted(&self) -> bool {
        self.stage.is_planted()
    }

    const fn clear(&mut self) {
        *self = Self::empty();
    }
}

impl Default for CropCell {
    fn default() -> Self {
        Self::empty()
    }
}

/// Nominal duration of a growth stage in hours for a crop kind.
fn stage_duration(kind: CropKind, stage: CropStage) -> f64 {
    let row = STAGE_DURATIONS_HOURS.get(kind.index()).copied().unwrap_or([0.0; 4]);
    stage
        .index()
        .checked_sub(1)
        .and_then(|i| row.get(i).copied())
        .unwrap_or(0.0)
}

/// Water uptake rate in mm/h for a crop kind at a growth stage.
pub fn uptake_rate(kind: CropKind, stage: CropStage) -> f64 {
    stage
        .index()
        .checked_sub(1)
        .and_then(|i| UPTAKE_RATES_MM_PER_HOUR.get(i))
        .and_then(|row| row.get(kind.index()).copied())
        .unwrap_or(0.0)
}

/// Moisture stress factor in 0..=1 for a crop at a given soil moisture.
///
/// Full comfort within the crop's tolerance band around its ideal target,
/// then a linear ramp down to zero at twice the tolerance.
pub fn moisture_stress(kind: CropKind, moisture: f64) -> f64 {
    let target = IDEAL_MOISTURE_TARGET.get(kind.index()).copied().unwrap_or(75.0);
    let tolerance = DROUGHT_TOLERANCE.get(kind.index()).copied().unwrap_or(10.0);
    let deviation = (moisture - target).abs();
    if deviation <= tolerance {
        1.0
    } else {
        (1.0 - (deviation - tolerance) / tolerance).max(0.0)
    }
}

/// Nutrient stress factor in 0..=1, saturating at 40% nutrients.
pub fn nutrient_stress(nutrients: f64) -> f64 {
    (nutrients / 40.0).clamp(0.0, 1.0)
}

/// Temperature stress factor in 0..=1, comfortable between 15 and 30
/// degrees Celsius with linear ramps outside.
pub fn temperature_stress(temperature: f64) -> f64 {
    if (15.0..=30.0).contains(&temperature) {
        1.0
    } else if temperature < 15.0 {
        ((temperature - 5.0) / 10.0).clamp(0.0, 1.0)
    } else {
        ((40.0 - temperature) / 10.0).clamp(0.0, 1.0)
    }
}

/// The crop layer of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct CropGrid {
    size: GridSize,
    cells: Vec<CropCell>,
}

impl CropGrid {
    /// Create an all-empty crop layer.
    pub fn new(size: GridSize) -> Self {
        Self { size, cells: vec![CropCell::empty(); size.cell_count()] }
    }

    fn offset(&self, pos: GridPos) -> Option<usize> {
        if !self.size.contains(pos) {
            return None;
        }
        pos.row.checked_mul(self.size.cols)?.checked_add(pos.col)
    }

    /// Cell state at a position, or `None` when out of bounds.
    pub fn get(&self, pos: GridPos) -> Option<&CropCell> {
        self.cells.get(self.offset(pos)?)
    }

    fn get_mut(&mut self, pos: GridPos) -> Option<&mut CropCell> {
        let offset = self.offset(pos)?;
        self.cells.get_mut(offset)
    }

    fn oob(&self, pos: GridPos) -> FieldError {
        FieldError::OutOfBounds { pos, rows: self.size.rows, cols: self.size.cols }
    }

    /// Sow a crop into a cell, replacing whatever grows there. The seed
    /// starts at full health with its nominal seed-stage timer.
    pub fn plant(&mut self, pos: GridPos, kind: CropKind) -> Result<(), FieldError> {
        let oob = self.oob(pos);
        let cell = self.get_mut(pos).ok_or(oob)?;
        *cell = CropCell {
            stage: CropStage::Seed,
            kind: Some(kind),
            health: 100.0,
            hours_remaining: stage_duration(kind, CropStage::Seed),
            days_mature: 0.0,
        };
        Ok(())
    }

    /// Harvest a mature cell, returning `(kind, yield)` and freeing the
    /// cell. Any non-mature stage is an error and leaves the cell as is.
    pub fn harvest(&mut self, pos: GridPos) -> Result<(CropKind, f64), FieldError> {
        let oob = self.oob(pos);
        let cell = self.get_mut(pos).ok_or(oob)?;
        if cell.stage != CropStage::Mature {
            return Err(FieldError::NotMature { pos, stage: cell.stage });
        }
        let kind = cell.kind.unwrap_or(CropKind::Tomato);
        let amount = cell.health;
        cell.clear();
        Ok((kind, amount))
    }

    /// Advance every planted cell by `dt` hours.
    pub fn step(
        &mut self,
        moisture: &ScalarGrid,
        nutrients: &ScalarGrid,
        pests: &PestGrid,
        temperature: f64,
        dt: f64,
    ) {
        let size = self.size;
        for row in 0..size.rows {
            for col in 0..size.cols {
                let pos = GridPos::new(row, col);
                let m = moisture.get(pos).unwrap_or(0.0);
                let n = nutrients.get(pos).unwrap_or(0.0);
                let infested = pests.is_infested(pos);
                if let Some(cell) = self.get_mut(pos) {
                    step_cell(cell, m, n, infested, temperature, dt);
                }
            }
        }
    }
}

fn step_cell(
    cell: &mut CropCell,
    moisture: f64,
    nutrients: f64,
    infested: bool,
    temperature: f64,
    dt: f64,
) {
    let Some(kind) = cell.kind.filter(|_| cell.is_planted()) else {
        return;
    };

    let combined = moisture_stress(kind, moisture)
        * nutrient_stress(nutrients)
        * temperature_stress(temperature);
    let regen = ((combined - 0.5) * 2.0).clamp(0.0, 1.0) * 2.0;
    let pest_damage = if infested { PEST_DAMAGE_PER_HOUR } else { 0.0 };
    cell.health = (cell.health + (regen - (1.0 - combined) - pest_damage) * dt).min(100.0);

    if cell.stage == CropStage::Mature {
        cell.days_mature += dt / 24.0;
        let keep_days = DAYS_BEFORE_ROT.get(kind.index()).copied().unwrap_or(7.0);
        if cell.days_mature > keep_days {
            // Rot eats the banked yield no matter how good conditions are.
            cell.health -= ROT_RATE * dt / 24.0;
        }
    } else {
        cell.hours_remaining -= dt * combined;
        if cell.hours_remaining <= 0.0 {
            let next = cell.stage.next();
            cell.stage = next;
            if next == CropStage::Mature {
                cell.hours_remaining = 0.0;
                cell.days_mature = 0.0;
            } else {
                cell.hours_remaining = stage_duration(kind, next);
            }
        }
    }

    if cell.health <= 0.0 {
        cell.clear();
    }
}

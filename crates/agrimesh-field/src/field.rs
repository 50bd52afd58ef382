//! The field facade: owns every layer and drives the fixed update order.
//!
//! One call to [`Field::step`] advances the model by `dt` hours in the
//! order weather, temperature, moisture, nutrients, pests, crops. All
//! randomness flows through the injected [`Rng`], so a seeded generator
//! reproduces a run tick for tick.

use agrimesh_types::{
    CropKind, DroneReading, GridPos, GridSize, RainIntensity, Season, SoilReading, Zone,
};
use rand::Rng;
use tracing::debug;

use crate::crop::CropGrid;
use crate::error::FieldError;
use crate::grid::ScalarGrid;
use crate::params::{INITIAL_DAY, INITIAL_HOUR, MM_TO_PCT};
use crate::pest::PestGrid;
use crate::weather::Weather;
use crate::{moisture, nutrients, temperature};

/// Simulation calendar: day of year and hour of day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldClock {
    /// Day of year, 1..=365.
    pub day: u32,
    /// Hour of day, 0..24.
    pub hour: f64,
}

impl FieldClock {
    /// The default starting point: a July mid-morning.
    pub const fn new() -> Self {
        Self { day: INITIAL_DAY, hour: INITIAL_HOUR }
    }

    /// Advance by `dt` hours, wrapping days and years.
    pub fn advance(&mut self, dt: f64) {
        self.hour += dt;
        while self.hour >= 24.0 {
            self.hour -= 24.0;
            self.day = if self.day >= 365 { 1 } else { self.day.saturating_add(1) };
        }
    }

    /// Season of the current day.
    pub const fn season(&self) -> Season {
        Season::from_day(self.day)
    }
}

impl Default for FieldClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete field state.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    size: GridSize,
    clock: FieldClock,
    weather: Weather,
    air_temperature: f64,
    moisture: ScalarGrid,
    nutrients: ScalarGrid,
    crops: CropGrid,
    pests: PestGrid,
}

impl Field {
    /// Create a field with uniform initial moisture and nutrient levels.
    pub fn new(size: GridSize, initial_moisture: f64, initial_nutrients: f64) -> Self {
        let clock = FieldClock::new();
        Self {
            size,
            clock,
            weather: Weather::new(),
            air_temperature: temperature::deterministic_temperature(clock.day, clock.hour),
            moisture: ScalarGrid::new(size, initial_moisture.clamp(0.0, 100.0)),
            nutrients: ScalarGrid::new(size, initial_nutrients.clamp(0.0, 100.0)),
            crops: CropGrid::new(size),
            pests: PestGrid::new(size),
        }
    }

    /// Grid dimensions.
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Current calendar state.
    pub const fn clock(&self) -> FieldClock {
        self.clock
    }

    /// Current precipitation state.
    pub const fn weather(&self) -> Weather {
        self.weather
    }

    /// Current air temperature, degrees Celsius.
    pub const fn air_temperature(&self) -> f64 {
        self.air_temperature
    }

    /// Advance the whole model by `dt` hours.
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) {
        self.clock.advance(dt);
        let season = self.clock.season();

        self.weather.step(season, dt, rng);
        self.air_temperature = temperature::air_temperature(self.clock.day, self.clock.hour, rng);

        let rain_mm = self.weather.rain_mm_per_hour() * dt;
        moisture::step(
            &mut self.moisture,
            &mut self.nutrients,
            &self.crops,
            self.air_temperature,
            rain_mm,
            dt,
            rng,
        );
        nutrients::step(
            &mut self.nutrients,
            &self.moisture,
            &self.crops,
            &self.pests,
            self.air_temperature,
            self.weather.drought,
            dt,
        );
        self.pests.step_spread(rng);
        self.crops.step(
            &self.moisture,
            &self.nutrients,
            &self.pests,
            self.air_temperature,
            dt,
        );

        debug!(
            day = self.clock.day,
            hour = self.clock.hour,
            season = ?season,
            rain = ?self.weather.intensity,
            temperature = self.air_temperature,
            moisture_mean = self.moisture.mean(),
            nutrients_mean = self.nutrients.mean(),
            infested = self.pests.infested_count(),
            "field stepped"
        );
    }

    fn oob(&self, pos: GridPos) -> FieldError {
        FieldError::OutOfBounds { pos, rows: self.size.rows, cols: self.size.cols }
    }

    fn zone_cells(&self, zone: Zone) -> Result<Vec<GridPos>, FieldError> {
        let cells = zone.cells(self.size);
        if cells.is_empty() {
            return Err(FieldError::EmptyZone {
                zone,
                rows: self.size.rows,
                cols: self.size.cols,
            });
        }
        Ok(cells)
    }

    /// Mean soil state over the in-bounds cells of a zone.
    pub fn soil_reading(&self, zone: Zone) -> Result<SoilReading, FieldError> {
        let cells = self.zone_cells(zone)?;
        #[allow(clippy::cast_precision_loss)]
        let count = cells.len() as f64;
        let moisture: f64 = cells.iter().filter_map(|c| self.moisture.get(*c)).sum();
        let nutrients: f64 = cells.iter().filter_map(|c| self.nutrients.get(*c)).sum();
        Ok(SoilReading {
            temperature: self.air_temperature,
            nutrients: nutrients / count,
            moisture: moisture / count,
        })
    }

    /// Crop and pest observation of a single cell.
    pub fn drone_reading(&self, pos: GridPos) -> Result<DroneReading, FieldError> {
        let cell = self.crops.get(pos).ok_or_else(|| self.oob(pos))?;
        Ok(DroneReading {
            crop_stage: cell.stage,
            crop_kind: cell.kind,
            pest_present: self.pests.is_infested(pos),
        })
    }

    /// Soil moisture at a single cell, percent.
    pub fn moisture_at(&self, pos: GridPos) -> Result<f64, FieldError> {
        self.moisture.get(pos).ok_or_else(|| self.oob(pos))
    }

    /// Soil nutrients at a single cell, percent.
    pub fn nutrients_at(&self, pos: GridPos) -> Result<f64, FieldError> {
        self.nutrients.get(pos).ok_or_else(|| self.oob(pos))
    }

    /// Add irrigation water to every in-bounds cell of a zone.
    pub fn apply_irrigation(&mut self, zone: Zone, dose_mm: f64) -> Result<(), FieldError> {
        let cells = self.zone_cells(zone)?;
        for pos in cells {
            if let Ok(current) = self.moisture_at(pos) {
                self.moisture
                    .set(pos, (current + dose_mm.max(0.0) * MM_TO_PCT).clamp(0.0, 100.0));
            }
        }
        Ok(())
    }

    /// Add fertilizer to every in-bounds cell of a zone.
    pub fn apply_fertilizer(&mut self, zone: Zone, dose: f64) -> Result<(), FieldError> {
        let cells = self.zone_cells(zone)?;
        for pos in cells {
            if let Ok(current) = self.nutrients_at(pos) {
                self.nutrients.set(pos, (current + dose.max(0.0)).clamp(0.0, 100.0));
            }
        }
        Ok(())
    }

    /// Treat a cell with pesticide. The cell is always cleared; each of its
    /// neighbours is cleared with a fixed probability.
    pub fn apply_pesticide<R: Rng + ?Sized>(
        &mut self,
        pos: GridPos,
        rng: &mut R,
    ) -> Result<(), FieldError> {
        if !self.size.contains(pos) {
            return Err(self.oob(pos));
        }
        self.pests.apply_pesticide(pos, rng);
        Ok(())
    }

    /// Sow a crop into a cell, replacing whatever grows there.
    pub fn plant_seed(&mut self, pos: GridPos, kind: CropKind) -> Result<(), FieldError> {
        self.crops.plant(pos, kind)
    }

    /// Harvest a mature cell, returning the crop kind and yield amount.
    pub fn harvest(&mut self, pos: GridPos) -> Result<(CropKind, f64), FieldError> {
        self.crops.harvest(pos)
    }

    /// Force rain at an intensity for a duration (external forcing).
    pub const fn apply_rain(&mut self, intensity: RainIntensity, duration_hours: f64) {
        self.weather.force(intensity, duration_hours);
    }

    /// Stop any rain immediately (external forcing).
    pub const fn stop_rain(&mut self) {
        self.weather.stop();
    }

    /// Flip the drought flag (external forcing). Returns the new state.
    pub const fn toggle_drought(&mut self) -> bool {
        self.weather.drought = !self.weather.drought;
        self.weather.drought
    }

    /// Seed a pest infestation at a uniformly random cell and activate
    /// spread (external forcing). Returns the infested cell.
    pub fn apply_pest<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<GridPos> {
        if self.size.rows == 0 || self.size.cols == 0 {
            return None;
        }
        let pos = GridPos::new(
            rng.random_range(0..self.size.rows),
            rng.random_range(0..self.size.cols),
        );
        self.pests.infest(pos);
        Some(pos)
    }

    /// Seed a pest infestation at a specific cell (external forcing).
    pub fn infest(&mut self, pos: GridPos) -> Result<(), FieldError> {
        if !self.size.contains(pos) {
            return Err(self.oob(pos));
        }
        self.pests.infest(pos);
        Ok(())
    }

    /// Clear every pest infestation and deactivate spread (external
    /// forcing).
    pub fn remove_pest(&mut self) {
        self.pests.clear_all();
    }
}

//! Shared field state and the environment interface.
//!
//! The field sits behind an async `RwLock`: the tick runner is the single
//! writer per tick, agents take read snapshots or short write locks for
//! interventions. Every call returns a uniform [`EnvResponse`] envelope so
//! agent code handles success and failure the same way everywhere.

use std::sync::{Arc, Mutex};

use agrimesh_field::Field;
use agrimesh_types::{CropKind, EnvResponse, GridPos, GridSize, RainIntensity, Zone};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::warn;

/// Cloneable handle to the shared field.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    field: Arc<RwLock<Field>>,
    rng: Arc<Mutex<StdRng>>,
}

impl FieldHandle {
    /// Wrap a field with a seeded random source.
    pub fn new(field: Field, seed: u64) -> Self {
        Self {
            field: Arc::new(RwLock::new(field)),
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> Option<T> {
        match self.rng.lock() {
            Ok(mut rng) => Some(f(&mut rng)),
            Err(_) => {
                warn!("field rng poisoned");
                None
            }
        }
    }

    /// Advance the field by `dt` model hours. Called by the tick runner.
    pub async fn step(&self, dt: f64) {
        let mut field = self.field.write().await;
        self.with_rng(|rng| field.step(dt, rng));
    }

    /// Current simulation day, hour, and rain intensity.
    pub async fn clock_info(&self) -> EnvResponse {
        let field = self.field.read().await;
        let clock = field.clock();
        EnvResponse::ok_with(json!({
            "day": clock.day,
            "hour": clock.hour,
            "season": clock.season(),
            "rain": field.weather().intensity,
            "temperature": field.air_temperature(),
        }))
    }

    /// Mean soil state over a zone.
    pub async fn soil_reading(&self, zone: Zone) -> EnvResponse {
        let field = self.field.read().await;
        match field.soil_reading(zone) {
            Ok(reading) => EnvResponse::ok_with(json!(reading)),
            Err(err) => EnvResponse::err(err.to_string()),
        }
    }

    /// Crop and pest observation of one cell.
    pub async fn drone_reading(&self, pos: GridPos) -> EnvResponse {
        let field = self.field.read().await;
        match field.drone_reading(pos) {
            Ok(reading) => EnvResponse::ok_with(json!(reading)),
            Err(err) => EnvResponse::err(err.to_string()),
        }
    }

    /// Irrigate a zone with a dose in millimetres.
    pub async fn irrigate(&self, zone: Zone, dose_mm: f64) -> EnvResponse {
        let mut field = self.field.write().await;
        match field.apply_irrigation(zone, dose_mm) {
            Ok(()) => EnvResponse::ok(),
            Err(err) => EnvResponse::err(err.to_string()),
        }
    }

    /// Fertilize a zone with a dose in nutrient points.
    pub async fn fertilize(&self, zone: Zone, dose: f64) -> EnvResponse {
        let mut field = self.field.write().await;
        match field.apply_fertilizer(zone, dose) {
            Ok(()) => EnvResponse::ok(),
            Err(err) => EnvResponse::err(err.to_string()),
        }
    }

    /// Treat a cell with pesticide.
    pub async fn pesticide(&self, pos: GridPos) -> EnvResponse {
        let mut field = self.field.write().await;
        let outcome = self.with_rng(|rng| field.apply_pesticide(pos, rng));
        match outcome {
            Some(Ok(())) => EnvResponse::ok(),
            Some(Err(err)) => EnvResponse::err(err.to_string()),
            None => EnvResponse::err("random source unavailable"),
        }
    }

    /// Sow a crop into a cell, replacing whatever grows there.
    pub async fn plant(&self, pos: GridPos, kind: CropKind) -> EnvResponse {
        let mut field = self.field.write().await;
        match field.plant_seed(pos, kind) {
            Ok(()) => EnvResponse::ok(),
            Err(err) => EnvResponse::err(err.to_string()),
        }
    }

    /// Harvest a mature cell, returning the crop and yield in the payload.
    pub async fn harvest(&self, pos: GridPos) -> EnvResponse {
        let mut field = self.field.write().await;
        match field.harvest(pos) {
            Ok((kind, amount)) => {
                EnvResponse::ok_with(json!({ "seed_type": kind, "amount": amount }))
            }
            Err(err) => EnvResponse::err(err.to_string()),
        }
    }

    /// Harvest every mature cell of a zone.
    ///
    /// The payload lists the collected lots. Zero mature cells is reported
    /// as an error so the executor can fail the round.
    pub async fn harvest_zone(&self, zone: Zone) -> EnvResponse {
        let mut field = self.field.write().await;
        let cells = zone.cells(field.size());
        if cells.is_empty() {
            return EnvResponse::err(format!("zone {zone} has no cells inside the grid"));
        }
        let mut lots: Vec<serde_json::Value> = Vec::new();
        for pos in cells {
            if let Ok((kind, amount)) = field.harvest(pos) {
                lots.push(json!({ "seed_type": kind, "amount": amount }));
            }
        }
        if lots.is_empty() {
            return EnvResponse::err(format!("zone {zone} has no mature cells"));
        }
        EnvResponse::ok_with(json!({ "lots": lots }))
    }

    /// Sow a crop into every cell of a zone, replacing whatever grows
    /// there. The payload reports how many cells were planted.
    pub async fn plant_zone(&self, zone: Zone, kind: CropKind) -> EnvResponse {
        let mut field = self.field.write().await;
        let cells = zone.cells(field.size());
        if cells.is_empty() {
            return EnvResponse::err(format!("zone {zone} has no cells inside the grid"));
        }
        let mut planted = 0_u32;
        for pos in cells {
            if field.plant_seed(pos, kind).is_ok() {
                planted = planted.saturating_add(1);
            }
        }
        EnvResponse::ok_with(json!({ "planted": planted }))
    }

    /// Grid dimensions.
    pub async fn grid_size(&self) -> GridSize {
        self.field.read().await.size()
    }

    /// Force rain at an intensity for a duration in hours.
    pub async fn apply_rain(&self, intensity: RainIntensity, duration_hours: f64) -> EnvResponse {
        let mut field = self.field.write().await;
        field.apply_rain(intensity, duration_hours);
        EnvResponse::ok()
    }

    /// Stop any rain immediately.
    pub async fn stop_rain(&self) -> EnvResponse {
        let mut field = self.field.write().await;
        field.stop_rain();
        EnvResponse::ok()
    }

    /// Flip the drought flag, reporting the new state.
    pub async fn toggle_drought(&self) -> EnvResponse {
        let mut field = self.field.write().await;
        let drought = field.toggle_drought();
        EnvResponse::ok_with(json!({ "drought": drought }))
    }

    /// Seed a pest infestation at a random cell and activate spread.
    pub async fn apply_pest(&self) -> EnvResponse {
        let mut field = self.field.write().await;
        let infested = self.with_rng(|rng| field.apply_pest(rng)).flatten();
        match infested {
            Some(pos) => EnvResponse::ok_with(json!({ "infested": pos })),
            None => EnvResponse::err("no cell available to infest"),
        }
    }

    /// Clear every pest infestation and deactivate spread.
    pub async fn remove_pest(&self) -> EnvResponse {
        let mut field = self.field.write().await;
        field.remove_pest();
        EnvResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimesh_types::GridSize;

    fn handle() -> FieldHandle {
        FieldHandle::new(Field::new(GridSize::new(3, 3), 60.0, 70.0), 1)
    }

    #[tokio::test]
    async fn readings_come_back_as_success_payloads() {
        let h = handle();
        let response = h.soil_reading(Zone::Cell { pos: GridPos::new(0, 0) }).await;
        assert!(response.is_success());
        let moisture = response
            .data
            .as_ref()
            .and_then(|d| d.get("moisture"))
            .and_then(serde_json::Value::as_f64);
        assert_eq!(moisture, Some(60.0));
    }

    #[tokio::test]
    async fn out_of_bounds_is_an_error_envelope() {
        let h = handle();
        let response = h.drone_reading(GridPos::new(9, 9)).await;
        assert!(!response.is_success());
        assert!(response.message.is_some());
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn irrigation_is_visible_in_the_next_reading() {
        let h = handle();
        let zone = Zone::Cell { pos: GridPos::new(1, 1) };
        assert!(h.irrigate(zone, 40.0).await.is_success());
        let response = h.soil_reading(zone).await;
        let moisture = response
            .data
            .as_ref()
            .and_then(|d| d.get("moisture"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);
        assert_eq!(moisture, 70.0);
    }

    #[tokio::test]
    async fn harvest_on_empty_cell_reports_the_failure() {
        let h = handle();
        let response = h.harvest(GridPos::new(0, 0)).await;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn replanting_a_zone_overwrites_existing_crops() {
        let h = handle();
        let zone = Zone::Column { col: 0 };
        assert!(h.plant_zone(zone, CropKind::Wheat).await.is_success());
        let again = h.plant_zone(zone, CropKind::Carrot).await;
        assert!(again.is_success());
        let planted = again
            .data
            .as_ref()
            .and_then(|d| d.get("planted"))
            .and_then(serde_json::Value::as_u64);
        assert_eq!(planted, Some(3));
    }

    #[tokio::test]
    async fn dynamic_event_controls_answer_with_envelopes() {
        let h = handle();
        let toggled = h.toggle_drought().await;
        let drought = toggled
            .data
            .as_ref()
            .and_then(|d| d.get("drought"))
            .and_then(serde_json::Value::as_bool);
        assert_eq!(drought, Some(true));

        let infested = h.apply_pest().await;
        assert!(infested.is_success());
        assert!(infested.data.is_some());
        assert!(h.remove_pest().await.is_success());
    }
}

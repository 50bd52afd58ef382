//! Soil nutrient pass: crop uptake, mineralization, pest losses, and
//! lateral diffusion.

use agrimesh_types::GridPos;

use crate::crop::{self, CropGrid};
use crate::grid::ScalarGrid;
use crate::params::{
    DIFFUSION_COEF_NUTRIENTS, MINERAL_BASE, NUTRIENT_CONCENTRATION_FACTOR, PEST_LOSS_RATE,
};
use crate::pest::PestGrid;

/// Advance the nutrient layer by `dt` hours.
pub fn step(
    nutrients: &mut ScalarGrid,
    moisture: &ScalarGrid,
    crops: &CropGrid,
    pests: &PestGrid,
    temperature: f64,
    drought: bool,
    dt: f64,
) {
    let size = nutrients.size();

    for row in 0..size.rows {
        for col in 0..size.cols {
            let pos = GridPos::new(row, col);
            let Some(mut n) = nutrients.get(pos) else { continue };
            let m = moisture.get(pos).unwrap_or(0.0);

            let uptake = uptake_for(crops, pos, m, temperature, drought, dt);
            n -= uptake.min(n);

            n += mineralization(m, temperature, dt);
            n -= PEST_LOSS_RATE * pests.load(pos) * dt * n;

            nutrients.set(pos, n);
        }
    }

    diffuse(nutrients, dt);
    nutrients.clamp_all(0.0, 100.0);
}

fn uptake_for(
    crops: &CropGrid,
    pos: GridPos,
    moisture: f64,
    temperature: f64,
    drought: bool,
    dt: f64,
) -> f64 {
    let Some(cell) = crops.get(pos).filter(|c| c.is_planted()) else {
        return 0.0;
    };
    let Some(kind) = cell.kind else {
        return 0.0;
    };
    let water_rate = crop::uptake_rate(kind, cell.stage);
    let drought_factor = if drought { 0.8 } else { 1.0 };
    water_rate
        * NUTRIENT_CONCENTRATION_FACTOR
        * dt
        * crop::moisture_stress(kind, moisture)
        * uptake_temperature_bell(temperature)
        * drought_factor
}

/// Temperature suitability bell for root activity, floored at 0.1.
fn uptake_temperature_bell(temperature: f64) -> f64 {
    (((temperature - 5.0) * (45.0 - temperature)) / 400.0)
        .clamp(0.0, 1.0)
        .max(0.1)
}

/// Microbial mineralization: moist, warm soil releases nutrients.
fn mineralization(moisture: f64, temperature: f64, dt: f64) -> f64 {
    let moisture_term = ((moisture - 40.0) / 40.0).clamp(0.0, 1.0);
    let temp_term = (((temperature - 5.0) * (55.0 - temperature)) / 625.0).clamp(0.0, 1.0);
    MINERAL_BASE * moisture_term * temp_term * dt
}

fn diffuse(layer: &mut ScalarGrid, dt: f64) {
    let snapshot = layer.clone();
    for (pos, value) in snapshot.iter() {
        if let Some(mean) = snapshot.neighbor_mean(pos) {
            layer.set(pos, value + DIFFUSION_COEF_NUTRIENTS * dt * (mean - value));
        }
    }
}

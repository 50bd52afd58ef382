//! Soil moisture pass: rain accumulation, evaporation, crop uptake,
//! lateral diffusion, and over-capacity drainage with nutrient leaching.

use agrimesh_types::GridPos;
use rand::Rng;

use crate::crop::{self, CropGrid};
use crate::grid::ScalarGrid;
use crate::params::{
    DIFFUSION_COEF_MOISTURE, EVAP_BASE_COEFF, EVAP_TEMP_THRESHOLD, FIELD_CAPACITY, LEACH_COEFF,
    MM_TO_PCT, RAIN_NOISE,
};
use crate::stochastic;

/// Advance the moisture layer by `dt` hours.
///
/// Drainage above field capacity also washes nutrients out of the cell, so
/// the nutrient layer is mutated here as well.
pub fn step<R: Rng + ?Sized>(
    moisture: &mut ScalarGrid,
    nutrients: &mut ScalarGrid,
    crops: &CropGrid,
    temperature: f64,
    rain_mm: f64,
    dt: f64,
    rng: &mut R,
) {
    let size = moisture.size();

    for row in 0..size.rows {
        for col in 0..size.cols {
            let pos = GridPos::new(row, col);
            let Some(mut m) = moisture.get(pos) else { continue };

            // Rain lands with small per-cell variation.
            if rain_mm > 0.0 {
                let noise = 1.0 + stochastic::normal(rng, 0.0, RAIN_NOISE);
                m += rain_mm * MM_TO_PCT * noise.max(0.0);
            }

            let evap = EVAP_BASE_COEFF
                * (temperature - EVAP_TEMP_THRESHOLD).max(0.0)
                * dt
                * MM_TO_PCT
                * (m / 100.0);
            m -= evap;

            if let Some(cell) = crops.get(pos).filter(|c| c.is_planted()) {
                if let Some(kind) = cell.kind {
                    let rate = crop::uptake_rate(kind, cell.stage);
                    let demand_factor = 1.0 + 0.03 * (temperature - 20.0);
                    let stress = crop::moisture_stress(kind, m);
                    let uptake = (rate * dt * demand_factor.max(0.0) * MM_TO_PCT * stress).min(m);
                    m -= uptake.max(0.0);
                }
            }

            moisture.set(pos, m);
        }
    }

    diffuse(moisture, dt);

    for row in 0..size.rows {
        for col in 0..size.cols {
            let pos = GridPos::new(row, col);
            let Some(mut m) = moisture.get(pos) else { continue };
            if m > FIELD_CAPACITY {
                let lost = (m - FIELD_CAPACITY) * LEACH_COEFF;
                m -= lost;
                if let Some(n) = nutrients.get(pos) {
                    nutrients.set(pos, n - n * (lost / 100.0));
                }
            }
            moisture.set(pos, m);
        }
    }

    moisture.clamp_all(0.0, 100.0);
}

/// Snapshot-based lateral diffusion toward the local neighbour mean.
fn diffuse(layer: &mut ScalarGrid, dt: f64) {
    let snapshot = layer.clone();
    for (pos, value) in snapshot.iter() {
        if let Some(mean) = snapshot.neighbor_mean(pos) {
            layer.set(pos, value + DIFFUSION_COEF_MOISTURE * dt * (mean - value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimesh_types::GridSize;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SIZE: GridSize = GridSize::new(3, 3);

    fn levels(grid: &ScalarGrid) -> Vec<f64> {
        grid.iter().map(|(_, v)| v).collect()
    }

    #[test]
    fn rain_raises_moisture() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut moisture = ScalarGrid::new(SIZE, 40.0);
        let mut nutrients = ScalarGrid::new(SIZE, 50.0);
        let crops = CropGrid::new(SIZE);
        step(&mut moisture, &mut nutrients, &crops, 20.0, 5.0, 1.0, &mut rng);
        assert!(levels(&moisture).iter().all(|m| *m > 40.0));
    }

    #[test]
    fn heat_dries_the_soil() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut moisture = ScalarGrid::new(SIZE, 60.0);
        let mut nutrients = ScalarGrid::new(SIZE, 50.0);
        let crops = CropGrid::new(SIZE);
        for _ in 0..24 {
            step(&mut moisture, &mut nutrients, &crops, 35.0, 0.0, 1.0, &mut rng);
        }
        assert!(levels(&moisture).iter().all(|m| *m < 60.0));
    }

    #[test]
    fn no_evaporation_below_threshold() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut moisture = ScalarGrid::new(SIZE, 60.0);
        let mut nutrients = ScalarGrid::new(SIZE, 50.0);
        let crops = CropGrid::new(SIZE);
        step(&mut moisture, &mut nutrients, &crops, 2.0, 0.0, 1.0, &mut rng);
        assert!(levels(&moisture).iter().all(|m| (*m - 60.0).abs() < 1e-9));
    }

    #[test]
    fn diffusion_evens_out_a_wet_cell() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut moisture = ScalarGrid::new(SIZE, 30.0);
        moisture.set(GridPos::new(1, 1), 80.0);
        let mut nutrients = ScalarGrid::new(SIZE, 50.0);
        let crops = CropGrid::new(SIZE);
        for _ in 0..12 {
            step(&mut moisture, &mut nutrients, &crops, 10.0, 0.0, 1.0, &mut rng);
        }
        let center = moisture.get(GridPos::new(1, 1)).unwrap_or(0.0);
        let corner = moisture.get(GridPos::new(0, 0)).unwrap_or(0.0);
        assert!(center < 80.0);
        assert!(corner > 30.0);
        assert!(center - corner < 50.0 - 1.0);
    }

    #[test]
    fn over_capacity_drains_and_leaches_nutrients() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut moisture = ScalarGrid::new(SIZE, 100.0);
        let mut nutrients = ScalarGrid::new(SIZE, 80.0);
        let crops = CropGrid::new(SIZE);
        step(&mut moisture, &mut nutrients, &crops, 10.0, 0.0, 1.0, &mut rng);
        assert!(levels(&moisture).iter().all(|m| *m < 100.0));
        assert!(levels(&nutrients).iter().all(|n| *n < 80.0));
    }

    #[test]
    fn values_stay_clamped() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut moisture = ScalarGrid::new(SIZE, 95.0);
        let mut nutrients = ScalarGrid::new(SIZE, 50.0);
        let crops = CropGrid::new(SIZE);
        for _ in 0..100 {
            step(&mut moisture, &mut nutrients, &crops, 25.0, 5.0, 1.0, &mut rng);
        }
        assert!(levels(&moisture).iter().all(|m| (0.0..=100.0).contains(m)));
    }
}

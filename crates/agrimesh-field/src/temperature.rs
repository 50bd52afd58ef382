//! Diurnal and seasonal air temperature model.
//!
//! A sinusoidal annual mean, an astronomical day length at a fixed
//! mid-latitude, and a three-phase diurnal curve: sinusoidal warming from
//! sunrise to mid-afternoon, cosine cooling until sunset, then exponential
//! decay through the night. A small Gaussian jitter sits on top.

use rand::Rng;

use crate::stochastic;

const LATITUDE_DEG: f64 = 40.0;
const AXIAL_TILT_DEG: f64 = 23.44;
const PEAK_HOUR: f64 = 14.5;
const NIGHT_DECAY_HOURS: f64 = 5.0;
const NOISE_STD_DEV: f64 = 0.3;

/// Air temperature in degrees Celsius at a given day of year and hour.
pub fn air_temperature<R: Rng + ?Sized>(day: u32, hour: f64, rng: &mut R) -> f64 {
    deterministic_temperature(day, hour) + stochastic::normal(rng, 0.0, NOISE_STD_DEV)
}

/// The noise-free diurnal temperature curve.
pub fn deterministic_temperature(day: u32, hour: f64) -> f64 {
    let day = f64::from(day);
    let t_mean = 15.0 + 10.0 * (core::f64::consts::TAU * (day - 110.0) / 365.0).sin();
    let t_min = t_mean - 5.0;
    let t_max = t_mean + 8.0;
    let (sunrise, sunset) = daylight_window(day);
    let t_sunset = t_min + 0.3 * (t_max - t_min);

    if hour >= sunrise && hour <= PEAK_HOUR {
        let span = (PEAK_HOUR - sunrise).max(f64::EPSILON);
        let h_norm = (hour - sunrise) / span;
        t_min + (t_max - t_min) * (core::f64::consts::FRAC_PI_2 * h_norm).sin()
    } else if hour > PEAK_HOUR && hour <= sunset {
        let span = (sunset - PEAK_HOUR).max(f64::EPSILON);
        let h_norm = (hour - PEAK_HOUR) / span;
        t_sunset + (t_max - t_sunset) * (core::f64::consts::FRAC_PI_2 * h_norm).cos()
    } else {
        let elapsed = if hour > sunset { hour - sunset } else { hour + 24.0 - sunset };
        t_min + (t_sunset - t_min) * (-elapsed / NIGHT_DECAY_HOURS).exp()
    }
}

/// Sunrise and sunset hours for a day of year, from the sunset equation.
fn daylight_window(day: f64) -> (f64, f64) {
    let declination =
        AXIAL_TILT_DEG.to_radians() * (core::f64::consts::TAU * (day - 80.0) / 365.0).sin();
    let latitude = LATITUDE_DEG.to_radians();
    let cos_hour_angle = (-latitude.tan() * declination.tan()).clamp(-1.0, 1.0);
    let half_day_hours = cos_hour_angle.acos().to_degrees() / 15.0;
    (12.0 - half_day_hours, 12.0 + half_day_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn summer_days_are_longer_than_winter_days() {
        let (summer_rise, summer_set) = daylight_window(172.0);
        let (winter_rise, winter_set) = daylight_window(355.0);
        assert!(summer_set - summer_rise > 13.0);
        assert!(winter_set - winter_rise < 11.0);
    }

    #[test]
    fn afternoon_is_warmer_than_night() {
        let noon = deterministic_temperature(200, 14.5);
        let night = deterministic_temperature(200, 3.0);
        assert!(noon > night + 5.0, "noon {noon}, night {night}");
    }

    #[test]
    fn july_is_warmer_than_january() {
        let july = deterministic_temperature(190, 14.0);
        let january = deterministic_temperature(15, 14.0);
        assert!(july > january + 10.0, "july {july}, january {january}");
    }

    #[test]
    fn curve_is_continuous_at_peak_hour() {
        let before = deterministic_temperature(120, PEAK_HOUR - 1e-6);
        let after = deterministic_temperature(120, PEAK_HOUR + 1e-6);
        assert!((before - after).abs() < 0.01);
    }

    #[test]
    fn noise_stays_small() {
        let mut rng = StdRng::seed_from_u64(2);
        let base = deterministic_temperature(100, 12.0);
        for _ in 0..200 {
            let noisy = air_temperature(100, 12.0, &mut rng);
            assert!((noisy - base).abs() < 2.0);
        }
    }
}

//! Precipitation model: a 4-state rain intensity machine with seasonal
//! entry distributions, exponential episode durations, Markov intensity
//! hops, and a drought mode that suppresses rain.

use agrimesh_types::{RainIntensity, Season};
use rand::Rng;

use crate::params::{
    DROUGHT_DURATION_FACTOR, DROUGHT_PROB_MOD, EXTREME_OVERRIDE_PROB, P_CHANGE_INTENSITY_PER_HOUR,
    P_STOP_EARLY_PER_HOUR, RAIN_MM_PER_HOUR, intensity_transition_row, mean_duration_hours,
    season_entry_probs,
};
use crate::stochastic;

/// Current precipitation state of the whole field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    /// Current rain intensity.
    pub intensity: RainIntensity,
    /// Model hours until the current episode is reconsidered.
    pub remaining_hours: f64,
    /// Whether drought forcing is active.
    pub drought: bool,
}

impl Default for Weather {
    fn default() -> Self {
        Self::new()
    }
}

impl Weather {
    /// Start dry, due for an immediate episode draw on the first step.
    pub const fn new() -> Self {
        Self { intensity: RainIntensity::Dry, remaining_hours: 0.0, drought: false }
    }

    /// Current rain rate in millimetres per hour.
    pub fn rain_mm_per_hour(&self) -> f64 {
        RAIN_MM_PER_HOUR
            .get(self.intensity.index())
            .copied()
            .unwrap_or(0.0)
    }

    /// Advance the episode clock by `dt` hours and resolve transitions.
    pub fn step<R: Rng + ?Sized>(&mut self, season: Season, dt: f64, rng: &mut R) {
        self.remaining_hours -= dt;

        if self.intensity.is_raining() {
            let mut p_stop = P_STOP_EARLY_PER_HOUR * dt;
            if self.drought {
                p_stop *= 2.0;
            }
            if self.remaining_hours <= 0.0 || rng.random_bool(p_stop.clamp(0.0, 1.0)) {
                self.enter(RainIntensity::Dry, season, rng);
                return;
            }
            if rng.random_bool((P_CHANGE_INTENSITY_PER_HOUR * dt).clamp(0.0, 1.0)) {
                let row = intensity_transition_row(season, self.intensity);
                let next = RainIntensity::from_index(stochastic::categorical(rng, &row));
                if next != self.intensity {
                    self.enter(next, season, rng);
                }
            }
            return;
        }

        if self.remaining_hours <= 0.0 {
            let mut probs = season_entry_probs(season);
            if self.drought {
                for (p, modifier) in probs.iter_mut().zip(DROUGHT_PROB_MOD) {
                    *p *= modifier;
                }
            }
            let next = RainIntensity::from_index(stochastic::categorical(rng, &probs));
            self.enter(next, season, rng);
        }

        // Rare convective burst: summer can jump straight to heavy rain.
        if season == Season::Summer && rng.random_bool(EXTREME_OVERRIDE_PROB) {
            self.enter(RainIntensity::Heavy, season, rng);
        }
    }

    /// Force an intensity for a fixed duration (external forcing).
    pub const fn force(&mut self, intensity: RainIntensity, duration_hours: f64) {
        self.intensity = intensity;
        self.remaining_hours = duration_hours;
    }

    /// Stop any rain immediately.
    pub const fn stop(&mut self) {
        self.intensity = RainIntensity::Dry;
        self.remaining_hours = 0.0;
    }

    /// Switch drought forcing on or off.
    pub const fn set_drought(&mut self, active: bool) {
        self.drought = active;
    }

    fn enter<R: Rng + ?Sized>(&mut self, intensity: RainIntensity, season: Season, rng: &mut R) {
        let mut mean = mean_duration_hours(season, intensity);
        let floor = if self.drought && intensity.is_raining() {
            mean /= DROUGHT_DURATION_FACTOR;
            0.5
        } else {
            1.0
        };
        self.intensity = intensity;
        self.remaining_hours = stochastic::exponential(rng, mean).max(floor);
    }
}

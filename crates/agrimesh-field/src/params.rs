//! Calibration constants for the field dynamics.
//!
//! All per-hour coefficients are scaled by the tick length at the point of
//! use, so the tables here stay valid for any `dt`. Crop tables are indexed
//! by [`CropKind::index`] (0 = tomato .. 5 = carrot); stage tables by growth
//! stage starting at seed.
//!
//! [`CropKind::index`]: agrimesh_types::CropKind::index

use agrimesh_types::{RainIntensity, Season};

/// Simulation tick length in model hours.
pub const TICK_HOURS: f64 = 1.0;

/// Default grid rows.
pub const DEFAULT_ROWS: usize = 3;
/// Default grid columns.
pub const DEFAULT_COLS: usize = 3;

/// Day of year the simulation clock starts at (early July).
pub const INITIAL_DAY: u32 = 183;
/// Hour of day the simulation clock starts at.
pub const INITIAL_HOUR: f64 = 10.0;

/// Conversion from millimetres of water to percent of soil saturation.
pub const MM_TO_PCT: f64 = 0.25;

/// Base evaporation coefficient, fraction per hour at reference conditions.
pub const EVAP_BASE_COEFF: f64 = 0.05;
/// Air temperature below which no evaporation occurs, degrees Celsius.
pub const EVAP_TEMP_THRESHOLD: f64 = 5.0;

/// Lateral moisture diffusion coefficient, per hour.
pub const DIFFUSION_COEF_MOISTURE: f64 = 0.12;
/// Moisture level above which water drains and leaches nutrients, percent.
pub const FIELD_CAPACITY: f64 = 90.0;
/// Fraction of over-capacity water lost to drainage per hour.
pub const LEACH_COEFF: f64 = 0.2;
/// Relative standard deviation of per-cell rain accumulation noise.
pub const RAIN_NOISE: f64 = 0.05;

/// Base nutrient mineralization rate, percent points per hour.
pub const MINERAL_BASE: f64 = 0.005;
/// Lateral nutrient diffusion coefficient, per hour.
pub const DIFFUSION_COEF_NUTRIENTS: f64 = 0.06;
/// Fraction of cell nutrients consumed per hour per unit of pest load.
pub const PEST_LOSS_RATE: f64 = 0.02;
/// Nutrient uptake per unit of water uptake.
pub const NUTRIENT_CONCENTRATION_FACTOR: f64 = 0.1;

/// Per-neighbour pest infection probability per tick.
pub const P_SPREAD: f64 = 0.1;
/// Probability that pesticide clears each neighbour of the treated cell.
pub const PESTICIDE_NEIGHBOR_EFFECT: f64 = 0.75;
/// Health loss on infected cells, percent points per hour.
pub const PEST_DAMAGE_PER_HOUR: f64 = 2.0;

/// Rain rate by intensity state, millimetres per hour.
pub const RAIN_MM_PER_HOUR: [f64; 4] = [0.0, 1.0, 3.0, 5.0];

/// Multipliers applied to the rain entry distribution during drought.
pub const DROUGHT_PROB_MOD: [f64; 4] = [1.0, 0.15, 0.001, 0.000_1];
/// Divisor applied to rain episode durations during drought.
pub const DROUGHT_DURATION_FACTOR: f64 = 4.0;

/// Per-hour probability of a Markov intensity hop while raining.
pub const P_CHANGE_INTENSITY_PER_HOUR: f64 = 0.08;
/// Per-hour probability of a rain episode ending before its sampled duration.
pub const P_STOP_EARLY_PER_HOUR: f64 = 0.02;
/// Per-tick probability of a summer extreme-weather override to heavy rain.
pub const EXTREME_OVERRIDE_PROB: f64 = 0.000_1;

/// Entry distribution over rain intensities when a dry spell ends.
pub const fn season_entry_probs(season: Season) -> [f64; 4] {
    match season {
        Season::Summer => [0.60, 0.35, 0.045, 0.005],
        Season::Spring | Season::Autumn => [0.30, 0.45, 0.20, 0.05],
        Season::Winter => [0.15, 0.35, 0.30, 0.20],
    }
}

/// Mean episode duration in hours for a given season and intensity.
pub const fn mean_duration_hours(season: Season, intensity: RainIntensity) -> f64 {
    match season {
        Season::Summer => match intensity {
            RainIntensity::Dry => 72.0,
            RainIntensity::Light => 2.0,
            RainIntensity::Moderate => 4.0,
            RainIntensity::Heavy => 8.0,
        },
        Season::Spring | Season::Autumn => match intensity {
            RainIntensity::Dry => 36.0,
            RainIntensity::Light => 3.0,
            RainIntensity::Moderate => 6.0,
            RainIntensity::Heavy => 10.0,
        },
        Season::Winter => match intensity {
            RainIntensity::Dry => 24.0,
            RainIntensity::Light => 6.0,
            RainIntensity::Moderate => 12.0,
            RainIntensity::Heavy => 24.0,
        },
    }
}

/// Markov transition row for an intensity hop while raining.
///
/// Rows are distributions over the destination states `[dry, light,
/// moderate, heavy]`. The dry state never hops, so its row is degenerate.
pub const fn intensity_transition_row(season: Season, intensity: RainIntensity) -> [f64; 4] {
    match season {
        Season::Summer => match intensity {
            RainIntensity::Dry => [1.0, 0.0, 0.0, 0.0],
            RainIntensity::Light => [0.10, 0.70, 0.15, 0.05],
            RainIntensity::Moderate => [0.05, 0.15, 0.70, 0.10],
            RainIntensity::Heavy => [0.02, 0.10, 0.20, 0.68],
        },
        Season::Spring | Season::Autumn => match intensity {
            RainIntensity::Dry => [1.0, 0.0, 0.0, 0.0],
            RainIntensity::Light => [0.05, 0.75, 0.15, 0.05],
            RainIntensity::Moderate => [0.02, 0.10, 0.78, 0.10],
            RainIntensity::Heavy => [0.01, 0.05, 0.15, 0.79],
        },
        Season::Winter => match intensity {
            RainIntensity::Dry => [1.0, 0.0, 0.0, 0.0],
            RainIntensity::Light => [0.02, 0.80, 0.15, 0.03],
            RainIntensity::Moderate => [0.01, 0.05, 0.84, 0.10],
            RainIntensity::Heavy => [0.00, 0.02, 0.08, 0.90],
        },
    }
}

/// Water uptake rates in mm/h, by growth stage (seed, germinating,
/// vegetative, mature) and crop kind.
pub const UPTAKE_RATES_MM_PER_HOUR: [[f64; 6]; 4] = [
    [0.01, 0.01, 0.01, 0.01, 0.01, 0.01],
    [0.05, 0.04, 0.03, 0.04, 0.05, 0.03],
    [0.25, 0.20, 0.15, 0.18, 0.22, 0.12],
    [0.15, 0.12, 0.10, 0.10, 0.08, 0.07],
];

/// Ideal soil moisture per crop kind, percent of saturation.
pub const IDEAL_MOISTURE_TARGET: [f64; 6] = [77.5, 77.5, 67.5, 77.5, 77.5, 72.5];

/// Moisture deviation each crop tolerates without stress, percent points.
pub const DROUGHT_TOLERANCE: [f64; 6] = [10.0, 10.0, 15.0, 12.0, 10.0, 12.0];

/// Nominal stage durations in hours per crop kind, for the seed,
/// germinating, vegetative, and mature stages.
pub const STAGE_DURATIONS_HOURS: [[f64; 4]; 6] = [
    [48.0, 72.0, 168.0, 240.0],
    [48.0, 72.0, 168.0, 240.0],
    [24.0, 48.0, 336.0, 480.0],
    [36.0, 60.0, 144.0, 192.0],
    [24.0, 48.0, 120.0, 168.0],
    [48.0, 72.0, 240.0, 336.0],
];

/// Days a mature crop keeps before it starts rotting, per crop kind.
pub const DAYS_BEFORE_ROT: [f64; 6] = [7.0, 7.0, 10.0, 5.0, 3.0, 14.0];

/// Health loss per day once a mature crop passes its keeping window.
pub const ROT_RATE: f64 = 10.0;

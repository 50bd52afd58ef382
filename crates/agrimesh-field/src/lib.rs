//! Discrete-time environment engine for the Agrimesh farm simulation.
//!
//! The field is a rectangular grid of cells carrying soil moisture, soil
//! nutrients, a pest flag, and an optional crop. Each tick advances the
//! layers in a fixed order (weather, temperature, moisture, nutrients,
//! pests, crops), with every stochastic draw routed through an injected
//! random source so seeded runs are fully reproducible.
//!
//! # Modules
//!
//! - [`params`] -- Calibration constants and seasonal tables
//! - [`weather`] -- The 4-state rain machine and drought forcing
//! - [`temperature`] -- Diurnal and seasonal air temperature
//! - [`moisture`] / [`nutrients`] -- The soil layer passes
//! - [`pest`] -- Infestation spread and pesticide treatment
//! - [`crop`] -- Growth stages, stress factors, planting and harvest
//! - [`field`] -- The [`Field`] facade tying the layers together

pub mod crop;
pub mod error;
pub mod field;
pub mod grid;
pub mod moisture;
pub mod nutrients;
pub mod params;
pub mod pest;
pub mod stochastic;
pub mod temperature;
pub mod weather;

pub use crop::{CropCell, CropGrid};
pub use error::FieldError;
pub use field::{Field, FieldClock};
pub use grid::ScalarGrid;
pub use pest::PestGrid;
pub use weather::Weather;

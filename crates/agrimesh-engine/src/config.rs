//! Simulation configuration, loadable from YAML.
//!
//! Every field has a sensible default, so a partial file (or none at all)
//! still yields a runnable simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How many executors of each mobile role to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Irrigation machines.
    pub irrigation: usize,
    /// Fertilizer spreaders.
    pub fertilizer: usize,
    /// Harvesters (also handle planting).
    pub harvester: usize,
    /// Logistics couriers.
    pub logistics: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { irrigation: 2, fertilizer: 2, harvester: 2, logistics: 1 }
    }
}

/// Starting inventory capacities for the executor roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Water tank, inventory units.
    pub water: u32,
    /// Fertilizer hopper, inventory units.
    pub fertilizer: u32,
    /// Seed box, inventory units.
    pub seeds: u32,
    /// Pesticide charges.
    pub pesticide: u32,
    /// Logistics depot stock per material.
    pub depot: u32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self { water: 200, fertilizer: 100, seeds: 50, pesticide: 20, depot: 500 }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// RNG seed; the same seed reproduces the same field trajectory.
    pub seed: u64,
    /// Wall-clock milliseconds per tick.
    pub tick_interval_ms: u64,
    /// Model hours advanced per tick.
    pub tick_hours: f64,
    /// Stop after this many ticks; `None` runs forever.
    pub max_ticks: Option<u64>,
    /// Uniform initial soil moisture, percent.
    pub initial_moisture: f64,
    /// Uniform initial soil nutrients, percent.
    pub initial_nutrients: f64,
    /// Wall-clock milliseconds between monitor scans.
    pub scan_interval_ms: u64,
    /// Battery capacity for every mobile and sensing agent, percent.
    pub battery_capacity: f64,
    /// Fleet sizes.
    pub fleet: FleetConfig,
    /// Inventory capacities.
    pub capacities: CapacityConfig,
    /// Units restocked into the logistics depot per restock cycle.
    pub depot_restock_per_cycle: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: agrimesh_field::params::DEFAULT_ROWS,
            cols: agrimesh_field::params::DEFAULT_COLS,
            seed: 0,
            tick_interval_ms: 1_000,
            tick_hours: agrimesh_field::params::TICK_HOURS,
            max_ticks: None,
            initial_moisture: 60.0,
            initial_nutrients: 70.0,
            scan_interval_ms: 5_000,
            battery_capacity: 100.0,
            fleet: FleetConfig::default(),
            capacities: CapacityConfig::default(),
            depot_restock_per_cycle: 10,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&raw).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Grid dimensions as a [`agrimesh_types::GridSize`].
    pub const fn grid_size(&self) -> agrimesh_types::GridSize {
        agrimesh_types::GridSize::new(self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_small_farm() {
        let config = SimulationConfig::default();
        assert_eq!(config.rows, 3);
        assert_eq!(config.cols, 3);
        assert_eq!(config.fleet.irrigation, 2);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: SimulationConfig =
            serde_yml::from_str("rows: 5\ncols: 4\nseed: 42\n").unwrap_or_default();
        assert_eq!(config.rows, 5);
        assert_eq!(config.cols, 4);
        assert_eq!(config.seed, 42);
        assert_eq!(config.tick_interval_ms, 1_000);
    }

    #[test]
    fn nested_sections_parse() {
        let yaml = "fleet:\n  irrigation: 1\ncapacities:\n  water: 50\n";
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap_or_default();
        assert_eq!(config.fleet.irrigation, 1);
        assert_eq!(config.fleet.fertilizer, 2);
        assert_eq!(config.capacities.water, 50);
    }
}

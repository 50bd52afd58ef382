//! Simulation binary.
//!
//! Usage: `agrimesh-engine [--config path/to/config.yaml]`. Without a
//! config file every setting falls back to its default.

use std::path::PathBuf;

use agrimesh_engine::{Simulation, SimulationConfig};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn parse_config_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match parse_config_path() {
        Some(path) => SimulationConfig::load(&path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    Simulation::new(config).run().await;
    Ok(())
}

//! Smart-farm simulation engine.
//!
//! Wires the field model, the agent fleet, and the negotiation protocol
//! into one runnable simulation: a tick loop advances the environment
//! while sensor, executor, logistics, and warehouse tasks negotiate field
//! work over the message bus.

pub mod config;
pub mod error;
pub mod roles;
pub mod runner;
pub mod shared;

pub use config::{CapacityConfig, FleetConfig, SimulationConfig};
pub use error::EngineError;
pub use runner::Simulation;
pub use shared::FieldHandle;

//! The agent tasks: one tokio task per agent, all talking over the bus.

pub mod common;
pub mod drone;
pub mod executor;
pub mod logistics;
pub mod soil_sensor;
pub mod storage;

pub use common::AgentDirectory;

//! Agent-side building blocks for the Agrimesh farm simulation.
//!
//! The pieces every role is assembled from: physical state ([`AgentState`]),
//! a capacity-capped [`Inventory`], a [`Battery`] with a low-water mark,
//! the monitoring policies that turn readings into work requests, and bid
//! construction for executors.

pub mod agent;
pub mod bidding;
pub mod energy;
pub mod error;
pub mod inventory;
pub mod monitor;

pub use agent::AgentState;
pub use bidding::{FIXED_EXECUTION_TICKS, build_proposal, eta_ticks};
pub use energy::{Battery, ENERGY_LOW_WATER};
pub use error::AgentError;
pub use inventory::{Inventory, RESOURCE_LOW_FRACTION};
pub use monitor::{
    CropAction, MOISTURE_THRESHOLD, NUTRIENTS_THRESHOLD, SoilAction, evaluate_crop, evaluate_soil,
};

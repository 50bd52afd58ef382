//! Shared type definitions for the Agrimesh farm simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Agrimesh workspace: the field engine, the agent roles, the negotiation
//! protocol, and the engine binary all speak in these terms.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers (bus-level agent names, UUID-backed CFP IDs)
//! - [`enums`] -- Enumeration types (seasons, rain, crops, tasks, priorities)
//! - [`grid`] -- Grid addressing and the tagged [`Zone`] variant
//! - [`structs`] -- CFP and proposal records, sensor readings, the response envelope
//! - [`messages`] -- The message performatives exchanged over the agent bus
//!
//! [`Zone`]: grid::Zone

pub mod enums;
pub mod grid;
pub mod ids;
pub mod messages;
pub mod structs;

pub use enums::{
    AgentRole, CfpStatus, CropKind, CropStage, Priority, RainIntensity, RechargeKind,
    ResourceKind, Season, TaskKind, TaskStatus,
};
pub use grid::{GridPos, GridSize, Zone};
pub use ids::{AgentId, CfpId};
pub use messages::{Envelope, Message, TaskReport, YieldLot};
pub use structs::{
    Cfp, CfpRequest, DroneReading, EnvResponse, Proposal, ResourceRequirement, ResponseStatus,
    SoilReading,
};

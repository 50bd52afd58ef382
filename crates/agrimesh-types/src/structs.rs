//! Negotiation records, sensor readings, and the environment response
//! envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{CfpStatus, CropKind, CropStage, Priority, RechargeKind, ResourceKind, TaskKind};
use crate::grid::{GridPos, Zone};
use crate::ids::{AgentId, CfpId};

/// One material requirement of a task (e.g. 20 units of water).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    /// The material needed.
    pub kind: ResourceKind,
    /// How much of it, in inventory units.
    pub amount: u32,
}

impl ResourceRequirement {
    /// Create a requirement.
    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}

/// What a CFP is asking for.
///
/// Field work and resource replenishment travel through the same
/// negotiation machinery but address different bidder pools, so the two
/// request shapes are kept distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum CfpRequest {
    /// A field intervention over a zone.
    Task {
        /// What to do.
        task: TaskKind,
        /// Where to do it.
        zone: Zone,
        /// Per-cell dose for irrigation and fertilization tasks.
        #[serde(skip_serializing_if = "Option::is_none")]
        dose: Option<f64>,
        /// For planting tasks, which crop to sow.
        #[serde(skip_serializing_if = "Option::is_none")]
        seed_kind: Option<CropKind>,
    },
    /// A resource delivery to a depleted agent.
    Recharge {
        /// What to deliver.
        resource: RechargeKind,
        /// How much is requested.
        amount: f64,
        /// Where the requesting agent sits.
        deliver_to: GridPos,
    },
}

/// A Call For Proposal: one negotiation round over one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cfp {
    /// Unique identifier of this negotiation round.
    pub id: CfpId,
    /// The agent that opened the round and will judge proposals.
    pub requester: AgentId,
    /// What is being asked for.
    pub request: CfpRequest,
    /// Material requirements a bidder must be able to cover.
    pub required: Vec<ResourceRequirement>,
    /// Urgency of the task.
    pub priority: Priority,
    /// When the round was opened.
    pub created_at: DateTime<Utc>,
    /// Optional hard deadline for completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Current lifecycle state.
    pub status: CfpStatus,
}

impl Cfp {
    /// Open a new CFP in the [`CfpStatus::Open`] state.
    pub fn new(
        requester: AgentId,
        request: CfpRequest,
        required: Vec<ResourceRequirement>,
        priority: Priority,
    ) -> Self {
        Self {
            id: CfpId::new(),
            requester,
            request,
            required,
            priority,
            created_at: Utc::now(),
            deadline: None,
            status: CfpStatus::Open,
        }
    }
}

/// A bid submitted in response to a CFP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Which round this bid answers.
    pub cfp_id: CfpId,
    /// The bidding agent.
    pub bidder: AgentId,
    /// Estimated ticks to completion (travel plus execution).
    pub eta_ticks: u32,
    /// Inventory units the bidder would consume.
    pub resource_cost: u32,
    /// Battery percentage the bidder expects to spend.
    pub energy_cost: f64,
}

/// A soil measurement over a zone: the mean of its in-bounds cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    /// Air temperature, degrees Celsius.
    pub temperature: f64,
    /// Mean nutrient level, percent of saturation.
    pub nutrients: f64,
    /// Mean soil moisture, percent of saturation.
    pub moisture: f64,
}

/// An aerial crop observation of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroneReading {
    /// Growth stage of the cell's crop.
    pub crop_stage: CropStage,
    /// Which crop occupies the cell, if any.
    pub crop_kind: Option<CropKind>,
    /// Whether pests infest the cell.
    pub pest_present: bool,
}

/// Outcome discriminant of an environment call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The call succeeded and `data` holds the payload.
    Success,
    /// The call failed and `message` explains why.
    Error,
}

/// Uniform envelope returned by every environment interface call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvResponse {
    /// Success or error.
    pub status: ResponseStatus,
    /// Human-readable failure description, set on errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation payload, set on success when the call returns data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl EnvResponse {
    /// A success envelope with no payload.
    pub const fn ok() -> Self {
        Self { status: ResponseStatus::Success, message: None, data: None }
    }

    /// A success envelope carrying a payload.
    pub const fn ok_with(data: serde_json::Value) -> Self {
        Self { status: ResponseStatus::Success, message: None, data: Some(data) }
    }

    /// An error envelope with a description.
    pub fn err(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Error, message: Some(message.into()), data: None }
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

//! Message performatives exchanged over the agent bus.
//!
//! Every message is a [`Message`] variant tagged on the wire by its
//! `performative` field, wrapped in an [`Envelope`] that records the sender.
//! The vocabulary follows FIPA Contract-Net naming where a standard term
//! exists (`accept-proposal`, `reject-proposal`, `failure`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{CropKind, TaskStatus};
use crate::grid::Zone;
use crate::ids::{AgentId, CfpId};
use crate::structs::Cfp;

/// One harvested lot: how much of which crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldLot {
    /// The harvested crop.
    pub seed_type: CropKind,
    /// Yield amount (health points banked at harvest time).
    pub amount: f64,
}

/// Structured completion details attached to a `Done` report.
///
/// Every field is optional; each task type fills in the subset that applies
/// to it and leaves the rest off the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskReport {
    /// For recharge deliveries, what was delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// For recharge deliveries, how much arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_delivered: Option<f64>,
    /// Inventory units the executor consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_used: Option<u32>,
    /// For harvests, total yield collected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yield_amount: Option<f64>,
    /// Ticks the execution actually took.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u32>,
}

/// A protocol message, discriminated on the wire by its performative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "performative")]
pub enum Message {
    /// Broadcast of a field-work CFP to the eligible executor pool.
    #[serde(rename = "cfp_task")]
    CfpTask {
        /// The full negotiation record.
        cfp: Cfp,
    },
    /// Broadcast of a resource-replenishment CFP to logistics agents.
    #[serde(rename = "cfp_recharge")]
    CfpRecharge {
        /// The full negotiation record.
        cfp: Cfp,
    },
    /// An executor's bid on a field-work CFP.
    #[serde(rename = "propose_task")]
    ProposeTask {
        /// The round being bid on.
        cfp_id: CfpId,
        /// Estimated ticks to completion.
        eta_ticks: u32,
        /// Battery percentage the bidder expects to spend.
        battery_lost: f64,
        /// Inventory units the bidder would consume.
        resource_cost: u32,
    },
    /// A logistics agent's bid on a recharge CFP.
    #[serde(rename = "propose_recharge")]
    ProposeRecharge {
        /// The round being bid on.
        cfp_id: CfpId,
        /// Estimated ticks until delivery.
        eta_ticks: u32,
        /// Battery percentage the courier expects to spend.
        battery_lost: f64,
        /// How much of the resource the courier can actually deliver.
        amount_available: f64,
    },
    /// Award notification to the winning bidder. Fire-and-forget.
    #[serde(rename = "accept-proposal")]
    AcceptProposal {
        /// The round being decided.
        cfp_id: CfpId,
        /// Decision label, `"accepted"`.
        decision: String,
    },
    /// Dismissal sent to each losing bidder. Fire-and-forget.
    #[serde(rename = "reject-proposal")]
    RejectProposal {
        /// The round being decided.
        cfp_id: CfpId,
        /// Decision label, `"rejected"`.
        decision: String,
    },
    /// Successful completion report from the executor to the requester.
    #[serde(rename = "Done")]
    Done {
        /// The round being closed.
        cfp_id: CfpId,
        /// Always [`TaskStatus::Done`] on this performative.
        status: TaskStatus,
        /// For plant/harvest tasks, the crop involved.
        #[serde(skip_serializing_if = "Option::is_none")]
        seed_type: Option<CropKind>,
        /// Structured completion details.
        details: TaskReport,
    },
    /// Execution failure report from the executor to the requester.
    #[serde(rename = "failure")]
    Failure {
        /// The round being closed.
        cfp_id: CfpId,
        /// Always [`TaskStatus::Failed`] on this performative.
        status: TaskStatus,
        /// What went wrong.
        reason: String,
    },
    /// Crop status notification from the drone to interested parties.
    #[serde(rename = "inform_crop")]
    InformCrop {
        /// The observed zone.
        zone: Zone,
        /// Which crop was observed, if any.
        crop_type: Option<CropKind>,
        /// Condition flag: 0 = healthy, 1 = needs intervention.
        state: u8,
        /// Observation timestamp.
        checked_at: DateTime<Utc>,
    },
    /// Harvest delivery notification from a harvester to the warehouse.
    #[serde(rename = "inform_harvest")]
    InformHarvest {
        /// The delivered lots.
        amount_type: Vec<YieldLot>,
        /// Delivery timestamp.
        checked_at: DateTime<Utc>,
    },
    /// Warehouse acknowledgement of a harvest delivery.
    #[serde(rename = "inform_received")]
    InformReceived {
        /// The lots that were booked in.
        details: Vec<YieldLot>,
        /// Booking timestamp.
        checked_at: DateTime<Utc>,
    },
}

impl Message {
    /// The CFP this message belongs to, for negotiation messages.
    pub const fn cfp_id(&self) -> Option<CfpId> {
        match self {
            Self::CfpTask { cfp } | Self::CfpRecharge { cfp } => Some(cfp.id),
            Self::ProposeTask { cfp_id, .. }
            | Self::ProposeRecharge { cfp_id, .. }
            | Self::AcceptProposal { cfp_id, .. }
            | Self::RejectProposal { cfp_id, .. }
            | Self::Done { cfp_id, .. }
            | Self::Failure { cfp_id, .. } => Some(*cfp_id),
            Self::InformCrop { .. } | Self::InformHarvest { .. } | Self::InformReceived { .. } => {
                None
            }
        }
    }
}

/// A message together with its sender, as delivered by the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Bus name of the sending agent.
    pub from: AgentId,
    /// The message body.
    pub message: Message,
}

impl Envelope {
    /// Wrap a message with its sender.
    pub const fn new(from: AgentId, message: Message) -> Self {
        Self { from, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn performative_tags_match_wire_vocabulary() {
        let msg = Message::AcceptProposal { cfp_id: CfpId::new(), decision: "accepted".into() };
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(
            json.get("performative").and_then(|v| v.as_str()),
            Some("accept-proposal")
        );

        let msg = Message::Done {
            cfp_id: CfpId::new(),
            status: TaskStatus::Done,
            seed_type: None,
            details: TaskReport::default(),
        };
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json.get("performative").and_then(|v| v.as_str()), Some("Done"));
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("done"));
    }

    #[test]
    fn cfp_id_extraction() {
        let id = CfpId::new();
        let msg = Message::Failure {
            cfp_id: id,
            status: TaskStatus::Failed,
            reason: "insufficient water".into(),
        };
        assert_eq!(msg.cfp_id(), Some(id));

        let msg = Message::InformHarvest { amount_type: Vec::new(), checked_at: Utc::now() };
        assert_eq!(msg.cfp_id(), None);
    }

    #[test]
    fn default_report_serializes_empty() {
        let json = serde_json::to_value(TaskReport::default()).unwrap_or_default();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn message_roundtrip() {
        let msg = Message::ProposeTask {
            cfp_id: CfpId::new(),
            eta_ticks: 5,
            battery_lost: 1.5,
            resource_cost: 20,
        };
        let json = serde_json::to_string(&msg).unwrap_or_default();
        let back: Result<Message, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(msg));
    }
}

//! Responder-side message builders.
//!
//! Executors turn their bid math into wire messages with these helpers and
//! report completion or failure after execution. Keeping the builders here
//! keeps the performative vocabulary in one crate.

use agrimesh_types::{CfpId, CropKind, Message, Proposal, TaskReport, TaskStatus};

/// A task bid as a wire message.
pub fn propose_task(proposal: &Proposal) -> Message {
    Message::ProposeTask {
        cfp_id: proposal.cfp_id,
        eta_ticks: proposal.eta_ticks,
        battery_lost: proposal.energy_cost,
        resource_cost: proposal.resource_cost,
    }
}

/// A recharge bid as a wire message.
pub fn propose_recharge(proposal: &Proposal, amount_available: f64) -> Message {
    Message::ProposeRecharge {
        cfp_id: proposal.cfp_id,
        eta_ticks: proposal.eta_ticks,
        battery_lost: proposal.energy_cost,
        amount_available,
    }
}

/// A success report for a completed task.
pub const fn done(cfp_id: CfpId, seed_type: Option<CropKind>, details: TaskReport) -> Message {
    Message::Done { cfp_id, status: TaskStatus::Done, seed_type, details }
}

/// A failure report. The requester treats the task as not executed.
pub const fn failure(cfp_id: CfpId, reason: String) -> Message {
    Message::Failure { cfp_id, status: TaskStatus::Failed, reason }
}

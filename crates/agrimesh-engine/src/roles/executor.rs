//! Mobile executor task: bids on field-work CFPs and executes awards.
//!
//! An executor answers CFPs whose task type it handles, remembers its
//! outstanding bids, and on award travels to the zone, debits its
//! inventory, and applies the intervention through the environment
//! interface. Materials are debited before execution and refunded if the
//! environment rejects the call, so a failed round consumes nothing.

use std::collections::HashMap;

use agrimesh_agents::{AgentState, build_proposal};
use agrimesh_protocol::{EXECUTION_TIMEOUT, MessageBus, PROPOSAL_COLLECTION_TIMEOUT, responder};
use agrimesh_types::{
    Cfp, CfpId, CfpRequest, CropKind, Message, TaskKind, TaskReport, YieldLot,
};
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::roles::common::{self, AgentDirectory};
use crate::shared::FieldHandle;

/// Spawn an executor that handles the given task types.
pub fn spawn(
    bus: MessageBus,
    field: FieldHandle,
    directory: AgentDirectory,
    mut state: AgentState,
    accepts: Vec<TaskKind>,
    mut rng: StdRng,
) -> JoinHandle<()> {
    let mut inbox = bus.register(&state.id);
    tokio::spawn(async move {
        let mut pending: HashMap<CfpId, Cfp> = HashMap::new();
        while let Some(envelope) = inbox.recv().await {
            match envelope.message {
                Message::CfpTask { cfp } => {
                    let CfpRequest::Task { task, .. } = &cfp.request else { continue };
                    if !accepts.contains(task) {
                        continue;
                    }
                    let Some(proposal) = build_proposal(&state, &cfp) else {
                        debug!(agent = %state.id, cfp_id = %cfp.id, "declining cfp");
                        continue;
                    };
                    let reply = responder::propose_task(&proposal);
                    if bus.send(&state.id, &cfp.requester, reply).is_ok() {
                        pending.insert(cfp.id, cfp);
                    }
                }
                Message::AcceptProposal { cfp_id, .. } => {
                    let Some(cfp) = pending.remove(&cfp_id) else {
                        warn!(agent = %state.id, cfp_id = %cfp_id, "award for unknown bid");
                        continue;
                    };
                    let report =
                        execute(&bus, &field, &directory, &mut state, &cfp, &mut rng).await;
                    if bus.send(&state.id, &cfp.requester, report).is_err() {
                        warn!(agent = %state.id, cfp_id = %cfp_id, "requester unreachable");
                    }
                    common::top_up_if_low(
                        &bus,
                        &mut inbox,
                        &mut state,
                        &directory.logistics,
                        PROPOSAL_COLLECTION_TIMEOUT,
                        EXECUTION_TIMEOUT,
                    )
                    .await;
                }
                Message::RejectProposal { cfp_id, .. } => {
                    pending.remove(&cfp_id);
                }
                other => {
                    trace!(agent = %state.id, message = ?other, "unhandled message");
                }
            }
        }
    })
}

/// Execute an awarded task and build the completion report.
async fn execute(
    bus: &MessageBus,
    field: &FieldHandle,
    directory: &AgentDirectory,
    state: &mut AgentState,
    cfp: &Cfp,
    rng: &mut StdRng,
) -> Message {
    let CfpRequest::Task { task, zone, dose, seed_kind } = &cfp.request else {
        return responder::failure(cfp.id, "not a field task".into());
    };

    // All-or-nothing debit up front; refunded if the field rejects the call.
    let mut debited = Vec::with_capacity(cfp.required.len());
    for requirement in &cfp.required {
        if let Err(err) = state.inventory.take(requirement.kind, requirement.amount) {
            for (kind, amount) in debited {
                state.inventory.deposit(kind, amount).unwrap_or(0);
            }
            return responder::failure(cfp.id, err.to_string());
        }
        debited.push((requirement.kind, requirement.amount));
    }

    state.travel_to(zone.reference_cell());
    let resource_used: u32 = debited.iter().map(|(_, amount)| *amount).sum();

    let outcome = match task {
        TaskKind::Irrigation => field.irrigate(*zone, dose.unwrap_or(4.0)).await,
        TaskKind::Fertilize => field.fertilize(*zone, dose.unwrap_or(2.0)).await,
        TaskKind::Harvest => field.harvest_zone(*zone).await,
        TaskKind::Plant => {
            field.plant_zone(*zone, seed_kind.unwrap_or(CropKind::Tomato)).await
        }
    };

    if !outcome.is_success() {
        for (kind, amount) in debited {
            state.inventory.deposit(kind, amount).unwrap_or(0);
        }
        let reason = outcome.message.unwrap_or_else(|| "environment rejected the task".into());
        return responder::failure(cfp.id, reason);
    }

    // Travel is paid in travel_to; the work itself costs a small random band.
    let action_cost = state.battery.drain_scan(rng);
    info!(agent = %state.id, cfp_id = %cfp.id, task = ?task, zone = %zone, action_cost,
        "task executed");

    match task {
        TaskKind::Harvest => {
            let lots = parse_lots(outcome.data.as_ref());
            let total: f64 = lots.iter().map(|l| l.amount).sum();
            deliver_to_storage(bus, directory, state, &lots);
            let details = TaskReport { yield_amount: Some(total), ..TaskReport::default() };
            responder::done(cfp.id, lots.first().map(|l| l.seed_type), details)
        }
        TaskKind::Plant => {
            let details = TaskReport {
                resource_used: Some(resource_used),
                ..TaskReport::default()
            };
            responder::done(cfp.id, *seed_kind, details)
        }
        TaskKind::Irrigation | TaskKind::Fertilize => {
            let details = TaskReport {
                resource_used: Some(resource_used),
                ..TaskReport::default()
            };
            responder::done(cfp.id, None, details)
        }
    }
}

fn parse_lots(data: Option<&serde_json::Value>) -> Vec<YieldLot> {
    data.and_then(|d| d.get("lots"))
        .cloned()
        .and_then(|lots| serde_json::from_value(lots).ok())
        .unwrap_or_default()
}

fn deliver_to_storage(
    bus: &MessageBus,
    directory: &AgentDirectory,
    state: &AgentState,
    lots: &[YieldLot],
) {
    let Some(storage) = &directory.storage else { return };
    if lots.is_empty() {
        return;
    }
    let delivery = Message::InformHarvest {
        amount_type: lots.to_vec(),
        checked_at: chrono::Utc::now(),
    };
    if bus.send(&state.id, storage, delivery).is_err() {
        warn!(agent = %state.id, "storage unreachable");
    }
}

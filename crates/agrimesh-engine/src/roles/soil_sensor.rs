//! Stationary soil sensor task.
//!
//! Each scan cycle the sensor reads the mean soil state of every zone it
//! watches, opens one CFP per detected deficit (at most one irrigation and
//! one fertilization per zone per scan), drives each round to completion,
//! and finally tops up its own battery when low.

use std::time::Duration;

use agrimesh_agents::{AgentState, SoilAction, evaluate_soil};
use agrimesh_protocol::{
    Completion, EXECUTION_TIMEOUT, MessageBus, PROPOSAL_COLLECTION_TIMEOUT, await_completion,
    run_round,
};
use agrimesh_types::{
    Cfp, CfpRequest, Envelope, Priority, ResourceKind, ResourceRequirement, SoilReading, TaskKind,
    Zone,
};
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::roles::common::{self, AgentDirectory};
use crate::shared::FieldHandle;

/// Spawn a soil sensor watching the given zones.
pub fn spawn(
    bus: MessageBus,
    field: FieldHandle,
    directory: AgentDirectory,
    mut state: AgentState,
    zones: Vec<Zone>,
    scan_interval: Duration,
    mut rng: StdRng,
) -> JoinHandle<()> {
    let mut inbox = bus.register(&state.id);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(scan_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            scan_once(&bus, &mut inbox, &field, &directory, &mut state, &zones, &mut rng).await;
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
    })
}

/// Run one scan cycle over every watched zone.
pub async fn scan_once(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    field: &FieldHandle,
    directory: &AgentDirectory,
    state: &mut AgentState,
    zones: &[Zone],
    rng: &mut StdRng,
) {
    let scan_cost = state.battery.drain_scan(rng);
    debug!(agent = %state.id, scan_cost, battery = state.battery.level(), "soil scan");

    let grid = field.grid_size().await;
    for zone in zones {
        let response = field.soil_reading(*zone).await;
        let Some(reading) = response
            .data
            .and_then(|data| serde_json::from_value::<SoilReading>(data).ok())
        else {
            warn!(agent = %state.id, zone = %zone, "unreadable zone");
            continue;
        };
        let cell_count = u32::try_from(zone.cells(grid).len()).unwrap_or(0);
        for action in evaluate_soil(&reading) {
            negotiate_action(bus, inbox, directory, state, *zone, cell_count, action).await;
        }
    }
}

async fn negotiate_action(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    directory: &AgentDirectory,
    state: &mut AgentState,
    zone: Zone,
    cell_count: u32,
    action: SoilAction,
) {
    let (resource, pool) = match action.task {
        TaskKind::Irrigation => (ResourceKind::Water, &directory.irrigation),
        TaskKind::Fertilize => (ResourceKind::Fertilizer, &directory.fertilizer),
        TaskKind::Harvest | TaskKind::Plant => return,
    };
    if pool.is_empty() {
        warn!(agent = %state.id, task = ?action.task, "no executors registered");
        return;
    }
    let amount = common::units(action.dose).saturating_mul(cell_count);
    let mut cfp = Cfp::new(
        state.id.clone(),
        CfpRequest::Task {
            task: action.task,
            zone,
            dose: Some(action.dose),
            seed_kind: None,
        },
        vec![ResourceRequirement::new(resource, amount)],
        Priority::High,
    );
    info!(agent = %state.id, cfp_id = %cfp.id, task = ?action.task, zone = %zone,
        dose = action.dose, "deficit detected");

    let awarded = run_round(bus, inbox, &mut cfp, pool, PROPOSAL_COLLECTION_TIMEOUT).await;
    if awarded.is_err() {
        return;
    }
    match await_completion(inbox, &mut cfp, EXECUTION_TIMEOUT).await {
        Ok(Completion::Done { .. }) => {
            info!(agent = %state.id, cfp_id = %cfp.id, "task completed");
        }
        Ok(Completion::Failed { reason }) => {
            warn!(agent = %state.id, cfp_id = %cfp.id, reason, "task failed");
        }
        Err(err) => {
            warn!(agent = %state.id, cfp_id = %cfp.id, error = %err, "task timed out");
        }
    }
}

//! Aerial drone task.
//!
//! The drone sweeps every cell each scan cycle. Pesticide it applies
//! itself, spending a charge per treatment; harvest and planting it
//! delegates to the harvester pool through CFPs. Cells needing attention
//! are also reported to the warehouse as `inform_crop` notifications.

use std::time::Duration;

use agrimesh_agents::{AgentState, CropAction, evaluate_crop};
use agrimesh_protocol::{
    EXECUTION_TIMEOUT, MessageBus, PROPOSAL_COLLECTION_TIMEOUT, await_completion, run_round,
};
use agrimesh_types::{
    Cfp, CfpRequest, CropKind, DroneReading, Envelope, GridPos, Message, Priority, ResourceKind,
    ResourceRequirement, TaskKind, Zone,
};
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::roles::common::{self, AgentDirectory};
use crate::shared::FieldHandle;

/// Spawn the crop-monitoring drone.
pub fn spawn(
    bus: MessageBus,
    field: FieldHandle,
    directory: AgentDirectory,
    mut state: AgentState,
    scan_interval: Duration,
    mut rng: StdRng,
) -> JoinHandle<()> {
    let mut inbox = bus.register(&state.id);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(scan_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&bus, &mut inbox, &field, &directory, &mut state, &mut rng).await;
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

/// Crop sown into a cell when the drone requests planting: a fixed
/// position-based rotation so neighbouring cells grow different crops.
pub fn crop_for_cell(pos: GridPos) -> CropKind {
    let index = pos
        .row
        .saturating_add(pos.col)
        .checked_rem(CropKind::ALL.len())
        .unwrap_or(0);
    CropKind::ALL.get(index).copied().unwrap_or(CropKind::Tomato)
}

/// Run one full sweep over the grid.
pub async fn sweep_once(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    field: &FieldHandle,
    directory: &AgentDirectory,
    state: &mut AgentState,
    rng: &mut StdRng,
) {
    let scan_cost = state.battery.drain_scan(rng);
    debug!(agent = %state.id, scan_cost, battery = state.battery.level(), "crop sweep");

    let grid = field.grid_size().await;
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let pos = GridPos::new(row, col);
            let response = field.drone_reading(pos).await;
            let Some(reading) = response
                .data
                .and_then(|data| serde_json::from_value::<DroneReading>(data).ok())
            else {
                continue;
            };
            let actions = evaluate_crop(&reading);
            if actions.is_empty() {
                continue;
            }
            report_cell(bus, directory, state, pos, &reading);
            for action in actions {
                match action {
                    CropAction::Pesticide => treat_cell(field, state, pos).await,
                    CropAction::Harvest => {
                        delegate(bus, inbox, directory, state, pos, TaskKind::Harvest).await;
                    }
                    CropAction::Plant => {
                        delegate(bus, inbox, directory, state, pos, TaskKind::Plant).await;
                    }
                }
            }
        }
    }
}

fn report_cell(
    bus: &MessageBus,
    directory: &AgentDirectory,
    state: &AgentState,
    pos: GridPos,
    reading: &DroneReading,
) {
    let Some(storage) = &directory.storage else { return };
    let notice = Message::InformCrop {
        zone: Zone::Cell { pos },
        crop_type: reading.crop_kind,
        state: 1,
        checked_at: chrono::Utc::now(),
    };
    if bus.send(&state.id, storage, notice).is_err() {
        warn!(agent = %state.id, "storage unreachable");
    }
}

async fn treat_cell(field: &FieldHandle, state: &mut AgentState, pos: GridPos) {
    if state.inventory.take(ResourceKind::Pesticide, 1).is_err() {
        warn!(agent = %state.id, cell = %pos, "out of pesticide charges");
        return;
    }
    let response = field.pesticide(pos).await;
    if response.is_success() {
        info!(agent = %state.id, cell = %pos, "cell treated");
    } else {
        // Refund the unused charge.
        state.inventory.deposit(ResourceKind::Pesticide, 1).unwrap_or(0);
        warn!(agent = %state.id, cell = %pos, message = ?response.message, "treatment rejected");
    }
}

async fn delegate(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    directory: &AgentDirectory,
    state: &mut AgentState,
    pos: GridPos,
    task: TaskKind,
) {
    if directory.harvester.is_empty() {
        warn!(agent = %state.id, task = ?task, "no harvesters registered");
        return;
    }
    let (seed_kind, required) = if task == TaskKind::Plant {
        let kind = crop_for_cell(pos);
        (Some(kind), vec![ResourceRequirement::new(ResourceKind::Seeds, 1)])
    } else {
        (None, Vec::new())
    };
    let mut cfp = Cfp::new(
        state.id.clone(),
        CfpRequest::Task { task, zone: Zone::Cell { pos }, dose: None, seed_kind },
        required,
        Priority::Medium,
    );
    info!(agent = %state.id, cfp_id = %cfp.id, task = ?task, cell = %pos, "delegating");
    if run_round(bus, inbox, &mut cfp, &directory.harvester, PROPOSAL_COLLECTION_TIMEOUT)
        .await
        .is_err()
    {
        return;
    }
    if let Err(err) = await_completion(inbox, &mut cfp, EXECUTION_TIMEOUT).await {
        warn!(agent = %state.id, cfp_id = %cfp.id, error = %err, "delegation timed out");
    }
}

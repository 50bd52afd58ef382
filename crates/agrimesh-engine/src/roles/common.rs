//! Helpers shared by every agent role.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use agrimesh_agents::AgentState;
use agrimesh_protocol::{Completion, MessageBus, await_completion, run_round};
use agrimesh_types::{
    AgentId, Cfp, CfpRequest, Envelope, Priority, RechargeKind, ResourceKind,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Who is reachable for what: the directory every agent task gets a copy of.
#[derive(Debug, Clone, Default)]
pub struct AgentDirectory {
    /// Irrigation executors.
    pub irrigation: Vec<AgentId>,
    /// Fertilizer executors.
    pub fertilizer: Vec<AgentId>,
    /// Harvest/plant executors.
    pub harvester: Vec<AgentId>,
    /// Logistics couriers, the sole replenishment path.
    pub logistics: Vec<AgentId>,
    /// The yield warehouse.
    pub storage: Option<AgentId>,
}

/// Derive an agent's private random source from the run seed and its id.
///
/// Each agent draws its battery costs from its own stream, so two runs
/// with the same seed replay the same drains regardless of how the agent
/// tasks interleave.
pub fn agent_rng(seed: u64, id: &AgentId) -> StdRng {
    let mut hasher = DefaultHasher::new();
    id.as_str().hash(&mut hasher);
    StdRng::seed_from_u64(seed ^ hasher.finish())
}

/// The inventory slot a recharge delivery lands in, if it is a material.
pub const fn material_for(resource: RechargeKind) -> Option<ResourceKind> {
    match resource {
        RechargeKind::Battery => None,
        RechargeKind::Water => Some(ResourceKind::Water),
        RechargeKind::Fertilizer => Some(ResourceKind::Fertilizer),
        RechargeKind::Seeds => Some(ResourceKind::Seeds),
        RechargeKind::Pesticides => Some(ResourceKind::Pesticide),
        RechargeKind::Fuel => Some(ResourceKind::Fuel),
    }
}

/// Convert a dose or delivery amount to whole inventory units, rounding up.
pub fn units(amount: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = amount.max(0.0).ceil() as u32;
    whole
}

/// Run one recharge negotiation with the logistics pool and book the
/// delivery into the requesting agent's battery or inventory.
///
/// Returns `true` when something was delivered. Losing the round (or an
/// empty logistics pool) is not an error; the agent simply retries on its
/// next cycle.
pub async fn request_recharge(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    state: &mut AgentState,
    logistics: &[AgentId],
    resource: RechargeKind,
    amount: f64,
    collection_window: Duration,
    execution_window: Duration,
) -> bool {
    if logistics.is_empty() || amount <= 0.0 {
        return false;
    }
    let mut cfp = Cfp::new(
        state.id.clone(),
        CfpRequest::Recharge { resource, amount, deliver_to: state.position },
        Vec::new(),
        Priority::Urgent,
    );
    let awarded = run_round(bus, inbox, &mut cfp, logistics, collection_window).await;
    if awarded.is_err() {
        warn!(agent = %state.id, resource = ?resource, "recharge round failed");
        return false;
    }
    match await_completion(inbox, &mut cfp, execution_window).await {
        Ok(Completion::Done { details, .. }) => {
            let delivered = details.amount_delivered.unwrap_or(0.0);
            match material_for(resource) {
                None => {
                    let level = state.battery.recharge(delivered);
                    info!(agent = %state.id, delivered, level, "battery recharged");
                }
                Some(kind) => {
                    let fitted = state.inventory.deposit(kind, units(delivered)).unwrap_or(0);
                    info!(agent = %state.id, resource = ?kind, fitted, "stock replenished");
                }
            }
            delivered > 0.0
        }
        Ok(Completion::Failed { reason }) => {
            warn!(agent = %state.id, reason, "recharge delivery failed");
            false
        }
        Err(err) => {
            warn!(agent = %state.id, error = %err, "recharge round expired");
            false
        }
    }
}

/// Request refills for the battery and every depleted material.
pub async fn top_up_if_low(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    state: &mut AgentState,
    logistics: &[AgentId],
    collection_window: Duration,
    execution_window: Duration,
) {
    if state.battery.is_low() {
        let deficit = state.battery.deficit();
        request_recharge(
            bus,
            inbox,
            state,
            logistics,
            RechargeKind::Battery,
            deficit,
            collection_window,
            execution_window,
        )
        .await;
    }
    for kind in state.inventory.depleted() {
        let missing = state.inventory.capacity(kind).saturating_sub(state.inventory.level(kind));
        request_recharge(
            bus,
            inbox,
            state,
            logistics,
            kind.recharge_kind(),
            f64::from(missing),
            collection_window,
            execution_window,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimesh_agents::Battery;

    #[test]
    fn seeded_agent_rng_replays_identical_drains() {
        let id = AgentId::from("drone-0");
        let mut first = agent_rng(42, &id);
        let mut second = agent_rng(42, &id);
        let mut battery_a = Battery::new(100.0);
        let mut battery_b = Battery::new(100.0);
        for _ in 0..10 {
            battery_a.drain_scan(&mut first);
            battery_b.drain_scan(&mut second);
        }
        assert!((battery_a.level() - battery_b.level()).abs() < f64::EPSILON);
    }

    #[test]
    fn agents_draw_from_distinct_streams() {
        let mut drone = agent_rng(42, &AgentId::from("drone-0"));
        let mut sensor = agent_rng(42, &AgentId::from("soil-sensor-0"));
        let mut battery_a = Battery::new(100.0);
        let mut battery_b = Battery::new(100.0);
        for _ in 0..10 {
            battery_a.drain_scan(&mut drone);
            battery_b.drain_scan(&mut sensor);
        }
        assert!((battery_a.level() - battery_b.level()).abs() > f64::EPSILON);
    }

    #[test]
    fn unit_conversion_rounds_up() {
        assert_eq!(units(4.0), 4);
        assert_eq!(units(4.2), 5);
        assert_eq!(units(-3.0), 0);
    }

    #[test]
    fn battery_recharges_have_no_material_slot() {
        assert_eq!(material_for(RechargeKind::Battery), None);
        assert_eq!(material_for(RechargeKind::Water), Some(ResourceKind::Water));
        assert_eq!(
            material_for(RechargeKind::Pesticides),
            Some(ResourceKind::Pesticide)
        );
    }
}

//! Logistics courier task: the sole replenishment path.
//!
//! The courier holds a depot stock of battery charge and materials, bids
//! on `cfp_recharge` rounds with what it can actually deliver, and drives
//! to the requester on award. A restock cycle tops the depot back up at a
//! fixed rate, so couriers cannot conjure unlimited supply.

use std::collections::HashMap;
use std::time::Duration;

use agrimesh_agents::{Battery, bidding::travel_energy_cost, eta_ticks};
use agrimesh_protocol::{MessageBus, responder};
use agrimesh_types::{
    AgentId, Cfp, CfpId, CfpRequest, GridPos, Message, Proposal, RechargeKind, TaskReport,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Depot stock and physical state of one courier.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticsState {
    /// Bus name.
    pub id: AgentId,
    /// Current position.
    pub position: GridPos,
    /// The courier's own battery.
    pub battery: Battery,
    /// Deliverable stock per resource, including battery charge.
    pub stock: HashMap<RechargeKind, f64>,
    /// Stock ceiling per resource.
    pub stock_capacity: f64,
}

impl LogisticsState {
    /// A courier with every stock at capacity.
    pub fn new(id: AgentId, position: GridPos, battery_capacity: f64, stock_capacity: f64) -> Self {
        let stock = [
            RechargeKind::Battery,
            RechargeKind::Water,
            RechargeKind::Fertilizer,
            RechargeKind::Seeds,
            RechargeKind::Pesticides,
            RechargeKind::Fuel,
        ]
        .into_iter()
        .map(|kind| (kind, stock_capacity))
        .collect();
        Self {
            id,
            position,
            battery: Battery::new(battery_capacity),
            stock,
            stock_capacity,
        }
    }

    fn available(&self, resource: RechargeKind) -> f64 {
        self.stock.get(&resource).copied().unwrap_or(0.0)
    }

    fn withdraw(&mut self, resource: RechargeKind, amount: f64) -> f64 {
        let Some(level) = self.stock.get_mut(&resource) else { return 0.0 };
        let delivered = amount.max(0.0).min(*level);
        *level -= delivered;
        delivered
    }

    fn restock(&mut self, amount: f64) {
        for level in self.stock.values_mut() {
            *level = (*level + amount).min(self.stock_capacity);
        }
    }
}

/// Spawn a logistics courier.
pub fn spawn(
    bus: MessageBus,
    mut state: LogisticsState,
    restock_interval: Duration,
    restock_amount: u32,
) -> JoinHandle<()> {
    let mut inbox = bus.register(&state.id);
    tokio::spawn(async move {
        let mut restock = tokio::time::interval(restock_interval);
        restock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut pending: HashMap<CfpId, Cfp> = HashMap::new();
        loop {
            tokio::select! {
                envelope = inbox.recv() => {
                    let Some(envelope) = envelope else { break };
                    handle_message(&bus, &mut state, &mut pending, envelope.message);
                }
                _ = restock.tick() => {
                    state.restock(f64::from(restock_amount));
                    debug!(agent = %state.id, "depot restocked");
                }
            }
        }
    })
}

fn handle_message(
    bus: &MessageBus,
    state: &mut LogisticsState,
    pending: &mut HashMap<CfpId, Cfp>,
    message: Message,
) {
    match message {
        Message::CfpRecharge { cfp } => {
            let CfpRequest::Recharge { resource, amount, deliver_to } = &cfp.request else {
                return;
            };
            let available = state.available(*resource);
            if available <= 0.0 {
                debug!(agent = %state.id, resource = ?resource, "stock empty, declining");
                return;
            }
            let energy_cost = travel_energy_cost(state.position.manhattan(*deliver_to));
            if state.battery.level() <= energy_cost {
                return;
            }
            let proposal = Proposal {
                cfp_id: cfp.id,
                bidder: state.id.clone(),
                eta_ticks: eta_ticks(state.position, *deliver_to),
                resource_cost: 0,
                energy_cost,
            };
            let offer = amount.min(available);
            let reply = responder::propose_recharge(&proposal, offer);
            if bus.send(&state.id, &cfp.requester, reply).is_ok() {
                pending.insert(cfp.id, cfp);
            }
        }
        Message::AcceptProposal { cfp_id, .. } => {
            let Some(cfp) = pending.remove(&cfp_id) else {
                warn!(agent = %state.id, cfp_id = %cfp_id, "award for unknown bid");
                return;
            };
            let CfpRequest::Recharge { resource, amount, deliver_to } = cfp.request else {
                return;
            };
            let cost = travel_energy_cost(state.position.manhattan(deliver_to));
            state.battery.drain(cost);
            state.position = deliver_to;

            let delivered = state.withdraw(resource, amount);
            let resource_label = serde_json::to_value(resource)
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned));
            let details = TaskReport {
                resource_type: resource_label,
                amount_delivered: Some(delivered),
                ..TaskReport::default()
            };
            info!(agent = %state.id, cfp_id = %cfp_id, resource = ?resource, delivered,
                "delivery completed");
            let report = if delivered > 0.0 {
                responder::done(cfp_id, None, details)
            } else {
                responder::failure(cfp_id, "stock exhausted before delivery".into())
            };
            if bus.send(&state.id, &cfp.requester, report).is_err() {
                warn!(agent = %state.id, cfp_id = %cfp_id, "requester unreachable");
            }
        }
        Message::RejectProposal { cfp_id, .. } => {
            pending.remove(&cfp_id);
        }
        other => {
            trace!(agent = %state.id, message = ?other, "unhandled message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_never_exceeds_stock() {
        let mut state =
            LogisticsState::new(AgentId::from("logistics-0"), GridPos::new(0, 0), 100.0, 50.0);
        assert_eq!(state.withdraw(RechargeKind::Water, 30.0), 30.0);
        assert_eq!(state.withdraw(RechargeKind::Water, 30.0), 20.0);
        assert_eq!(state.withdraw(RechargeKind::Water, 30.0), 0.0);
    }

    #[test]
    fn restock_caps_at_capacity() {
        let mut state =
            LogisticsState::new(AgentId::from("logistics-0"), GridPos::new(0, 0), 100.0, 50.0);
        state.withdraw(RechargeKind::Seeds, 15.0);
        state.restock(10.0);
        assert_eq!(state.available(RechargeKind::Seeds), 45.0);
        state.restock(10.0);
        assert_eq!(state.available(RechargeKind::Seeds), 50.0);
    }
}

//! Bid construction for executor agents.
//!
//! A bid's ETA is the Manhattan travel distance to the task zone plus a
//! fixed execution allowance; its energy cost scales with distance. An
//! agent only bids when its battery and inventory can actually cover the
//! task.

use agrimesh_types::{Cfp, CfpRequest, GridPos, Proposal};

use crate::agent::AgentState;

/// Ticks every task execution is assumed to take once on site.
pub const FIXED_EXECUTION_TICKS: u32 = 2;

/// Travel energy cost in battery percent for a Manhattan distance.
pub fn travel_energy_cost(distance: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let halved = (distance / 2) as f64;
    halved
}

/// ETA in ticks for a task at `target` from `from`.
pub fn eta_ticks(from: GridPos, target: GridPos) -> u32 {
    let travel = u32::try_from(from.manhattan(target)).unwrap_or(u32::MAX);
    travel.saturating_add(FIXED_EXECUTION_TICKS)
}

/// Build a bid for a CFP, or `None` when the agent cannot cover it.
///
/// An agent declines (returns `None`) when its battery is below the travel
/// plus execution cost, or when any required material exceeds its stock.
pub fn build_proposal(agent: &AgentState, cfp: &Cfp) -> Option<Proposal> {
    let target = match &cfp.request {
        CfpRequest::Task { zone, .. } => zone.reference_cell(),
        CfpRequest::Recharge { deliver_to, .. } => *deliver_to,
    };
    let distance = agent.position.manhattan(target);
    let energy_cost = travel_energy_cost(distance);
    if agent.battery.level() <= energy_cost {
        return None;
    }

    let mut resource_cost = 0_u32;
    for requirement in &cfp.required {
        if !agent.inventory.can_cover(requirement.kind, requirement.amount) {
            return None;
        }
        resource_cost = resource_cost.saturating_add(requirement.amount);
    }

    Some(Proposal {
        cfp_id: cfp.id,
        bidder: agent.id.clone(),
        eta_ticks: eta_ticks(agent.position, target),
        resource_cost,
        energy_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimesh_types::{
        AgentId, AgentRole, Priority, ResourceKind, ResourceRequirement, TaskKind, Zone,
    };

    use crate::energy::Battery;
    use crate::inventory::Inventory;

    fn executor(position: GridPos) -> AgentState {
        AgentState {
            id: AgentId::from("irrigation-0"),
            role: AgentRole::Irrigation,
            position,
            battery: Battery::new(100.0),
            inventory: Inventory::new().with_slot(ResourceKind::Water, 200),
        }
    }

    fn water_cfp(target: GridPos, amount: u32) -> Cfp {
        Cfp::new(
            AgentId::from("soil-sensor-0"),
            CfpRequest::Task {
                task: TaskKind::Irrigation,
                zone: Zone::Cell { pos: target },
                dose: None,
                seed_kind: None,
            },
            vec![ResourceRequirement::new(ResourceKind::Water, amount)],
            Priority::High,
        )
    }

    #[test]
    fn eta_is_distance_plus_fixed_allowance() {
        assert_eq!(eta_ticks(GridPos::new(0, 0), GridPos::new(2, 2)), 6);
        assert_eq!(eta_ticks(GridPos::new(1, 1), GridPos::new(1, 1)), 2);
    }

    #[test]
    fn proposal_carries_costs() {
        let agent = executor(GridPos::new(0, 0));
        let cfp = water_cfp(GridPos::new(2, 1), 30);
        let proposal = build_proposal(&agent, &cfp);
        assert_eq!(proposal.as_ref().map(|p| p.eta_ticks), Some(5));
        assert_eq!(proposal.as_ref().map(|p| p.resource_cost), Some(30));
        assert_eq!(proposal.map(|p| p.energy_cost), Some(1.0));
    }

    #[test]
    fn declines_when_stock_cannot_cover() {
        let agent = executor(GridPos::new(0, 0));
        let cfp = water_cfp(GridPos::new(1, 1), 500);
        assert!(build_proposal(&agent, &cfp).is_none());
    }

    #[test]
    fn declines_when_battery_is_flat() {
        let mut agent = executor(GridPos::new(0, 0));
        agent.battery.drain(100.0);
        let cfp = water_cfp(GridPos::new(2, 2), 10);
        assert!(build_proposal(&agent, &cfp).is_none());
    }

    #[test]
    fn recharge_cfp_targets_the_requesters_position() {
        let agent = executor(GridPos::new(0, 0));
        let cfp = Cfp::new(
            AgentId::from("fertilizer-0"),
            CfpRequest::Recharge {
                resource: agrimesh_types::RechargeKind::Battery,
                amount: 60.0,
                deliver_to: GridPos::new(2, 2),
            },
            Vec::new(),
            Priority::Urgent,
        );
        let proposal = build_proposal(&agent, &cfp);
        assert_eq!(proposal.map(|p| p.eta_ticks), Some(6));
    }
}

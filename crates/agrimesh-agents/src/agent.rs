//! Common per-agent state shared by every role.

use agrimesh_types::{AgentId, AgentRole, GridPos};

use crate::energy::Battery;
use crate::inventory::Inventory;

/// The physical state of one agent: who it is, where it stands, and what
/// it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    /// Bus-level name.
    pub id: AgentId,
    /// Role in the farm.
    pub role: AgentRole,
    /// Current grid position.
    pub position: GridPos,
    /// Battery charge.
    pub battery: Battery,
    /// Carried materials.
    pub inventory: Inventory,
}

impl AgentState {
    /// Create an agent with a full battery and the given inventory.
    pub fn new(
        id: AgentId,
        role: AgentRole,
        position: GridPos,
        battery_capacity: f64,
        inventory: Inventory,
    ) -> Self {
        Self { id, role, position, battery: Battery::new(battery_capacity), inventory }
    }

    /// Move to a target cell and pay the travel energy cost.
    pub fn travel_to(&mut self, target: GridPos) {
        let distance = self.position.manhattan(target);
        self.battery.drain(crate::bidding::travel_energy_cost(distance));
        self.position = target;
    }
}

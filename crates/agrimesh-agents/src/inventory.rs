//! Capacity-capped material inventories.
//!
//! Every mobile agent carries a small set of materials (water, fertilizer,
//! seeds, ...). Withdrawals are all-or-nothing: a task that cannot be fully
//! covered debits nothing. Deposits saturate at capacity, any surplus from
//! an over-generous delivery is discarded.

use std::collections::BTreeMap;

use agrimesh_types::ResourceKind;

use crate::error::AgentError;

/// Fraction of capacity below which a material counts as running low.
pub const RESOURCE_LOW_FRACTION: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    level: u32,
    capacity: u32,
}

/// Materials an agent carries, each with its own capacity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Inventory {
    slots: BTreeMap<ResourceKind, Slot>,
}

impl Inventory {
    /// An inventory with no slots; add materials with [`Self::with_slot`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material slot, starting full.
    #[must_use]
    pub fn with_slot(mut self, kind: ResourceKind, capacity: u32) -> Self {
        self.slots.insert(kind, Slot { level: capacity, capacity });
        self
    }

    /// Whether the agent carries this material at all.
    pub fn carries(&self, kind: ResourceKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Current level of a material; zero for materials not carried.
    pub fn level(&self, kind: ResourceKind) -> u32 {
        self.slots.get(&kind).map_or(0, |s| s.level)
    }

    /// Capacity of a material slot; zero for materials not carried.
    pub fn capacity(&self, kind: ResourceKind) -> u32 {
        self.slots.get(&kind).map_or(0, |s| s.capacity)
    }

    /// Whether the agent holds at least `amount` of the material.
    pub fn can_cover(&self, kind: ResourceKind, amount: u32) -> bool {
        self.level(kind) >= amount
    }

    /// Withdraw exactly `amount`, or fail without debiting anything.
    pub fn take(&mut self, kind: ResourceKind, amount: u32) -> Result<(), AgentError> {
        let slot = self
            .slots
            .get_mut(&kind)
            .ok_or(AgentError::UnknownResource { kind })?;
        let remaining = slot.level.checked_sub(amount).ok_or(
            AgentError::InsufficientResource { kind, needed: amount, available: slot.level },
        )?;
        slot.level = remaining;
        Ok(())
    }

    /// Deposit a delivery, saturating at capacity. Returns the amount that
    /// actually fit.
    pub fn deposit(&mut self, kind: ResourceKind, amount: u32) -> Result<u32, AgentError> {
        let slot = self
            .slots
            .get_mut(&kind)
            .ok_or(AgentError::UnknownResource { kind })?;
        let fitted = amount.min(slot.capacity.saturating_sub(slot.level));
        slot.level = slot.level.saturating_add(fitted);
        Ok(fitted)
    }

    /// Whether a material has fallen below the low-water fraction of its
    /// capacity.
    pub fn is_low(&self, kind: ResourceKind) -> bool {
        self.slots.get(&kind).is_some_and(|slot| {
            f64::from(slot.level) < f64::from(slot.capacity) * RESOURCE_LOW_FRACTION
        })
    }

    /// Materials currently below their low-water mark, in a stable order.
    pub fn depleted(&self) -> Vec<ResourceKind> {
        self.slots.keys().copied().filter(|kind| self.is_low(*kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_tank() -> Inventory {
        Inventory::new().with_slot(ResourceKind::Water, 200)
    }

    #[test]
    fn slots_start_full() {
        let inv = water_tank();
        assert_eq!(inv.level(ResourceKind::Water), 200);
        assert_eq!(inv.capacity(ResourceKind::Water), 200);
        assert!(!inv.is_low(ResourceKind::Water));
    }

    #[test]
    fn take_is_all_or_nothing() {
        let mut inv = water_tank();
        assert!(inv.take(ResourceKind::Water, 150).is_ok());
        assert_eq!(
            inv.take(ResourceKind::Water, 60),
            Err(AgentError::InsufficientResource {
                kind: ResourceKind::Water,
                needed: 60,
                available: 50,
            })
        );
        assert_eq!(inv.level(ResourceKind::Water), 50);
    }

    #[test]
    fn unknown_material_is_an_error() {
        let mut inv = water_tank();
        assert_eq!(
            inv.take(ResourceKind::Seeds, 1),
            Err(AgentError::UnknownResource { kind: ResourceKind::Seeds })
        );
        assert!(!inv.carries(ResourceKind::Seeds));
    }

    #[test]
    fn deposit_saturates_at_capacity() {
        let mut inv = water_tank();
        inv.take(ResourceKind::Water, 180).unwrap_or(());
        let fitted = inv.deposit(ResourceKind::Water, 500).unwrap_or(0);
        assert_eq!(fitted, 180);
        assert_eq!(inv.level(ResourceKind::Water), 200);
    }

    #[test]
    fn low_water_mark_at_fifteen_percent() {
        let mut inv = water_tank();
        inv.take(ResourceKind::Water, 170).unwrap_or(());
        assert!(!inv.is_low(ResourceKind::Water)); // 30/200 = 15%, not below
        inv.take(ResourceKind::Water, 1).unwrap_or(());
        assert!(inv.is_low(ResourceKind::Water));
        assert_eq!(inv.depleted(), vec![ResourceKind::Water]);
    }
}

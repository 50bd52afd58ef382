//! Battery tracking for mobile and sensing agents.
//!
//! Energy is a float percentage of capacity. Sensing costs a small random
//! amount per scan; travel costs scale with distance. A battery below its
//! low-water mark triggers a recharge negotiation, and delivered charge
//! saturates at capacity.

use rand::Rng;

/// Battery percentage at or below which an agent requests a recharge.
pub const ENERGY_LOW_WATER: f64 = 40.0;

/// An agent battery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battery {
    level: f64,
    capacity: f64,
}

impl Battery {
    /// A full battery of the given capacity.
    pub fn new(capacity: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self { level: capacity, capacity }
    }

    /// Current charge.
    pub const fn level(&self) -> f64 {
        self.level
    }

    /// Maximum charge.
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Spend a fixed amount of energy, flooring at zero.
    pub const fn drain(&mut self, amount: f64) {
        self.level = (self.level - amount.max(0.0)).max(0.0);
    }

    /// Spend the per-scan sensing cost: uniform between 0 and 1 percent.
    pub fn drain_scan<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let cost: f64 = rng.random_range(0.0..1.0);
        self.drain(cost);
        cost
    }

    /// Absorb a delivered charge, saturating at capacity. Returns the new
    /// level.
    pub const fn recharge(&mut self, delivered: f64) -> f64 {
        self.level = (self.level + delivered.max(0.0)).min(self.capacity);
        self.level
    }

    /// Whether the charge sits at or below the low-water mark.
    pub fn is_low(&self) -> bool {
        self.level <= ENERGY_LOW_WATER
    }

    /// How much charge is missing from a full battery.
    pub const fn deficit(&self) -> f64 {
        self.capacity - self.level
    }
}

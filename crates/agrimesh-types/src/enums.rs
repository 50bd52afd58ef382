//! Enumeration types shared across the Agrimesh workspace.
//!
//! These are the closed vocabularies of the simulation: calendar seasons,
//! rain intensities, crop kinds and growth stages, task and recharge types,
//! negotiation priorities, and CFP lifecycle states.

use serde::{Deserialize, Serialize};

/// The four calendar seasons (northern-hemisphere mapping of day-of-year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Days 80..172.
    Spring,
    /// Days 172..264.
    Summer,
    /// Days 264..355.
    Autumn,
    /// Days 355..=365 and 1..80.
    Winter,
}

impl Season {
    /// Derive the season from a day of the year (1..=365).
    ///
    /// Out-of-range days fall into winter, matching the wrap-around of the
    /// simulation calendar.
    pub const fn from_day(day: u32) -> Self {
        if day >= 80 && day < 172 {
            Self::Spring
        } else if day >= 172 && day < 264 {
            Self::Summer
        } else if day >= 264 && day < 355 {
            Self::Autumn
        } else {
            Self::Winter
        }
    }
}

/// Rain intensity levels of the 4-state precipitation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainIntensity {
    /// No precipitation.
    Dry,
    /// Light rain (1 mm/h).
    Light,
    /// Moderate rain (3 mm/h).
    Moderate,
    /// Heavy rain (5 mm/h).
    Heavy,
}

impl RainIntensity {
    /// All intensities in ascending order, indexable by state number 0..=3.
    pub const ALL: [Self; 4] = [Self::Dry, Self::Light, Self::Moderate, Self::Heavy];

    /// Return the state index (0 = dry .. 3 = heavy).
    pub const fn index(self) -> usize {
        match self {
            Self::Dry => 0,
            Self::Light => 1,
            Self::Moderate => 2,
            Self::Heavy => 3,
        }
    }

    /// Map a state index back to an intensity. Indexes above 3 saturate to
    /// [`Self::Heavy`].
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Dry,
            1 => Self::Light,
            2 => Self::Moderate,
            _ => Self::Heavy,
        }
    }

    /// Whether any rain is falling.
    pub const fn is_raining(self) -> bool {
        !matches!(self, Self::Dry)
    }
}

/// The six crop kinds the field can grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropKind {
    /// Kind 0.
    Tomato,
    /// Kind 1.
    Pepper,
    /// Kind 2.
    Wheat,
    /// Kind 3.
    Cabbage,
    /// Kind 4.
    Lettuce,
    /// Kind 5.
    Carrot,
}

impl CropKind {
    /// All crop kinds, indexable by kind number 0..=5.
    pub const ALL: [Self; 6] = [
        Self::Tomato,
        Self::Pepper,
        Self::Wheat,
        Self::Cabbage,
        Self::Lettuce,
        Self::Carrot,
    ];

    /// Return the kind index (0..=5) used by the parameter tables.
    pub const fn index(self) -> usize {
        match self {
            Self::Tomato => 0,
            Self::Pepper => 1,
            Self::Wheat => 2,
            Self::Cabbage => 3,
            Self::Lettuce => 4,
            Self::Carrot => 5,
        }
    }
}

/// Growth stage of a crop cell.
///
/// Stages only advance forward; the only resets are harvest (to
/// [`Self::Empty`]), replanting (to [`Self::Seed`]), and plant death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStage {
    /// Stage 0: nothing planted.
    Empty,
    /// Stage 1: seed in the ground.
    Seed,
    /// Stage 2: germinating.
    Germinating,
    /// Stage 3: vegetative growth.
    Vegetative,
    /// Stage 4: mature, ready for harvest.
    Mature,
}

impl CropStage {
    /// Return the stage index (0..=4).
    pub const fn index(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Seed => 1,
            Self::Germinating => 2,
            Self::Vegetative => 3,
            Self::Mature => 4,
        }
    }

    /// The next stage in the growth sequence; [`Self::Mature`] is terminal.
    pub const fn next(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Seed => Self::Germinating,
            Self::Germinating => Self::Vegetative,
            Self::Vegetative | Self::Mature => Self::Mature,
        }
    }

    /// Whether a plant occupies the cell.
    pub const fn is_planted(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// Field-intervention task types carried by `cfp_task` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Irrigate every cell of the zone.
    #[serde(rename = "irrigation_application")]
    Irrigation,
    /// Fertilize every cell of the zone.
    #[serde(rename = "fertilize_application")]
    Fertilize,
    /// Harvest mature cells of the zone.
    #[serde(rename = "harvest_application")]
    Harvest,
    /// Plant seeds into the cells of the zone.
    #[serde(rename = "plant_application")]
    Plant,
}

/// Resource types carried by `cfp_recharge` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RechargeKind {
    /// Battery energy (percent points).
    Battery,
    /// Machine fuel.
    Fuel,
    /// Seeds for planting.
    Seeds,
    /// Pesticide charges.
    Pesticides,
    /// Fertilizer stock.
    Fertilizer,
    /// Water stock.
    Water,
}

/// Material resources an agent can carry in its inventory.
///
/// Battery energy is tracked separately (it is a float percentage, not a
/// counted material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Irrigation water.
    Water,
    /// Fertilizer stock.
    Fertilizer,
    /// Seeds for planting.
    Seeds,
    /// Pesticide charges.
    Pesticide,
    /// Machine fuel.
    Fuel,
}

impl ResourceKind {
    /// The recharge task type that replenishes this resource.
    pub const fn recharge_kind(self) -> RechargeKind {
        match self {
            Self::Water => RechargeKind::Water,
            Self::Fertilizer => RechargeKind::Fertilizer,
            Self::Seeds => RechargeKind::Seeds,
            Self::Pesticide => RechargeKind::Pesticides,
            Self::Fuel => RechargeKind::Fuel,
        }
    }
}

/// Priority attached to a CFP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Routine maintenance.
    Low,
    /// Normal field work.
    Medium,
    /// Deficit remediation.
    High,
    /// Critical (e.g. battery about to die).
    Urgent,
}

/// Lifecycle state of a CFP record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfpStatus {
    /// Created, not yet broadcast.
    Open,
    /// Broadcast; proposals are being collected.
    CollectingProposals,
    /// A winner was selected and accepted.
    Assigned,
    /// The winner is executing the task.
    Executing,
    /// The task completed successfully.
    Done,
    /// The task failed (no proposals, execution failure, ...).
    Failed,
    /// The collection or execution deadline elapsed.
    Expired,
}

impl CfpStatus {
    /// Whether the CFP has reached a terminal state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Expired)
    }
}

/// Completion status reported in `Done`/`failure` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The task completed and resources were consumed.
    Done,
    /// The task could not be completed; nothing was debited.
    Failed,
}

/// The role an agent plays in the farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Stationary soil monitor issuing irrigation/fertilize CFPs.
    SoilSensor,
    /// Aerial crop monitor issuing harvest/plant CFPs and applying pesticide.
    Drone,
    /// Mobile irrigation executor.
    Irrigation,
    /// Mobile fertilizer executor.
    Fertilizer,
    /// Mobile harvest/plant executor.
    Harvester,
    /// Resource courier servicing recharge CFPs.
    Logistics,
    /// Yield warehouse receiving harvest deliveries.
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_boundaries() {
        assert_eq!(Season::from_day(79), Season::Winter);
        assert_eq!(Season::from_day(80), Season::Spring);
        assert_eq!(Season::from_day(171), Season::Spring);
        assert_eq!(Season::from_day(172), Season::Summer);
        assert_eq!(Season::from_day(263), Season::Summer);
        assert_eq!(Season::from_day(264), Season::Autumn);
        assert_eq!(Season::from_day(354), Season::Autumn);
        assert_eq!(Season::from_day(355), Season::Winter);
        assert_eq!(Season::from_day(5), Season::Winter);
    }

    #[test]
    fn rain_intensity_index_roundtrip() {
        for intensity in RainIntensity::ALL {
            assert_eq!(RainIntensity::from_index(intensity.index()), intensity);
        }
        assert!(!RainIntensity::Dry.is_raining());
        assert!(RainIntensity::Light.is_raining());
    }

    #[test]
    fn crop_stage_advances_and_saturates() {
        assert_eq!(CropStage::Seed.next(), CropStage::Germinating);
        assert_eq!(CropStage::Vegetative.next(), CropStage::Mature);
        assert_eq!(CropStage::Mature.next(), CropStage::Mature);
        assert_eq!(CropStage::Empty.next(), CropStage::Empty);
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn task_kind_wire_names() {
        let json = serde_json::to_string(&TaskKind::Irrigation).unwrap_or_default();
        assert_eq!(json, "\"irrigation_application\"");
        let json = serde_json::to_string(&TaskKind::Fertilize).unwrap_or_default();
        assert_eq!(json, "\"fertilize_application\"");
    }

    #[test]
    fn terminal_states() {
        assert!(CfpStatus::Done.is_terminal());
        assert!(CfpStatus::Failed.is_terminal());
        assert!(CfpStatus::Expired.is_terminal());
        assert!(!CfpStatus::Assigned.is_terminal());
    }

    #[test]
    fn crop_kind_indices_match_tables() {
        for (i, kind) in CropKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}

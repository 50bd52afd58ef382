//! Simulation assembly and the tick loop.
//!
//! `Simulation::new` builds the field and the fleet from a
//! [`SimulationConfig`]; `run` spawns every agent task and then drives the
//! environment clock until `max_ticks` is reached (or forever).

use std::time::Duration;

use agrimesh_agents::{AgentState, Inventory};
use agrimesh_field::Field;
use agrimesh_protocol::MessageBus;
use agrimesh_types::{AgentId, AgentRole, GridPos, ResourceKind, TaskKind, Zone};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::SimulationConfig;
use crate::roles;
use crate::roles::common::AgentDirectory;
use crate::roles::logistics::LogisticsState;
use crate::shared::FieldHandle;

/// A fully assembled farm: shared field, message bus, and fleet roster.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    bus: MessageBus,
    field: FieldHandle,
    directory: AgentDirectory,
}

impl Simulation {
    /// Build the field and the agent roster from a configuration.
    pub fn new(config: SimulationConfig) -> Self {
        let field = Field::new(
            config.grid_size(),
            config.initial_moisture,
            config.initial_nutrients,
        );
        let field = FieldHandle::new(field, config.seed);
        let directory = build_directory(&config);
        Self { config, bus: MessageBus::default(), field, directory }
    }

    /// Handle to the shared field, for inspection.
    pub const fn field(&self) -> &FieldHandle {
        &self.field
    }

    /// The agent roster.
    pub const fn directory(&self) -> &AgentDirectory {
        &self.directory
    }

    /// Spawn every agent and drive the tick loop.
    pub async fn run(self) {
        let tasks = self.spawn_fleet();
        info!(
            rows = self.config.rows,
            cols = self.config.cols,
            agents = tasks.len(),
            seed = self.config.seed,
            "simulation started"
        );

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut tick: u64 = 0;
        loop {
            ticker.tick().await;
            self.field.step(self.config.tick_hours).await;
            tick = tick.saturating_add(1);
            if tick.checked_rem(24) == Some(0) {
                info!(tick, clock = ?self.field.clock_info().await.data, "day boundary");
            }
            if self.config.max_ticks.is_some_and(|max| tick >= max) {
                break;
            }
        }

        for task in tasks {
            task.abort();
        }
        info!(tick, "simulation stopped");
    }

    fn spawn_fleet(&self) -> Vec<JoinHandle<()>> {
        let config = &self.config;
        let origin = GridPos::new(0, 0);
        let mut tasks = Vec::new();

        if let Some(storage) = &self.directory.storage {
            tasks.push(roles::storage::spawn(self.bus.clone(), storage.clone()));
        }

        for id in &self.directory.logistics {
            let state = LogisticsState::new(
                id.clone(),
                origin,
                config.battery_capacity,
                f64::from(config.capacities.depot),
            );
            tasks.push(roles::logistics::spawn(
                self.bus.clone(),
                state,
                Duration::from_millis(config.scan_interval_ms),
                config.depot_restock_per_cycle,
            ));
        }

        for id in &self.directory.irrigation {
            let state = AgentState::new(
                id.clone(),
                AgentRole::Irrigation,
                origin,
                config.battery_capacity,
                Inventory::new().with_slot(ResourceKind::Water, config.capacities.water),
            );
            tasks.push(self.spawn_executor(state, vec![TaskKind::Irrigation]));
        }
        for id in &self.directory.fertilizer {
            let state = AgentState::new(
                id.clone(),
                AgentRole::Fertilizer,
                origin,
                config.battery_capacity,
                Inventory::new().with_slot(ResourceKind::Fertilizer, config.capacities.fertilizer),
            );
            tasks.push(self.spawn_executor(state, vec![TaskKind::Fertilize]));
        }
        for id in &self.directory.harvester {
            let state = AgentState::new(
                id.clone(),
                AgentRole::Harvester,
                origin,
                config.battery_capacity,
                Inventory::new().with_slot(ResourceKind::Seeds, config.capacities.seeds),
            );
            tasks.push(self.spawn_executor(state, vec![TaskKind::Harvest, TaskKind::Plant]));
        }

        let sensor = AgentState::new(
            AgentId::from("soil-sensor-0"),
            AgentRole::SoilSensor,
            origin,
            config.battery_capacity,
            Inventory::new(),
        );
        let zones: Vec<Zone> = (0..config.cols).map(|col| Zone::Column { col }).collect();
        let sensor_rng = roles::common::agent_rng(config.seed, &sensor.id);
        tasks.push(roles::soil_sensor::spawn(
            self.bus.clone(),
            self.field.clone(),
            self.directory.clone(),
            sensor,
            zones,
            Duration::from_millis(config.scan_interval_ms),
            sensor_rng,
        ));

        let drone = AgentState::new(
            AgentId::from("drone-0"),
            AgentRole::Drone,
            origin,
            config.battery_capacity,
            Inventory::new().with_slot(ResourceKind::Pesticide, config.capacities.pesticide),
        );
        let drone_rng = roles::common::agent_rng(config.seed, &drone.id);
        tasks.push(roles::drone::spawn(
            self.bus.clone(),
            self.field.clone(),
            self.directory.clone(),
            drone,
            Duration::from_millis(config.scan_interval_ms),
            drone_rng,
        ));

        tasks
    }

    fn spawn_executor(&self, state: AgentState, accepts: Vec<TaskKind>) -> JoinHandle<()> {
        let rng = roles::common::agent_rng(self.config.seed, &state.id);
        roles::executor::spawn(
            self.bus.clone(),
            self.field.clone(),
            self.directory.clone(),
            state,
            accepts,
            rng,
        )
    }
}

fn build_directory(config: &SimulationConfig) -> AgentDirectory {
    let pool = |prefix: &str, count: usize| -> Vec<AgentId> {
        (0..count).map(|i| AgentId::new(format!("{prefix}-{i}"))).collect()
    };
    AgentDirectory {
        irrigation: pool("irrigation", config.fleet.irrigation),
        fertilizer: pool("fertilizer", config.fleet.fertilizer),
        harvester: pool("harvester", config.fleet.harvester),
        logistics: pool("logistics", config.fleet.logistics),
        storage: Some(AgentId::from("storage-0")),
    }
}

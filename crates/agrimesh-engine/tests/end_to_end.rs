//! Full negotiation rounds over a live field: sensor to executor to soil,
//! and agent to logistics courier for replenishment.

use std::time::Duration;

use agrimesh_agents::{AgentState, Inventory, evaluate_soil};
use agrimesh_engine::roles::{self, common::AgentDirectory};
use agrimesh_engine::shared::FieldHandle;
use agrimesh_field::Field;
use agrimesh_protocol::{EXECUTION_TIMEOUT, MessageBus, PROPOSAL_COLLECTION_TIMEOUT};
use agrimesh_types::{
    AgentId, AgentRole, GridPos, GridSize, RechargeKind, ResourceKind, SoilReading, TaskKind, Zone,
};

fn read_soil(data: Option<serde_json::Value>) -> Option<SoilReading> {
    data.and_then(|value| serde_json::from_value(value).ok())
}

#[tokio::test]
async fn nutrient_deficit_is_fixed_through_negotiation() {
    // Moisture is fine, nutrients sit exactly on the threshold: the scan
    // must produce a single fertilization round and nothing else.
    let field = Field::new(GridSize::new(2, 2), 70.0, 50.0);
    let field = FieldHandle::new(field, 7);
    let bus = MessageBus::default();

    let fertilizer_id = AgentId::from("fertilizer-0");
    let directory = AgentDirectory {
        fertilizer: vec![fertilizer_id.clone()],
        ..AgentDirectory::default()
    };

    let executor = AgentState::new(
        fertilizer_id.clone(),
        AgentRole::Fertilizer,
        GridPos::new(0, 0),
        100.0,
        Inventory::new().with_slot(ResourceKind::Fertilizer, 100),
    );
    let worker = roles::executor::spawn(
        bus.clone(),
        field.clone(),
        directory.clone(),
        executor,
        vec![TaskKind::Fertilize],
        roles::common::agent_rng(7, &fertilizer_id),
    );

    let mut sensor = AgentState::new(
        AgentId::from("soil-sensor-0"),
        AgentRole::SoilSensor,
        GridPos::new(0, 0),
        100.0,
        Inventory::new(),
    );
    let mut inbox = bus.register(&sensor.id);
    let zone = Zone::Column { col: 0 };

    let before = read_soil(field.soil_reading(zone).await.data);
    assert!(matches!(before, Some(reading) if reading.nutrients <= 50.0));
    let actions = before.map(|reading| evaluate_soil(&reading)).unwrap_or_default();
    assert_eq!(actions.len(), 1);
    assert!(matches!(actions.first(), Some(action) if action.task == TaskKind::Fertilize));

    let mut sensor_rng = roles::common::agent_rng(7, &sensor.id);
    roles::soil_sensor::scan_once(
        &bus,
        &mut inbox,
        &field,
        &directory,
        &mut sensor,
        &[zone],
        &mut sensor_rng,
    )
    .await;

    let after = read_soil(field.soil_reading(zone).await.data);
    assert!(matches!(after, Some(reading) if reading.nutrients > 50.0));
    // The untouched column keeps its starting level.
    let other = read_soil(field.soil_reading(Zone::Column { col: 1 }).await.data);
    assert!(matches!(other, Some(reading) if (reading.nutrients - 50.0).abs() < f64::EPSILON));

    worker.abort();
}

#[tokio::test]
async fn failed_execution_debits_nothing() {
    use agrimesh_protocol::{Completion, await_completion, run_round};
    use agrimesh_types::{Cfp, CfpRequest, Priority, ResourceRequirement};

    let field = FieldHandle::new(Field::new(GridSize::new(2, 2), 60.0, 70.0), 3);
    let bus = MessageBus::default();
    let worker_id = AgentId::from("irrigation-0");
    let directory = AgentDirectory {
        irrigation: vec![worker_id.clone()],
        ..AgentDirectory::default()
    };
    // The tank holds exactly one task's worth of water.
    let worker = roles::executor::spawn(
        bus.clone(),
        field.clone(),
        directory.clone(),
        AgentState::new(
            worker_id.clone(),
            AgentRole::Irrigation,
            GridPos::new(0, 0),
            100.0,
            Inventory::new().with_slot(ResourceKind::Water, 10),
        ),
        vec![TaskKind::Irrigation],
        roles::common::agent_rng(3, &worker_id),
    );

    let requester = AgentId::from("soil-sensor-0");
    let mut inbox = bus.register(&requester);
    let irrigation_cfp = |zone: Zone| {
        Cfp::new(
            requester.clone(),
            CfpRequest::Task {
                task: TaskKind::Irrigation,
                zone,
                dose: Some(10.0),
                seed_kind: None,
            },
            vec![ResourceRequirement::new(ResourceKind::Water, 10)],
            Priority::High,
        )
    };

    // An off-grid zone: the environment rejects the call and the water
    // must be refunded.
    let mut doomed = irrigation_cfp(Zone::Column { col: 9 });
    let awarded =
        run_round(&bus, &mut inbox, &mut doomed, &directory.irrigation, PROPOSAL_COLLECTION_TIMEOUT)
            .await;
    assert!(awarded.is_ok());
    let completion = await_completion(&mut inbox, &mut doomed, EXECUTION_TIMEOUT).await;
    assert!(matches!(completion, Ok(Completion::Failed { .. })));

    // The refunded tank covers a second, valid round.
    let mut retry = irrigation_cfp(Zone::Column { col: 1 });
    let awarded =
        run_round(&bus, &mut inbox, &mut retry, &directory.irrigation, PROPOSAL_COLLECTION_TIMEOUT)
            .await;
    assert!(awarded.is_ok());
    let completion = await_completion(&mut inbox, &mut retry, EXECUTION_TIMEOUT).await;
    assert!(matches!(completion, Ok(Completion::Done { .. })));

    worker.abort();
}

#[tokio::test]
async fn low_battery_is_refilled_by_the_courier() {
    let bus = MessageBus::default();
    let courier_id = AgentId::from("logistics-0");
    let courier = roles::logistics::LogisticsState::new(
        courier_id.clone(),
        GridPos::new(0, 0),
        100.0,
        500.0,
    );
    let task = roles::logistics::spawn(bus.clone(), courier, Duration::from_secs(60), 10);

    let mut agent = AgentState::new(
        AgentId::from("drone-0"),
        AgentRole::Drone,
        GridPos::new(2, 2),
        100.0,
        Inventory::new(),
    );
    agent.battery.drain(62.0);
    assert!(agent.battery.is_low());
    let mut inbox = bus.register(&agent.id);

    let deficit = agent.battery.deficit();
    let delivered = roles::common::request_recharge(
        &bus,
        &mut inbox,
        &mut agent,
        std::slice::from_ref(&courier_id),
        RechargeKind::Battery,
        deficit,
        PROPOSAL_COLLECTION_TIMEOUT,
        EXECUTION_TIMEOUT,
    )
    .await;

    assert!(delivered);
    assert!((agent.battery.level() - 100.0).abs() < f64::EPSILON);
    task.abort();
}

#[tokio::test]
async fn depleted_stock_makes_the_courier_decline() {
    let bus = MessageBus::default();
    let courier_id = AgentId::from("logistics-0");
    // Zero depot stock: the courier must not bid, so the round collapses.
    let courier = roles::logistics::LogisticsState::new(
        courier_id.clone(),
        GridPos::new(0, 0),
        100.0,
        0.0,
    );
    let task = roles::logistics::spawn(bus.clone(), courier, Duration::from_secs(60), 0);

    let mut agent = AgentState::new(
        AgentId::from("irrigation-0"),
        AgentRole::Irrigation,
        GridPos::new(0, 0),
        100.0,
        Inventory::new().with_slot(ResourceKind::Water, 10),
    );
    let mut inbox = bus.register(&agent.id);
    let _ = agent.inventory.take(ResourceKind::Water, 10);

    let delivered = roles::common::request_recharge(
        &bus,
        &mut inbox,
        &mut agent,
        std::slice::from_ref(&courier_id),
        RechargeKind::Water,
        10.0,
        Duration::from_millis(200),
        EXECUTION_TIMEOUT,
    )
    .await;

    assert!(!delivered);
    assert_eq!(agent.inventory.level(ResourceKind::Water), 0);
    task.abort();
}

//! Mobility Scenario Tests
//!
//! Drives UEs through the corridor with the real mobility task and checks
//! what the simulation state and a dispatcher listener observe.

use integration_tests::{init_test_logging, TestSimulation};
use ransim_common::UpdateType;
use ransim_sim::{EventPayload, MobilityTask, TickSummary};

#[tokio::test]
async fn test_listener_sees_moves_in_order() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let mut rx = sim.task_base.dispatcher.register("observer").await.unwrap();
    let task = MobilityTask::new(sim.task_base.clone(), sim.generator.clone());

    for _ in 0..3 {
        task.tick().await.unwrap();
    }

    let mut kinds = Vec::new();
    let mut serving = Vec::new();
    for _ in 0..3 {
        let event = rx.recv().await.unwrap();
        kinds.push(event.update_type);
        match event.payload {
            EventPayload::Ue(ue) => serving.push(ue.serving_tower().to_string()),
            other => panic!("expected a UE update, got {other:?}"),
        }
    }

    assert_eq!(
        kinds,
        vec![
            Some(UpdateType::Position),
            Some(UpdateType::Position),
            Some(UpdateType::Tower),
        ]
    );
    // Tower-1 keeps serving while it is among the three nearest
    assert_eq!(serving, vec!["Tower-1", "Tower-1", "Tower-3"]);
}

#[tokio::test]
async fn test_full_route_traversal() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let task = MobilityTask::new(sim.task_base.clone(), sim.generator.clone());
    let waypoints = sim.generator.waypoints;

    let mut total = TickSummary::default();
    for _ in 0..waypoints - 1 {
        let summary = task.tick().await.unwrap();
        total.moved += summary.moved;
        total.handovers += summary.handovers;
        total.routes_replaced += summary.routes_replaced;
    }
    assert_eq!(total.moved + total.handovers, waypoints - 1);
    assert!(total.handovers >= 1);
    assert_eq!(total.routes_replaced, 0);

    let finish = {
        let state = sim.task_base.state.read().await;
        let ue = &state.ues()[0];
        let route = state.route_by_name(&ue.route).unwrap();
        assert_eq!(route.finish(), Some(&ue.position));
        assert!(["Tower-3", "Tower-4", "Tower-5"].contains(&ue.serving_tower()));
        ue.position
    };

    // at the last waypoint the next tick only replaces the route
    let summary = task.tick().await.unwrap();
    assert_eq!(summary.routes_replaced, 1);
    assert_eq!(summary.moved + summary.handovers, 0);

    let state = sim.task_base.state.read().await;
    let ue = &state.ues()[0];
    let route = state.route_by_name("Route-0").unwrap();
    assert_eq!(ue.route, "Route-0");
    assert_eq!(ue.position, finish);
    assert_eq!(route.start(), Some(&finish));
    assert_eq!(route.waypoints.len(), waypoints);
    assert_eq!(state.tick().value(), waypoints as u64);
}

#[tokio::test]
async fn test_every_ue_stays_on_its_route() {
    init_test_logging();
    let sim = TestSimulation::corridor(3).await.unwrap();
    let task = MobilityTask::new(sim.task_base.clone(), sim.generator.clone());

    for _ in 0..25 {
        task.tick().await.unwrap();
    }

    let state = sim.task_base.state.read().await;
    assert_eq!(state.tick().value(), 25);
    for (index, ue) in state.ues().iter().enumerate() {
        let route = &state.routes()[index];
        assert_eq!(ue.route, route.name);
        assert!(route.index_of(&ue.position).is_some());
        assert!(state.tower_by_name(ue.serving_tower()).is_some());
        assert!(ue.cells.second.is_some());
        assert!(ue.cells.third.is_some());
    }
}

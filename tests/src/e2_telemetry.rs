//! E2 Telemetry Integration Tests
//!
//! Runs the E2 server and the mobility loop against a mock controller
//! holding a telemetry session:
//! - Handovers arrive as radio measurement reports
//! - Only one telemetry session is served at a time
//! - Disconnecting frees the dispatcher listener

use integration_tests::{
    init_test_logging, wait_for_condition, MockController, TestSimulation, DEFAULT_POLL_INTERVAL,
    DEFAULT_TEST_TIMEOUT,
};
use ransim_common::TEST_PLMN_ID;
use ransim_e2::SessionKind;
use ransim_sim::TELEMETRY_LISTENER;
use tokio::sync::watch;

async fn wait_for_listener(sim: &TestSimulation, registered: bool) {
    let dispatcher = sim.task_base.dispatcher.clone();
    wait_for_condition(
        || {
            let dispatcher = dispatcher.clone();
            async move { dispatcher.is_registered(TELEMETRY_LISTENER).await == registered }
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .expect("telemetry listener state did not change");
}

/// Ue-0 starts next to Tower-1 and loses it from its three nearest towers on
/// the third move, where Tower-3 takes over with Tower-2 and Tower-4 as
/// candidates.
#[tokio::test]
async fn test_handover_is_reported() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let server = sim.start_server().await.unwrap();

    let mut controller = MockController::connect(server.addr, SessionKind::Telemetry)
        .await
        .unwrap();
    wait_for_listener(&sim, true).await;

    let (mobility_tx, mobility_rx) = watch::channel(false);
    let mobility = sim.start_mobility(mobility_rx);

    let report = controller
        .next_measurement_report(DEFAULT_TEST_TIMEOUT)
        .await
        .unwrap();
    tracing::info!("Measurement report: {:?}", report);

    assert_eq!(report.crnti, "0001");
    assert_eq!(report.ecgi.plmn_id, TEST_PLMN_ID);
    assert_eq!(report.ecgi.ecid, "0000003");

    let ecids: Vec<&str> = report
        .radio_report_serv_cells
        .iter()
        .map(|cell| cell.ecgi.ecid.as_str())
        .collect();
    assert_eq!(ecids, vec!["0000003", "0000002", "0000004"]);
    assert!(report
        .radio_report_serv_cells
        .iter()
        .all(|cell| cell.cqi_hist.len() == 1 && cell.cqi_hist[0] <= 15));
    // serving tower is closest, CQI saturates
    assert_eq!(report.radio_report_serv_cells[0].cqi_hist, vec![15]);

    mobility_tx.send(true).unwrap();
    assert!(mobility.await.unwrap().is_ok());
    server.stop().await.unwrap();
    controller.wait_closed(DEFAULT_TEST_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_disconnect_unregisters_listener() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let server = sim.start_server().await.unwrap();

    let controller = MockController::connect(server.addr, SessionKind::Telemetry)
        .await
        .unwrap();
    wait_for_listener(&sim, true).await;
    assert_eq!(sim.task_base.dispatcher.listener_count().await, 1);

    drop(controller);
    wait_for_listener(&sim, false).await;
    assert_eq!(sim.task_base.dispatcher.listener_count().await, 0);

    // a new session can register again
    let _controller = MockController::connect(server.addr, SessionKind::Telemetry)
        .await
        .unwrap();
    wait_for_listener(&sim, true).await;

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_second_telemetry_session_is_refused() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let server = sim.start_server().await.unwrap();

    let mut first = MockController::connect(server.addr, SessionKind::Telemetry)
        .await
        .unwrap();
    wait_for_listener(&sim, true).await;

    let mut second = MockController::connect(server.addr, SessionKind::Telemetry)
        .await
        .unwrap();
    assert_eq!(second.kind(), SessionKind::Telemetry);
    second.wait_closed(DEFAULT_TEST_TIMEOUT).await.unwrap();

    // the first session is untouched
    assert!(sim.task_base.dispatcher.is_registered(TELEMETRY_LISTENER).await);
    assert_eq!(sim.task_base.dispatcher.listener_count().await, 1);

    server.stop().await.unwrap();
    first.wait_closed(DEFAULT_TEST_TIMEOUT).await.unwrap();
}

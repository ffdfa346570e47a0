//! E2 Control Integration Tests
//!
//! Runs the E2 server against a mock controller holding a control session:
//! - Cell configuration requests are answered from the simulation state
//! - Unknown and unhandled messages are ignored
//! - Connections must start with a session preamble

use integration_tests::{
    init_test_logging, MockController, TestSimulation, CORRIDOR_TOWERS, DEFAULT_TEST_TIMEOUT,
};
use ransim_common::{Ecgi, TEST_PLMN_ID};
use ransim_e2::{
    read_frame, write_frame, AdmEstCause, CellConfigRequest, ControlResponse, E2Pdu,
    SessionKind, UeAdmissionResponse,
};
use tokio::net::TcpStream;

fn ecgi(ecid: &str) -> Ecgi {
    Ecgi::new(TEST_PLMN_ID, ecid)
}

#[tokio::test]
async fn test_cell_config_request() {
    init_test_logging();
    let sim = TestSimulation::corridor(2).await.unwrap();
    let server = sim.start_server().await.unwrap();

    let mut controller = MockController::connect(server.addr, SessionKind::Control)
        .await
        .unwrap();
    let answer = controller
        .request_cell_config(CORRIDOR_TOWERS as usize, 2, DEFAULT_TEST_TIMEOUT)
        .await
        .unwrap();

    let reported: Vec<&str> = answer.reports.iter().map(|r| r.ecgi.ecid.as_str()).collect();
    assert_eq!(
        reported,
        vec!["0000001", "0000002", "0000003", "0000004", "0000005"]
    );
    assert!(answer.reports.iter().all(|r| r.max_num_connected_ues == 5));

    // row of towers: only left and right neighbours
    assert_eq!(answer.reports[0].cand_scells, vec![ecgi("0000002")]);
    assert_eq!(
        answer.reports[2].cand_scells,
        vec![ecgi("0000002"), ecgi("0000004")]
    );
    assert_eq!(answer.reports[4].cand_scells, vec![ecgi("0000004")]);

    assert_eq!(answer.admissions.len(), 2);
    assert_eq!(answer.admissions[0].ecgi, ecgi("0000001"));
    assert_eq!(answer.admissions[0].crnti, "0001");
    assert_eq!(answer.admissions[1].ecgi, ecgi("0000002"));
    assert_eq!(answer.admissions[1].crnti, "0002");
    assert!(answer
        .admissions
        .iter()
        .all(|a| a.adm_est_cause == AdmEstCause::MoSignalling));

    server.stop().await.unwrap();
    controller.wait_closed(DEFAULT_TEST_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_unhandled_messages_are_ignored() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let server = sim.start_server().await.unwrap();

    let mut controller = MockController::connect(server.addr, SessionKind::Control)
        .await
        .unwrap();
    controller.send_unknown(200).await.unwrap();
    controller
        .send(
            &ControlResponse::UeAdmissionResponse(UeAdmissionResponse {
                ecgi: ecgi("0000001"),
                crnti: "0001".to_string(),
                admitted: true,
            })
            .into(),
        )
        .await
        .unwrap();

    // the session is still alive and answers in order
    let answer = controller
        .request_cell_config(CORRIDOR_TOWERS as usize, 1, DEFAULT_TEST_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(answer.reports.len(), CORRIDOR_TOWERS as usize);
    assert_eq!(answer.admissions.len(), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_connection_without_session_open_is_closed() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let server = sim.start_server().await.unwrap();

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let request: E2Pdu = ControlResponse::CellConfigRequest(CellConfigRequest).into();
    write_frame(&mut stream, &request).await.unwrap();

    let closed = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, read_frame(&mut stream))
        .await
        .unwrap();
    assert!(matches!(closed, Ok(None) | Err(_)));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_control_session_sees_moved_ue() {
    init_test_logging();
    let sim = TestSimulation::corridor(1).await.unwrap();
    let server = sim.start_server().await.unwrap();

    // three moves take Ue-0 from Tower-1 to Tower-3
    let mobility = ransim_sim::MobilityTask::new(sim.task_base.clone(), sim.generator.clone());
    for _ in 0..3 {
        mobility.tick().await.unwrap();
    }

    let mut controller = MockController::connect(server.addr, SessionKind::Control)
        .await
        .unwrap();
    let answer = controller
        .request_cell_config(CORRIDOR_TOWERS as usize, 1, DEFAULT_TEST_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(answer.admissions[0].ecgi, ecgi("0000003"));

    server.stop().await.unwrap();
}

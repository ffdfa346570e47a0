//! Telemetry session
//!
//! Streams a radio measurement report for every handover the mobility task
//! publishes. Position-only updates and route replacements are not reported.

use ransim_e2::{E2Pdu, RadioMeasReportPerUe, RadioRepPerServCell, TelemetryMessage};
use ransim_common::Ue;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::session::{next_inbound, send_loop, SessionError};
use crate::proximity::make_cqi;
use crate::state::SimState;
use crate::tasks::SimTaskBase;

/// Dispatcher listener name of the telemetry session.
///
/// Only one telemetry session can be open at a time.
pub const TELEMETRY_LISTENER: &str = "e2-telemetry";

/// Builds the measurement report for a UE snapshot.
///
/// Cells are reported serving first, then the candidates. Returns `None` if
/// the serving tower is unknown.
pub fn build_radio_meas_report(ue: &Ue, state: &SimState) -> Option<RadioMeasReportPerUe> {
    let serving = state.tower_by_name(ue.serving_tower())?;

    let mut cells = Vec::with_capacity(3);
    for cell in ue.cells.cells() {
        match state.tower_by_name(&cell.name) {
            Some(tower) => cells.push(RadioRepPerServCell {
                ecgi: tower.ecgi(),
                cqi_hist: vec![make_cqi(cell.distance)],
            }),
            None => warn!("{} reports unknown tower {}", ue.name, cell.name),
        }
    }

    Some(RadioMeasReportPerUe {
        ecgi: serving.ecgi(),
        crnti: ue.crnti.clone(),
        radio_report_serv_cells: cells,
    })
}

/// Runs a telemetry session until the peer disconnects or shutdown.
///
/// The dispatcher listener is released on every exit path.
pub async fn run_telemetry_session<R, W>(
    task_base: SimTaskBase,
    mut reader: R,
    writer: W,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), SessionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut events = task_base.dispatcher.register(TELEMETRY_LISTENER).await?;
    info!("Telemetry session started");

    let (queue_tx, queue_rx) = mpsc::channel(task_base.config.e2.channel_capacity.max(1));
    let mut sender = tokio::spawn(send_loop(writer, queue_rx));

    // The peer sends nothing on this session; reading only detects disconnect.
    let mut peer = tokio::spawn(async move {
        while let Some(pdu) = next_inbound(&mut reader, "telemetry").await? {
            debug!("Ignoring {:?} on telemetry session", pdu.message_type());
        }
        Ok::<(), SessionError>(())
    });

    let result = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break Ok(());
                };
                let Some(ue) = event.as_handover() else {
                    continue;
                };
                let report = {
                    let state = task_base.state.read().await;
                    build_radio_meas_report(ue, &state)
                };
                let Some(report) = report else {
                    warn!("No serving tower for {}, report skipped", ue.name);
                    continue;
                };
                debug!(
                    "Radio measurement report for {} ({}) on {}",
                    ue.name, report.crnti, report.ecgi
                );
                let pdu: E2Pdu = TelemetryMessage::RadioMeasReportPerUe(report).into();
                if queue_tx.send(pdu).await.is_err() {
                    break Err(SessionError::Aborted);
                }
            }
            done = &mut peer => {
                break match done {
                    Ok(result) => result,
                    Err(_) => Err(SessionError::Aborted),
                };
            }
            done = &mut sender => {
                break match done {
                    Ok(Ok(())) => Err(SessionError::Aborted),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(SessionError::Aborted),
                };
            }
            _ = shutdown_rx.changed() => break Ok(()),
        }
    };

    task_base.dispatcher.unregister(TELEMETRY_LISTENER).await;
    peer.abort();
    sender.abort();

    match &result {
        Ok(()) => info!("Telemetry session closed"),
        Err(e) => warn!("Telemetry session ended: {}", e),
    }
    result
}

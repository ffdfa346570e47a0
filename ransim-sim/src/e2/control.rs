//! Control session
//!
//! Answers a cell configuration request with one configuration report per
//! tower followed by one admission request per UE. Every other inbound
//! message is logged and ignored.

use ransim_common::Ecgi;
use ransim_e2::{
    AdmEstCause, CellConfigReport, ControlResponse, ControlUpdate, E2Pdu, UeAdmissionRequest,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::session::{next_inbound, pdu_name, send_loop, SessionError};
use crate::state::SimState;
use crate::tasks::SimTaskBase;

/// Builds the replies to a cell configuration request from one snapshot.
///
/// Towers come in name order, UEs in route index order.
pub fn cell_config_updates(state: &SimState) -> Vec<ControlUpdate> {
    let mut updates = Vec::with_capacity(state.tower_count() + state.ue_count());

    for tower in state.towers() {
        let cand_scells: Vec<Ecgi> = tower
            .neighbors
            .iter()
            .filter_map(|name| state.tower_by_name(name))
            .map(|neighbor| neighbor.ecgi())
            .collect();
        updates.push(ControlUpdate::CellConfigReport(CellConfigReport {
            ecgi: tower.ecgi(),
            max_num_connected_ues: tower.max_ues,
            cand_scells,
        }));
    }

    for ue in state.ues() {
        let Some(serving) = state.tower_by_name(ue.serving_tower()) else {
            warn!("{} has unknown serving tower {}", ue.name, ue.serving_tower());
            continue;
        };
        updates.push(ControlUpdate::UeAdmissionRequest(UeAdmissionRequest {
            ecgi: serving.ecgi(),
            crnti: ue.crnti.clone(),
            adm_est_cause: AdmEstCause::MoSignalling,
        }));
    }

    updates
}

/// Runs a control session until the peer disconnects or shutdown.
pub async fn run_control_session<R, W>(
    task_base: SimTaskBase,
    mut reader: R,
    writer: W,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), SessionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    info!("Control session started");
    let (queue_tx, queue_rx) = mpsc::channel(task_base.config.e2.channel_capacity.max(1));
    let mut sender = tokio::spawn(send_loop(writer, queue_rx));

    let result = loop {
        tokio::select! {
            inbound = next_inbound(&mut reader, "control") => {
                let pdu = match inbound {
                    Ok(Some(pdu)) => pdu,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                };
                match pdu {
                    E2Pdu::ControlResponse(ControlResponse::CellConfigRequest(_)) => {
                        let updates = {
                            let state = task_base.state.read().await;
                            cell_config_updates(&state)
                        };
                        info!("Cell config request: sending {} updates", updates.len());
                        if !enqueue_all(&queue_tx, updates).await {
                            break Err(SessionError::Aborted);
                        }
                    }
                    E2Pdu::ControlResponse(ControlResponse::UeAdmissionResponse(response)) => {
                        debug!(
                            "Admission response for {} on {}: admitted={}",
                            response.crnti, response.ecgi, response.admitted
                        );
                    }
                    other => warn!("Ignoring {} on control session", pdu_name(&other)),
                }
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

    sender.abort();
    match &result {
        Ok(()) => info!("Control session closed"),
        Err(e) => warn!("Control session ended: {}", e),
    }
    result
}

async fn enqueue_all(queue: &mpsc::Sender<E2Pdu>, updates: Vec<ControlUpdate>) -> bool {
    for update in updates {
        if queue.send(update.into()).await.is_err() {
            return false;
        }
    }
    true
}

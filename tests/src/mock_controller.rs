//! Mock E2 controller for integration testing
//!
//! Plays the controller side of one E2 connection: opens a telemetry or
//! control session and exchanges framed PDUs with the simulator.

use std::net::SocketAddr;
use std::time::Duration;

use ransim_e2::{
    read_frame, write_frame, CellConfigReport, CellConfigRequest, ControlResponse, ControlUpdate,
    E2CodecError, E2Pdu, RadioMeasReportPerUe, SessionKind, SessionOpen, TelemetryMessage,
    UeAdmissionRequest,
};
use thiserror::Error;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Mock controller errors
#[derive(Debug, Error)]
pub enum MockControllerError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[from] std::io::Error),
    #[error("Codec error: {0}")]
    Codec(#[from] E2CodecError),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Connection closed by the simulator")]
    Closed,
}

/// Everything the simulator sent in answer to a cell configuration request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellConfigAnswer {
    /// One report per tower
    pub reports: Vec<CellConfigReport>,
    /// One admission request per UE
    pub admissions: Vec<UeAdmissionRequest>,
}

/// Controller end of one E2 session
pub struct MockController {
    kind: SessionKind,
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
}

impl MockController {
    /// Connects to `addr` and opens a session of the given kind.
    pub async fn connect(addr: SocketAddr, kind: SessionKind) -> Result<Self, MockControllerError> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        let mut controller = Self {
            kind,
            reader,
            writer,
        };
        controller.send(&SessionOpen { kind }.into()).await?;
        debug!("Mock controller opened {:?} session to {}", kind, addr);
        Ok(controller)
    }

    /// Session kind requested at connect time
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Sends one PDU.
    pub async fn send(&mut self, pdu: &E2Pdu) -> Result<(), MockControllerError> {
        write_frame(&mut self.writer, pdu).await?;
        Ok(())
    }

    /// Sends a frame carrying a message type the simulator does not know.
    pub async fn send_unknown(&mut self, message_type: u8) -> Result<(), MockControllerError> {
        self.send(&E2Pdu::Unknown(message_type)).await
    }

    /// Waits up to `wait` for the next PDU; `None` once the simulator closed.
    pub async fn recv(&mut self, wait: Duration) -> Result<Option<E2Pdu>, MockControllerError> {
        match timeout(wait, read_frame(&mut self.reader)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(MockControllerError::Timeout(wait)),
        }
    }

    /// Waits for the next radio measurement report.
    pub async fn next_measurement_report(
        &mut self,
        wait: Duration,
    ) -> Result<RadioMeasReportPerUe, MockControllerError> {
        loop {
            match self.recv(wait).await? {
                Some(E2Pdu::Telemetry(TelemetryMessage::RadioMeasReportPerUe(report))) => {
                    return Ok(report)
                }
                Some(other) => debug!("Mock controller skipping {:?}", other),
                None => return Err(MockControllerError::Closed),
            }
        }
    }

    /// Requests the cell configuration and collects the answer.
    ///
    /// The simulator answers with `towers` reports followed by `ues`
    /// admission requests.
    pub async fn request_cell_config(
        &mut self,
        towers: usize,
        ues: usize,
        wait: Duration,
    ) -> Result<CellConfigAnswer, MockControllerError> {
        self.send(&ControlResponse::CellConfigRequest(CellConfigRequest).into())
            .await?;

        let mut answer = CellConfigAnswer::default();
        while answer.reports.len() + answer.admissions.len() < towers + ues {
            match self.recv(wait).await? {
                Some(E2Pdu::ControlUpdate(ControlUpdate::CellConfigReport(report))) => {
                    answer.reports.push(report)
                }
                Some(E2Pdu::ControlUpdate(ControlUpdate::UeAdmissionRequest(request))) => {
                    answer.admissions.push(request)
                }
                Some(other) => debug!("Mock controller skipping {:?}", other),
                None => return Err(MockControllerError::Closed),
            }
        }
        Ok(answer)
    }

    /// Waits until the simulator closes the connection.
    pub async fn wait_closed(&mut self, wait: Duration) -> Result<(), MockControllerError> {
        loop {
            match timeout(wait, read_frame(&mut self.reader)).await {
                Ok(Ok(None)) | Ok(Err(_)) => return Ok(()),
                Ok(Ok(Some(pdu))) => debug!("Mock controller draining {:?}", pdu),
                Err(_) => return Err(MockControllerError::Timeout(wait)),
            }
        }
    }
}

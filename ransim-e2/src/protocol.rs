//! E2 message types
//!
//! This module defines the messages exchanged between the simulator and a
//! near-real-time controller over the two E2 sessions:
//!
//! - the **telemetry** session carries `TelemetryMessage`s from the simulator
//! - the **control** session carries `ControlUpdate`s from the simulator and
//!   `ControlResponse`s from the controller

use std::fmt;

use ransim_common::Ecgi;

/// E2 protocol version information
pub mod version {
    /// Major version number
    pub const MAJOR: u8 = 1;
    /// Minor version number
    pub const MINOR: u8 = 0;
    /// Patch version number
    pub const PATCH: u8 = 0;
}

/// E2 message type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Session open preamble sent by the controller
    SessionOpen = 1,
    /// Controller asks for cell configuration
    CellConfigRequest = 2,
    /// Per-cell configuration report
    CellConfigReport = 3,
    /// UE admission request toward the controller
    UeAdmissionRequest = 4,
    /// Controller's answer to an admission request
    UeAdmissionResponse = 5,
    /// Controller-initiated handover
    HandoverRequest = 6,
    /// Per-UE radio measurement report
    RadioMeasReportPerUe = 7,
}

impl MessageType {
    /// Creates a MessageType from a u8 value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SessionOpen),
            2 => Some(Self::CellConfigRequest),
            3 => Some(Self::CellConfigReport),
            4 => Some(Self::UeAdmissionRequest),
            5 => Some(Self::UeAdmissionResponse),
            6 => Some(Self::HandoverRequest),
            7 => Some(Self::RadioMeasReportPerUe),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SessionOpen => "SessionOpen",
            Self::CellConfigRequest => "CellConfigRequest",
            Self::CellConfigReport => "CellConfigReport",
            Self::UeAdmissionRequest => "UeAdmissionRequest",
            Self::UeAdmissionResponse => "UeAdmissionResponse",
            Self::HandoverRequest => "HandoverRequest",
            Self::RadioMeasReportPerUe => "RadioMeasReportPerUe",
        };
        write!(f, "{name}")
    }
}

/// Which of the two E2 sessions a connection carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionKind {
    /// Simulator to controller measurement stream
    Telemetry = 1,
    /// Bidirectional configuration/admission stream
    Control = 2,
}

impl SessionKind {
    /// Creates a SessionKind from a u8 value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Telemetry),
            2 => Some(Self::Control),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Telemetry => write!(f, "telemetry"),
            Self::Control => write!(f, "control"),
        }
    }
}

/// RRC establishment cause carried in admission requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AdmEstCause {
    /// Emergency call
    Emergency = 0,
    /// High priority access
    HighPriorityAccess = 1,
    /// Mobile terminated access
    MtAccess = 2,
    /// Mobile originated signalling
    MoSignalling = 3,
    /// Mobile originated data
    MoData = 4,
}

impl AdmEstCause {
    /// Creates an AdmEstCause from a u8 value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Emergency),
            1 => Some(Self::HighPriorityAccess),
            2 => Some(Self::MtAccess),
            3 => Some(Self::MoSignalling),
            4 => Some(Self::MoData),
            _ => None,
        }
    }
}

/// Session open preamble, first frame on every connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOpen {
    /// Requested session
    pub kind: SessionKind,
}

/// Request for the configuration of every cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellConfigRequest;

/// Configuration of one cell and its handover candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellConfigReport {
    /// Reporting cell
    pub ecgi: Ecgi,
    /// Maximum number of connected UEs
    pub max_num_connected_ues: u32,
    /// Neighbouring cells
    pub cand_scells: Vec<Ecgi>,
}

/// Admission request for a UE at its serving cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeAdmissionRequest {
    /// Serving cell
    pub ecgi: Ecgi,
    /// UE radio identifier
    pub crnti: String,
    /// Establishment cause
    pub adm_est_cause: AdmEstCause,
}

/// Controller's answer to an admission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeAdmissionResponse {
    /// Serving cell
    pub ecgi: Ecgi,
    /// UE radio identifier
    pub crnti: String,
    /// Whether the UE was admitted
    pub admitted: bool,
}

/// Controller-initiated handover of a UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverRequest {
    /// UE radio identifier
    pub crnti: String,
    /// Source cell
    pub src_station: Ecgi,
    /// Target cell
    pub dst_station: Ecgi,
}

/// Channel quality history for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioRepPerServCell {
    /// Measured cell
    pub ecgi: Ecgi,
    /// CQI samples, newest last
    pub cqi_hist: Vec<u32>,
}

/// Radio measurement report for one UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioMeasReportPerUe {
    /// Serving cell
    pub ecgi: Ecgi,
    /// UE radio identifier
    pub crnti: String,
    /// Serving cell followed by the candidates
    pub radio_report_serv_cells: Vec<RadioRepPerServCell>,
}

/// Messages on the telemetry session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryMessage {
    /// Per-UE radio measurement report
    RadioMeasReportPerUe(RadioMeasReportPerUe),
}

/// Simulator-to-controller messages on the control session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlUpdate {
    /// Cell configuration report
    CellConfigReport(CellConfigReport),
    /// UE admission request
    UeAdmissionRequest(UeAdmissionRequest),
}

/// Controller-to-simulator messages on the control session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlResponse {
    /// Cell configuration request
    CellConfigRequest(CellConfigRequest),
    /// UE admission response
    UeAdmissionResponse(UeAdmissionResponse),
    /// Handover request
    HandoverRequest(HandoverRequest),
}

/// Any decoded E2 frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum E2Pdu {
    /// Session preamble
    SessionOpen(SessionOpen),
    /// Telemetry message
    Telemetry(TelemetryMessage),
    /// Control update
    ControlUpdate(ControlUpdate),
    /// Control response
    ControlResponse(ControlResponse),
    /// Frame with a message type this version does not know
    Unknown(u8),
}

impl E2Pdu {
    /// Returns the wire message type, or `None` for unknown frames
    pub fn message_type(&self) -> Option<MessageType> {
        let mt = match self {
            Self::SessionOpen(_) => MessageType::SessionOpen,
            Self::Telemetry(TelemetryMessage::RadioMeasReportPerUe(_)) => {
                MessageType::RadioMeasReportPerUe
            }
            Self::ControlUpdate(ControlUpdate::CellConfigReport(_)) => {
                MessageType::CellConfigReport
            }
            Self::ControlUpdate(ControlUpdate::UeAdmissionRequest(_)) => {
                MessageType::UeAdmissionRequest
            }
            Self::ControlResponse(ControlResponse::CellConfigRequest(_)) => {
                MessageType::CellConfigRequest
            }
            Self::ControlResponse(ControlResponse::UeAdmissionResponse(_)) => {
                MessageType::UeAdmissionResponse
            }
            Self::ControlResponse(ControlResponse::HandoverRequest(_)) => {
                MessageType::HandoverRequest
            }
            Self::Unknown(_) => return None,
        };
        Some(mt)
    }
}

impl From<TelemetryMessage> for E2Pdu {
    fn from(msg: TelemetryMessage) -> Self {
        Self::Telemetry(msg)
    }
}

impl From<ControlUpdate> for E2Pdu {
    fn from(msg: ControlUpdate) -> Self {
        Self::ControlUpdate(msg)
    }
}

impl From<ControlResponse> for E2Pdu {
    fn from(msg: ControlResponse) -> Self {
        Self::ControlResponse(msg)
    }
}

impl From<SessionOpen> for E2Pdu {
    fn from(msg: SessionOpen) -> Self {
        Self::SessionOpen(msg)
    }
}

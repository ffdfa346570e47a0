//! E2-like protocol between the RAN simulator and a RAN controller
//!
//! This crate provides the message set and wire codec for the two sessions a
//! controller opens against the simulator over TCP.
//!
//! # Protocol Overview
//!
//! A connection starts with a **`SessionOpen`** frame choosing the session:
//!
//! - **Telemetry**: the simulator streams `RadioMeasReportPerUe` on handovers
//! - **Control**: the controller sends `CellConfigRequest`, the simulator
//!   answers with one `CellConfigReport` per cell and one
//!   `UeAdmissionRequest` per UE
//!
//! # Modules
//!
//! - [`protocol`]: E2 message types and structures
//! - [`codec`]: Message encoding, decoding and framing
//!
//! # Example
//!
//! ```rust
//! use ransim_e2::{codec, CellConfigRequest, ControlResponse, E2Pdu};
//!
//! let request: E2Pdu = ControlResponse::CellConfigRequest(CellConfigRequest).into();
//! let encoded = codec::encode(&request).unwrap();
//! let decoded = codec::decode(&encoded).unwrap();
//! assert_eq!(request, decoded);
//! ```

pub mod codec;
pub mod protocol;

pub use codec::{
    decode, encode, encode_frame, read_frame, write_frame, E2CodecError, MAX_FRAME_LENGTH,
};
pub use protocol::{
    AdmEstCause, CellConfigReport, CellConfigRequest, ControlResponse, ControlUpdate, E2Pdu,
    HandoverRequest, MessageType, RadioMeasReportPerUe, RadioRepPerServCell, SessionKind,
    SessionOpen, TelemetryMessage, UeAdmissionRequest, UeAdmissionResponse,
};

//! E2 session adapter
//!
//! TCP server plus the two session kinds a controller can open:
//! - `telemetry`: measurement reports for every handover
//! - `control`: cell configuration and admission traffic on request

pub mod control;
pub mod server;
pub mod session;
pub mod telemetry;

pub use control::{cell_config_updates, run_control_session};
pub use server::{handle_connection, E2Server};
pub use session::SessionError;
pub use telemetry::{build_radio_meas_report, run_telemetry_session, TELEMETRY_LISTENER};

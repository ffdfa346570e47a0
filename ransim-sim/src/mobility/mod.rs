//! UE mobility
//!
//! `engine` moves a single UE by one waypoint; `task` runs the tick loop over
//! all UEs and handles route replacement.

mod engine;
mod task;

pub use engine::{move_ue, MoveOutcome, UeUpdate};
pub use task::{MobilityTask, TickSummary};

use thiserror::Error;

use crate::routes::RouteError;

/// Errors that stop the mobility tick loop.
#[derive(Debug, Error)]
pub enum MobilityError {
    /// A UE is not on any waypoint of its route
    #[error("route consistency fault: {0}")]
    RouteConsistency(String),

    /// No replacement route could be installed at the end of a route
    #[error("route replacement for {ue} failed: {source}")]
    RouteReplacement {
        /// UE that reached the end of its route
        ue: String,
        /// Generator or installation error
        #[source]
        source: RouteError,
    },
}

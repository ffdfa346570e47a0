//! Status Reporting for the simulator
//!
//! A point-in-time summary of the simulation, logged at shutdown.

use serde::{Deserialize, Serialize};

use crate::tasks::SimTaskBase;

/// Simulator status information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStatusInfo {
    /// Completed mobility passes
    pub tick: u64,
    /// Number of simulated UEs
    #[serde(rename = "ue-count")]
    pub ue_count: usize,
    /// Number of towers
    #[serde(rename = "tower-count")]
    pub tower_count: usize,
    /// Registered dispatcher listeners (open telemetry sessions)
    pub listeners: usize,
    /// Whether the mobility task is still running
    pub moving: bool,
}

impl SimStatusInfo {
    /// Collects the status from the shared simulation handles.
    pub async fn collect(task_base: &SimTaskBase, moving: bool) -> Self {
        let (tick, ue_count, tower_count) = {
            let state = task_base.state.read().await;
            (state.tick().value(), state.ue_count(), state.tower_count())
        };
        Self {
            tick,
            ue_count,
            tower_count,
            listeners: task_base.dispatcher.listener_count().await,
            moving,
        }
    }

    /// Returns the status as a YAML string.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

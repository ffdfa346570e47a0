//! Topology discovery
//!
//! Cells can also be created and removed from a topology service stream.
//! Only the watch loop lives here: the transport is behind `TopologySource`
//! and the effect of an event is behind `TopologyHandler`.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Device type of simulated E2 nodes.
pub const E2NODE_TYPE: &str = "E2Node";

/// Supported E2 node version.
pub const E2NODE_VERSION: &str = "1.0.0";

/// Errors from a topology source or handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopoError {
    /// The subscription stream failed
    #[error("topology stream failed: {0}")]
    Stream(String),

    /// A handler could not apply an event
    #[error("topology handler failed for {device}: {reason}")]
    Handler {
        /// Device identifier
        device: String,
        /// Failure reason
        reason: String,
    },
}

/// Kind of a topology event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoEventKind {
    /// Replay of an existing device at subscription time
    None,
    /// Device added
    Added,
    /// Device changed
    Updated,
    /// Device removed
    Removed,
}

/// A device as reported by the topology service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoDevice {
    /// Device identifier
    pub id: String,
    /// Device type
    pub device_type: String,
    /// Device version
    pub version: String,
}

/// One event from the topology stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoEvent {
    /// Event kind
    pub kind: TopoEventKind,
    /// Affected device
    pub device: TopoDevice,
}

/// Subscription stream of topology events.
#[async_trait]
pub trait TopologySource: Send {
    /// Next event, or `None` once the stream has ended.
    async fn next_event(&mut self) -> Option<Result<TopoEvent, TopoError>>;
}

/// Applies topology events to the simulation.
#[async_trait]
pub trait TopologyHandler: Send + Sync {
    /// Creates a cell for a new or replayed device.
    async fn create_cell(&self, device: &TopoDevice) -> Result<(), TopoError>;

    /// Removes the cell of a removed device.
    async fn delete_cell(&self, device: &TopoDevice) -> Result<(), TopoError>;
}

/// Returns true for E2 node devices of the supported version.
///
/// Other device types are skipped silently; unsupported versions are logged.
pub fn accept_topo_device(device: &TopoDevice) -> bool {
    if device.device_type != E2NODE_TYPE {
        return false;
    }
    if device.version != E2NODE_VERSION {
        warn!(
            "Only version {} of {} is supported, skipping {} ({})",
            E2NODE_VERSION, E2NODE_TYPE, device.id, device.version
        );
        return false;
    }
    true
}

/// Counters for a finished topology watch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopoWatchSummary {
    /// Cells created
    pub created: usize,
    /// Cells deleted
    pub deleted: usize,
    /// Events skipped by the filter, failed handlers or unhandled kinds
    pub skipped: usize,
}

/// Applies events from `source` until the stream ends.
///
/// Handler failures are logged and skipped. A stream error ends the watch.
pub async fn run_topology_watch<S, H>(
    source: &mut S,
    handler: &H,
) -> Result<TopoWatchSummary, TopoError>
where
    S: TopologySource + ?Sized,
    H: TopologyHandler + ?Sized,
{
    info!("Topology watch started");
    let mut summary = TopoWatchSummary::default();

    while let Some(event) = source.next_event().await {
        let event = event?;
        if !accept_topo_device(&event.device) {
            summary.skipped += 1;
            continue;
        }

        let result = match event.kind {
            TopoEventKind::None | TopoEventKind::Added => handler
                .create_cell(&event.device)
                .await
                .map(|()| summary.created += 1),
            TopoEventKind::Removed => handler
                .delete_cell(&event.device)
                .await
                .map(|()| summary.deleted += 1),
            TopoEventKind::Updated => {
                warn!(
                    "Topology event {:?} not handled for {}",
                    event.kind, event.device.id
                );
                summary.skipped += 1;
                continue;
            }
        };

        match result {
            Ok(()) => debug!("Applied {:?} for {}", event.kind, event.device.id),
            Err(e) => {
                warn!("Unable to apply {:?} for {}: {}", event.kind, event.device.id, e);
                summary.skipped += 1;
            }
        }
    }

    info!(
        "Topology watch ended: {} created, {} deleted, {} skipped",
        summary.created, summary.deleted, summary.skipped
    );
    Ok(summary)
}

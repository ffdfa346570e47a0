//! ransim-sim - RAN Test-Bed Simulator Library
//!
//! Simulated UEs drive along routes through a rectangular grid of towers.
//! Every move is classified as a position-only update or a handover and
//! published to the E2 telemetry session; the E2 control session answers
//! cell configuration requests from the shared simulation state.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        ran-sim                            │
//! │  ┌──────────┐   publish   ┌────────────┐                  │
//! │  │ Mobility │ ──────────► │ Dispatcher │                  │
//! │  │   Task   │             └─────┬──────┘                  │
//! │  └────┬─────┘                   │ handovers               │
//! │       │ write                   ▼                         │
//! │  ┌────┴─────┐  read   ┌──────────────────┐                │
//! │  │ SimState │ ◄────── │ E2 Server Task   │                │
//! │  └──────────┘         │ telemetry/control│                │
//! │                       └────────┬─────────┘                │
//! └────────────────────────────────┼──────────────────────────┘
//!                                  ▼
//!                              Controller
//! ```
//!
//! # Configuration Loading
//!
//! ```rust,ignore
//! use ransim_sim::app::load_and_validate_sim_config;
//!
//! let config = load_and_validate_sim_config("config/ran-sim.yaml")?;
//! ```

pub mod app;
pub mod dispatcher;
pub mod e2;
pub mod grid;
pub mod mobility;
pub mod proximity;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod topo;

pub use app::{
    load_and_validate_sim_config, load_sim_config, load_sim_config_from_str, validate_sim_config,
    ConfigError, ConfigValidationError, SimStatusInfo,
};
pub use dispatcher::{Dispatcher, DispatcherError, Event, EventPayload};
pub use e2::{E2Server, SessionError, TELEMETRY_LISTENER};
pub use grid::{GridError, GridShape};
pub use mobility::{MobilityError, MobilityTask, MoveOutcome, TickSummary, UeUpdate};
pub use routes::{RandomWalkRouteGenerator, RouteError, RouteGenerator};
pub use state::{BuildError, SharedState, SimState};
pub use tasks::{
    SimTaskBase, TaskError, TaskId, TaskInfo, TaskManager, TaskState,
    DEFAULT_SHUTDOWN_TIMEOUT_MS,
};
pub use topo::{
    run_topology_watch, TopoDevice, TopoError, TopoEvent, TopoEventKind, TopologyHandler,
    TopologySource,
};

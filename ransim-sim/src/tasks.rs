//! Simulator Task Framework
//!
//! Long-running tasks share one `SimTaskBase` and stop on a common `watch`
//! shutdown signal.
//!
//! # Tasks
//!
//! - **Mobility**: the tick loop moving UEs along their routes
//! - **E2 Server**: accepts controller connections and runs one session per
//!   connection
//!
//! # Task Lifecycle
//!
//! Tasks follow a lifecycle managed by `TaskManager`:
//! 1. **Created**: Task is instantiated but not yet running
//! 2. **Running**: Task is spawned
//! 3. **Stopping**: Shutdown was requested
//! 4. **Stopped**: Task has terminated
//! 5. **Failed**: Task terminated due to an error
//!
//! A task that returns an error triggers the shutdown signal for all others.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use ransim_common::SimConfig;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::dispatcher::Dispatcher;
use crate::state::{SharedState, SimState};

/// Default shutdown timeout in milliseconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// Task Lifecycle State
// ============================================================================

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Task is created but not yet started
    #[default]
    Created,
    /// Task is running
    Running,
    /// Task is in the process of stopping
    Stopping,
    /// Task has stopped gracefully
    Stopped,
    /// Task terminated due to an error
    Failed,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Created => write!(f, "Created"),
            TaskState::Running => write!(f, "Running"),
            TaskState::Stopping => write!(f, "Stopping"),
            TaskState::Stopped => write!(f, "Stopped"),
            TaskState::Failed => write!(f, "Failed"),
        }
    }
}

/// Task identifier for the simulator tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Mobility tick loop
    Mobility,
    /// E2 TCP server
    E2Server,
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Mobility => write!(f, "Mobility"),
            TaskId::E2Server => write!(f, "E2"),
        }
    }
}

/// Information about a task.
#[derive(Debug)]
pub struct TaskInfo {
    /// Task identifier
    pub id: TaskId,
    /// Current state
    pub state: TaskState,
    /// Time when the task was started
    pub started_at: Option<Instant>,
    /// Time when the task was stopped
    pub stopped_at: Option<Instant>,
    /// Error message if task failed
    pub error: Option<String>,
}

// ============================================================================
// Simulator Task Base
// ============================================================================

/// Handles shared by every task.
#[derive(Clone)]
pub struct SimTaskBase {
    /// Simulator configuration
    pub config: Arc<SimConfig>,
    /// Tower, UE and route tables
    pub state: SharedState,
    /// Event fan-out from the mobility task to E2 sessions
    pub dispatcher: Arc<Dispatcher>,
}

impl SimTaskBase {
    /// Creates a task base around an already built simulation.
    pub fn new(config: SimConfig, state: SimState) -> Self {
        let dispatcher = Dispatcher::new(config.e2.channel_capacity);
        Self {
            config: Arc::new(config),
            state: Arc::new(RwLock::new(state)),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

// ============================================================================
// Task Manager
// ============================================================================

/// Manages the lifecycle of all simulator tasks.
pub struct TaskManager {
    /// Shared task handles
    task_base: SimTaskBase,
    /// Task state information
    task_states: HashMap<TaskId, TaskInfo>,
    /// Shutdown signal sender, shared with spawned tasks
    shutdown_tx: Arc<watch::Sender<bool>>,
    /// Shutdown signal receiver (cloneable)
    shutdown_rx: watch::Receiver<bool>,
    /// Join handles for spawned tasks
    join_handles: HashMap<TaskId, JoinHandle<Result<(), TaskError>>>,
}

/// Error type for task operations.
#[derive(Debug, Clone)]
pub struct TaskError {
    /// Task that failed
    pub task_id: TaskId,
    /// Error message
    pub message: String,
}

impl TaskError {
    /// Creates a task error from any displayable error.
    pub fn new(task_id: TaskId, message: impl std::fmt::Display) -> Self {
        Self {
            task_id,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {} error: {}", self.task_id, self.message)
    }
}

impl std::error::Error for TaskError {}

impl TaskManager {
    /// Creates a new `TaskManager` for the given task base.
    pub fn new(task_base: SimTaskBase) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut task_states = HashMap::new();
        for task_id in [TaskId::Mobility, TaskId::E2Server] {
            task_states.insert(
                task_id,
                TaskInfo {
                    id: task_id,
                    state: TaskState::Created,
                    started_at: None,
                    stopped_at: None,
                    error: None,
                },
            );
        }

        Self {
            task_base,
            task_states,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
            join_handles: HashMap::new(),
        }
    }

    /// Returns a clone of the task base.
    pub fn task_base(&self) -> SimTaskBase {
        self.task_base.clone()
    }

    /// Returns a receiver for the shutdown signal.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Spawns a task future and tracks it under `task_id`.
    ///
    /// If the future returns an error the shutdown signal is raised.
    pub fn spawn<F>(&mut self, task_id: TaskId, task: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let shutdown_tx = Arc::clone(&self.shutdown_tx);
        let handle = tokio::spawn(async move {
            let result = task.await;
            if let Err(e) = &result {
                error!("{}", e);
                let _ = shutdown_tx.send(true);
            }
            result
        });
        self.mark_task_started(task_id);
        self.register_task_handle(task_id, handle);
        info!("{} task started", task_id);
    }

    /// Gets the current state of a task.
    pub fn get_task_state(&self, task_id: TaskId) -> Option<TaskState> {
        self.task_states.get(&task_id).map(|info| info.state)
    }

    /// Gets information about a task.
    pub fn get_task_info(&self, task_id: TaskId) -> Option<&TaskInfo> {
        self.task_states.get(&task_id)
    }

    /// Returns true if the task was spawned and has not finished yet.
    pub fn is_task_active(&self, task_id: TaskId) -> bool {
        self.join_handles
            .get(&task_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Marks a task as started.
    pub fn mark_task_started(&mut self, task_id: TaskId) {
        if let Some(info) = self.task_states.get_mut(&task_id) {
            info.state = TaskState::Running;
            info.started_at = Some(Instant::now());
        }
    }

    /// Marks a task as stopped.
    pub fn mark_task_stopped(&mut self, task_id: TaskId) {
        if let Some(info) = self.task_states.get_mut(&task_id) {
            info.state = TaskState::Stopped;
            info.stopped_at = Some(Instant::now());
        }
    }

    /// Marks a task as failed with an error message.
    pub fn mark_task_failed(&mut self, task_id: TaskId, error: String) {
        if let Some(info) = self.task_states.get_mut(&task_id) {
            info.state = TaskState::Failed;
            info.stopped_at = Some(Instant::now());
            info.error = Some(error);
        }
    }

    /// Registers a join handle for a spawned task.
    pub fn register_task_handle(
        &mut self,
        task_id: TaskId,
        handle: JoinHandle<Result<(), TaskError>>,
    ) {
        self.join_handles.insert(task_id, handle);
    }

    /// Signals shutdown and waits for every task to finish.
    pub async fn shutdown(&mut self) -> Result<(), TaskError> {
        let _ = self.shutdown_tx.send(true);

        for info in self.task_states.values_mut() {
            if info.state == TaskState::Running {
                info.state = TaskState::Stopping;
            }
        }

        let timeout = tokio::time::Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS);
        let deadline = tokio::time::Instant::now() + timeout;

        let handles: Vec<_> = self.join_handles.drain().collect();
        let mut results: Vec<(TaskId, Result<(), String>)> = Vec::new();

        for (task_id, mut handle) in handles {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let result = match tokio::time::timeout(remaining, &mut handle).await {
                Ok(Ok(Ok(()))) => Ok(()),
                Ok(Ok(Err(e))) => Err(e.message),
                Ok(Err(_join_error)) => Err("Task panicked".to_string()),
                Err(_timeout) => {
                    handle.abort();
                    Err("Shutdown timeout".to_string())
                }
            };
            results.push((task_id, result));
        }

        for (task_id, result) in results {
            match result {
                Ok(()) => self.mark_task_stopped(task_id),
                Err(msg) => self.mark_task_failed(task_id, msg),
            }
        }

        let failed: Vec<_> = self
            .status_summary()
            .into_iter()
            .filter(|(_, state)| *state == TaskState::Failed)
            .map(|(id, _)| id)
            .collect();
        if let Some(&task_id) = failed.first() {
            let summary: Vec<_> = failed
                .iter()
                .map(|id| {
                    let error = self
                        .get_task_info(*id)
                        .and_then(|info| info.error.as_deref())
                        .unwrap_or("unknown error");
                    format!("{}: {}", id, error)
                })
                .collect();
            return Err(TaskError {
                task_id,
                message: format!("Tasks failed during shutdown: {}", summary.join(", ")),
            });
        }

        Ok(())
    }

    /// Returns a summary of all task states.
    pub fn status_summary(&self) -> Vec<(TaskId, TaskState)> {
        let mut summary: Vec<_> = self
            .task_states
            .iter()
            .map(|(id, info)| (*id, info.state))
            .collect();
        summary.sort_by_key(|(id, _)| id.to_string());
        summary
    }
}

// ============================================================================
// Tests
// ============================================================================

//! ransim RAN simulator
//!
//! Main binary of the simulator:
//! - CLI argument parsing
//! - Configuration loading and validation
//! - Simulation build and task spawning
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! ran-sim -c config/ran-sim.yaml
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ransim_common::{init_logging, LogLevel};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use ransim_sim::{
    load_and_validate_sim_config, E2Server, MobilityTask, RandomWalkRouteGenerator,
    SimState, SimStatusInfo, SimTaskBase, TaskError, TaskId, TaskManager,
};

/// ransim - RAN test-bed simulator
#[derive(Parser, Debug)]
#[command(name = "ran-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulator configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: String,

    /// Log level, overrides the configuration file
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// E2 listen address, overrides the configuration file
    #[arg(long = "listen", value_name = "ADDR")]
    listen: Option<SocketAddr>,
}

/// Application state for the simulator
struct SimApp {
    /// Task manager for lifecycle management
    task_manager: TaskManager,
    /// Shutdown signal receiver
    shutdown_rx: watch::Receiver<bool>,
}

impl SimApp {
    /// Builds the simulation and spawns the tasks
    async fn new(args: &Args) -> Result<Self> {
        let mut config = load_and_validate_sim_config(&args.config_file)
            .with_context(|| format!("Failed to load configuration from {}", args.config_file))?;
        if let Some(listen) = args.listen {
            config.e2.listen_addr = listen;
        }

        let level = match args.log_level {
            Some(level) => level,
            None => config
                .log_level
                .as_deref()
                .map(str::parse::<LogLevel>)
                .transpose()
                .map_err(anyhow::Error::msg)?
                .unwrap_or_default(),
        };
        init_logging(level);

        info!("Configuration loaded from: {}", args.config_file);
        info!(
            "Grid: {}x{} towers, spacing {}, PLMN {}",
            config.towers.rows, config.towers.cols, config.towers.spacing, config.towers.plmn_id
        );
        info!(
            "Routes: {} UEs, step delay {} ms",
            config.routes.num_routes, config.routes.step_delay_ms
        );

        let generator = Arc::new(RandomWalkRouteGenerator::from_config(&config.routes));
        let state = SimState::build(&config, generator.as_ref())
            .await
            .context("Failed to build the simulation")?;

        let listen_addr = config.e2.listen_addr;
        let task_base = SimTaskBase::new(config, state);
        let mut task_manager = TaskManager::new(task_base.clone());
        let shutdown_rx = task_manager.shutdown_receiver();

        let server = E2Server::bind(task_base.clone(), listen_addr)
            .await
            .with_context(|| format!("Failed to bind E2 server to {listen_addr}"))?;
        let server_shutdown = task_manager.shutdown_receiver();
        task_manager.spawn(TaskId::E2Server, async move {
            server
                .run(server_shutdown)
                .await
                .map_err(|e| TaskError::new(TaskId::E2Server, e))
        });

        let mut mobility = MobilityTask::new(task_base, generator);
        let mobility_shutdown = task_manager.shutdown_receiver();
        task_manager.spawn(TaskId::Mobility, async move {
            mobility
                .run(mobility_shutdown)
                .await
                .map_err(|e| TaskError::new(TaskId::Mobility, e))
        });

        Ok(Self {
            task_manager,
            shutdown_rx,
        })
    }

    /// Runs until Ctrl+C or until a task raises the shutdown signal
    async fn run(&mut self) -> Result<()> {
        info!("Simulator started, waiting for shutdown signal...");

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = async {
                loop {
                    if *self.shutdown_rx.borrow() {
                        break;
                    }
                    if self.shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            } => {
                info!("Received shutdown signal from task manager");
            }
        }
        Ok(())
    }

    /// Stops all tasks and logs the final status
    async fn shutdown(mut self) -> Result<()> {
        info!("Initiating graceful shutdown...");
        let task_base = self.task_manager.task_base();
        let moving = self.task_manager.is_task_active(TaskId::Mobility);
        let status = SimStatusInfo::collect(&task_base, moving).await;
        match status.to_yaml() {
            Ok(yaml) => info!("Final status:\n{}", yaml),
            Err(e) => warn!("Failed to render status: {}", e),
        }

        let result = self.task_manager.shutdown().await;
        for (task_id, state) in self.task_manager.status_summary() {
            match self
                .task_manager
                .get_task_info(task_id)
                .and_then(|info| info.error.as_deref())
            {
                Some(error) => warn!("{} task {}: {}", task_id, state, error),
                None => info!("{} task {}", task_id, state),
            }
        }

        match result {
            Ok(()) => {
                info!("All tasks shut down successfully");
                Ok(())
            }
            Err(e) => Err(e).context("Simulation stopped with a failed task"),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    println!("ransim - RAN Test-Bed Simulator");
    println!("===============================");

    match run_sim(args).await {
        Ok(()) => {
            info!("Simulator exited successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            // logging may not be up yet if the configuration failed
            eprintln!("ran-sim failed: {e:#}");
            error!("Simulator failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main simulator execution logic
async fn run_sim(args: Args) -> Result<()> {
    let mut app = SimApp::new(&args).await?;
    app.run().await?;
    app.shutdown().await?;
    Ok(())
}

//! Test fixtures and configuration helpers
//!
//! Provides a small deterministic simulation: a single row of towers and
//! UEs driving straight east through it.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use ransim_common::{Coordinate, E2Config, Route, RoutesConfig, SimConfig, TowersConfig};
use ransim_sim::routes::route_name;
use ransim_sim::{
    E2Server, MobilityError, MobilityTask, RouteError, RouteGenerator, SimState, SimTaskBase,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::test_utils::TestResult;

/// Number of towers in the corridor
pub const CORRIDOR_TOWERS: u32 = 5;

/// Distance between corridor towers in degrees
pub const CORRIDOR_SPACING: f64 = 0.02;

/// Route generator producing straight eastbound routes.
#[derive(Debug, Clone, Copy)]
pub struct EastboundRouteGenerator {
    /// Longitude step between waypoints
    pub step: f64,
    /// Waypoints per route, including the start
    pub waypoints: usize,
}

impl Default for EastboundRouteGenerator {
    fn default() -> Self {
        Self {
            step: 0.01,
            waypoints: 10,
        }
    }
}

#[async_trait]
impl RouteGenerator for EastboundRouteGenerator {
    async fn new_route(
        &self,
        start: Coordinate,
        route_index: u32,
        _api_key: &str,
        color: &str,
    ) -> Result<Route, RouteError> {
        let waypoints = (0..self.waypoints)
            .map(|i| start.offset(0.0, self.step * i as f64))
            .collect();
        Ok(Route::new(route_name(route_index), waypoints, color))
    }
}

/// One row of towers around (0, 0) with a fast tick.
pub fn corridor_config(num_routes: u32) -> SimConfig {
    SimConfig {
        towers: TowersConfig {
            rows: 1,
            cols: CORRIDOR_TOWERS,
            center: Coordinate::new(0.0, 0.0),
            spacing: CORRIDOR_SPACING,
            ..TowersConfig::default()
        },
        routes: RoutesConfig {
            num_routes,
            step_delay_ms: 10,
            ..RoutesConfig::default()
        },
        e2: E2Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..E2Config::default()
        },
        log_level: None,
    }
}

/// A built simulation with its route generator.
pub struct TestSimulation {
    /// Shared handles as the tasks see them
    pub task_base: SimTaskBase,
    /// Generator used for the initial and replacement routes
    pub generator: Arc<EastboundRouteGenerator>,
}

impl TestSimulation {
    /// Builds the corridor simulation with `num_routes` UEs.
    pub async fn corridor(num_routes: u32) -> TestResult<Self> {
        Self::build(corridor_config(num_routes), EastboundRouteGenerator::default()).await
    }

    /// Builds a simulation from an explicit configuration and generator.
    pub async fn build(config: SimConfig, generator: EastboundRouteGenerator) -> TestResult<Self> {
        let generator = Arc::new(generator);
        let state = SimState::build(&config, generator.as_ref()).await?;
        Ok(Self {
            task_base: SimTaskBase::new(config, state),
            generator,
        })
    }

    /// Binds the E2 server on the configured address and runs it.
    pub async fn start_server(&self) -> TestResult<RunningServer> {
        let server =
            E2Server::bind(self.task_base.clone(), self.task_base.config.e2.listen_addr).await?;
        let addr = server.local_addr()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(server.run(shutdown_rx));
        Ok(RunningServer {
            addr,
            shutdown_tx,
            handle,
        })
    }

    /// Runs the mobility loop until `shutdown_rx` fires.
    pub fn start_mobility(
        &self,
        shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<Result<(), MobilityError>> {
        let mut task = MobilityTask::new(self.task_base.clone(), self.generator.clone());
        tokio::spawn(async move { task.run(shutdown_rx).await })
    }
}

/// An E2 server running in the background.
pub struct RunningServer {
    /// Bound address
    pub addr: SocketAddr,
    /// Stops the server and its sessions
    pub shutdown_tx: watch::Sender<bool>,
    /// Server task
    pub handle: JoinHandle<Result<(), ransim_common::Error>>,
}

impl RunningServer {
    /// Signals shutdown and waits for the accept loop to end.
    pub async fn stop(self) -> TestResult {
        let _ = self.shutdown_tx.send(true);
        self.handle.await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_eastbound_route() {
        let generator = EastboundRouteGenerator {
            step: 0.5,
            waypoints: 3,
        };
        let route = generator
            .new_route(Coordinate::new(1.0, 1.0), 4, "", "#000000")
            .await
            .unwrap();
        assert_eq!(route.name, "Route-4");
        assert_eq!(
            route.waypoints,
            vec![
                Coordinate::new(1.0, 1.0),
                Coordinate::new(1.0, 1.5),
                Coordinate::new(1.0, 2.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_corridor_simulation() {
        let sim = TestSimulation::corridor(2).await.unwrap();
        let state = sim.task_base.state.read().await;
        assert_eq!(state.tower_count(), 5);
        assert_eq!(state.ue_count(), 2);
        assert_eq!(state.ues()[0].serving_tower(), "Tower-1");
        assert_eq!(state.ues()[1].serving_tower(), "Tower-2");
    }
}

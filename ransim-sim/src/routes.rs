//! Route generation
//!
//! Routes come from an external collaborator; the simulator only needs a
//! route that starts where the UE currently is. The built-in generator does a
//! seeded random walk so runs are reproducible without map data.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ransim_common::{Coordinate, Route, RoutesConfig};
use thiserror::Error;
use tracing::debug;

/// Bound on random draws per waypoint before giving up.
const MAX_ATTEMPTS_PER_WAYPOINT: usize = 64;

/// Errors returned by a route generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The request cannot be satisfied with the generator's settings
    #[error("invalid route request: {0}")]
    InvalidRequest(String),

    /// The backing service failed
    #[error("route generator unavailable: {0}")]
    Unavailable(String),

    /// The generator produced a route with fewer than two waypoints
    #[error("route {0} has fewer than two waypoints")]
    TooShort(String),
}

/// Source of routes for UEs.
#[async_trait]
pub trait RouteGenerator: Send + Sync {
    /// Returns route `Route-<route_index>` starting exactly at `start`.
    async fn new_route(
        &self,
        start: Coordinate,
        route_index: u32,
        api_key: &str,
        color: &str,
    ) -> Result<Route, RouteError>;
}

/// Name of the route with the given index.
pub fn route_name(route_index: u32) -> String {
    format!("Route-{route_index}")
}

/// Random-walk route generator.
///
/// Every leg is between a tenth of `max_leg` and `max_leg` degrees long and no
/// waypoint repeats within a route, so a position maps to exactly one index.
#[derive(Debug)]
pub struct RandomWalkRouteGenerator {
    rng: Mutex<StdRng>,
    min_waypoints: usize,
    max_waypoints: usize,
    max_leg: f64,
}

impl RandomWalkRouteGenerator {
    /// Creates a generator with explicit settings.
    pub fn new(seed: u64, min_waypoints: usize, max_waypoints: usize, max_leg: f64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            min_waypoints,
            max_waypoints,
            max_leg,
        }
    }

    /// Creates a generator from the routes section of the configuration.
    pub fn from_config(config: &RoutesConfig) -> Self {
        Self::new(
            config.seed,
            config.min_waypoints,
            config.max_waypoints,
            config.max_leg,
        )
    }

    fn walk(&self, start: Coordinate) -> Result<Vec<Coordinate>, RouteError> {
        if self.min_waypoints < 2 || self.min_waypoints > self.max_waypoints {
            return Err(RouteError::InvalidRequest(format!(
                "waypoint bounds {}..={} are not usable",
                self.min_waypoints, self.max_waypoints
            )));
        }
        if self.max_leg.is_nan() || self.max_leg <= 0.0 {
            return Err(RouteError::InvalidRequest(format!(
                "max leg {} must be positive",
                self.max_leg
            )));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RouteError::Unavailable("random source poisoned".to_string()))?;

        let count = rng.gen_range(self.min_waypoints..=self.max_waypoints);
        let mut waypoints = Vec::with_capacity(count);
        waypoints.push(start);

        while waypoints.len() < count {
            let last = waypoints[waypoints.len() - 1];
            let mut next = None;
            for _ in 0..MAX_ATTEMPTS_PER_WAYPOINT {
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                let length = rng.gen_range(self.max_leg * 0.1..=self.max_leg);
                let candidate = last.offset(length * angle.cos(), length * angle.sin());
                if !waypoints.contains(&candidate) {
                    next = Some(candidate);
                    break;
                }
            }
            match next {
                Some(wp) => waypoints.push(wp),
                None => {
                    return Err(RouteError::Unavailable(format!(
                        "no fresh waypoint found after {} attempts",
                        MAX_ATTEMPTS_PER_WAYPOINT
                    )))
                }
            }
        }
        Ok(waypoints)
    }
}

#[async_trait]
impl RouteGenerator for RandomWalkRouteGenerator {
    async fn new_route(
        &self,
        start: Coordinate,
        route_index: u32,
        _api_key: &str,
        color: &str,
    ) -> Result<Route, RouteError> {
        let waypoints = self.walk(start)?;
        let route = Route::new(route_name(route_index), waypoints, color);
        debug!(
            "Generated {} with {} waypoints from {}",
            route.name,
            route.waypoints.len(),
            start
        );
        Ok(route)
    }
}

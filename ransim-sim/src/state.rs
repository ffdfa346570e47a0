//! Simulation state
//!
//! The tower, UE and route tables. They are built once at startup, then the
//! mobility task is the only writer and the control sessions read consistent
//! snapshots through the shared lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use ransim_common::{
    Coordinate, Route, ServingSet, SimConfig, SimulationTick, Tower, TowersConfig, Ue,
    DEFAULT_UE_TYPE,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::grid::{index_towers, index_ues, tower_name, GridError, GridShape};
use crate::mobility::{move_ue, MoveOutcome};
use crate::proximity::{closest_towers, initial_serving_set};
use crate::routes::{RouteError, RouteGenerator};

/// Fallback colour when the palette is empty.
const DEFAULT_COLOR: &str = "#000000";

/// Simulation tables shared between tasks.
pub type SharedState = Arc<RwLock<SimState>>;

/// Errors raised while building the simulation at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Tower or UE indexing failed
    #[error("grid indexing failed: {0}")]
    Grid(#[from] GridError),

    /// Initial route generation failed
    #[error("route generation failed: {0}")]
    Route(#[from] RouteError),

    /// No towers to serve UEs
    #[error("no towers configured")]
    NoTowers,
}

/// Towers, UEs and routes of a running simulation.
///
/// UE `i` always travels route `i`; both vectors are indexed by route index.
#[derive(Debug, Clone, Default)]
pub struct SimState {
    towers: BTreeMap<String, Tower>,
    ues: Vec<Ue>,
    routes: Vec<Route>,
    tick: SimulationTick,
}

impl SimState {
    /// Creates state from prepared tables.
    ///
    /// The caller must keep `ues[i].route == routes[i].name`.
    pub fn new(towers: BTreeMap<String, Tower>, ues: Vec<Ue>, routes: Vec<Route>) -> Self {
        Self {
            towers,
            ues,
            routes,
            tick: SimulationTick::initial(),
        }
    }

    /// Lays out towers, generates routes and places one UE at the start of
    /// each route.
    pub async fn build(
        config: &SimConfig,
        generator: &dyn RouteGenerator,
    ) -> Result<Self, BuildError> {
        let shape = GridShape::new(config.towers.rows, config.towers.cols)?;
        let mut towers = layout_towers(&config.towers, shape)?;
        index_towers(
            &mut towers,
            shape,
            &config.towers.plmn_id,
            config.towers.max_ues,
        )?;

        let mut ues = Vec::with_capacity(config.routes.num_routes as usize);
        let mut routes = Vec::with_capacity(config.routes.num_routes as usize);
        for index in 0..config.routes.num_routes {
            let start = route_start(&config.towers, shape, index);
            let mut route = generator
                .new_route(start, index, &config.routes.api_key, "")
                .await?;
            if !route.is_valid() {
                return Err(RouteError::TooShort(route.name).into());
            }

            let first = route.waypoints[0];
            let ranked = closest_towers(&first, towers.values());
            let cells = initial_serving_set(&ranked).ok_or(BuildError::NoTowers)?;
            if let Some(tower) = towers.get(&cells.serving.name) {
                route.color = tower.color.clone();
            }

            ues.push(new_ue(index, &route, first, cells));
            routes.push(route);
        }
        index_ues(&mut ues)?;

        info!(
            "Simulation built: {} towers, {} UEs",
            towers.len(),
            ues.len()
        );
        Ok(Self::new(towers, ues, routes))
    }

    /// Looks up a tower.
    pub fn tower_by_name(&self, name: &str) -> Option<&Tower> {
        self.towers.get(name)
    }

    /// Looks up a UE.
    pub fn ue_by_name(&self, name: &str) -> Option<&Ue> {
        self.ues.iter().find(|ue| ue.name == name)
    }

    /// Looks up a route.
    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Towers in name order.
    pub fn towers(&self) -> impl Iterator<Item = &Tower> {
        self.towers.values()
    }

    /// UEs in route index order.
    pub fn ues(&self) -> &[Ue] {
        &self.ues
    }

    /// Routes in index order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of UEs.
    pub fn ue_count(&self) -> usize {
        self.ues.len()
    }

    /// Number of towers.
    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    /// Completed mobility passes.
    pub fn tick(&self) -> SimulationTick {
        self.tick
    }

    /// Marks one mobility pass as completed.
    pub fn advance_tick(&mut self) {
        self.tick.next();
    }

    /// Colour of the UE's serving tower, or an empty string if unknown.
    pub fn color_for_ue(&self, ue_name: &str) -> String {
        self.ue_by_name(ue_name)
            .and_then(|ue| self.towers.get(ue.serving_tower()))
            .map(|tower| tower.color.clone())
            .unwrap_or_default()
    }

    /// Moves UE `index` one waypoint along its route.
    pub fn move_ue(&mut self, index: usize) -> MoveOutcome {
        let Some(ue) = self.ues.get_mut(index) else {
            return MoveOutcome::Fault(format!("no UE at index {index}"));
        };
        let Some(route) = self.routes.get(index) else {
            return MoveOutcome::Fault(format!("no route for {}", ue.name));
        };
        move_ue(ue, route, &self.towers)
    }

    /// Replaces route `index` and points its UE at the new route.
    pub fn replace_route(&mut self, index: usize, route: Route) -> Result<(), RouteError> {
        if !route.is_valid() {
            return Err(RouteError::TooShort(route.name));
        }
        let (Some(slot), Some(ue)) = (self.routes.get_mut(index), self.ues.get_mut(index)) else {
            return Err(RouteError::InvalidRequest(format!("no route at index {index}")));
        };
        ue.route = route.name.clone();
        *slot = route;
        Ok(())
    }
}

/// Places towers `Tower-1..` row-major around the configured centre.
///
/// Row 0 is the northernmost row and column 0 the westernmost column.
pub fn layout_towers(
    config: &TowersConfig,
    shape: GridShape,
) -> Result<BTreeMap<String, Tower>, GridError> {
    let mut towers = BTreeMap::new();
    for ordinal in 1..=shape.len() {
        let (row, col) = shape.position(ordinal)?;
        let position = grid_point(config, shape, f64::from(row), f64::from(col));
        let color = if config.colors.is_empty() {
            DEFAULT_COLOR.to_string()
        } else {
            config.colors[(ordinal as usize - 1) % config.colors.len()].clone()
        };
        let name = tower_name(ordinal);
        towers.insert(name.clone(), Tower::new(name, position, color));
    }
    Ok(towers)
}

fn grid_point(config: &TowersConfig, shape: GridShape, row: f64, col: f64) -> Coordinate {
    let mid_row = f64::from(shape.rows() - 1) / 2.0;
    let mid_col = f64::from(shape.cols() - 1) / 2.0;
    config
        .center
        .offset((mid_row - row) * config.spacing, (col - mid_col) * config.spacing)
}

/// Start of the initial route with the given index.
///
/// Starts cycle over the grid cells and sit a quarter spacing off the tower so
/// UEs do not begin exactly on top of one.
fn route_start(config: &TowersConfig, shape: GridShape, index: u32) -> Coordinate {
    let cell = index % shape.len();
    let row = f64::from(cell / shape.cols()) + 0.25;
    let col = f64::from(cell % shape.cols()) + 0.25;
    grid_point(config, shape, row, col)
}

fn new_ue(index: u32, route: &Route, position: Coordinate, cells: ServingSet) -> Ue {
    Ue {
        name: format!("Ue-{index}"),
        ue_type: DEFAULT_UE_TYPE.to_string(),
        position,
        rotation: 0,
        route: route.name.clone(),
        cells,
        crnti: String::new(),
    }
}

//! Configuration structures for the RAN simulator
//!
//! The simulator is configured from a single YAML document with a section for
//! the tower grid, one for the simulated routes and one for the E2 endpoint.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::types::TEST_PLMN_ID;

/// Default E2 listen port
pub const DEFAULT_E2_PORT: u16 = 5150;

/// Default bounded channel capacity for sessions and listeners
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Tower grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowersConfig {
    /// Number of grid rows
    pub rows: u32,
    /// Number of grid columns
    pub cols: u32,
    /// Centre of the grid
    pub center: Coordinate,
    /// Distance between neighbouring towers in degrees
    pub spacing: f64,
    /// Maximum UEs per tower, reported in cell config reports
    #[serde(default = "default_max_ues")]
    pub max_ues: u32,
    /// PLMN identifier assigned to every tower
    #[serde(default = "default_plmn_id")]
    pub plmn_id: String,
    /// Colour palette, cycled over the towers
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,
}

fn default_max_ues() -> u32 {
    5
}

fn default_plmn_id() -> String {
    TEST_PLMN_ID.to_string()
}

fn default_colors() -> Vec<String> {
    ["#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl TowersConfig {
    /// Returns the number of towers in the grid.
    pub fn tower_count(&self) -> u32 {
        self.rows * self.cols
    }
}

impl Default for TowersConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            center: Coordinate::new(52.52, 13.405),
            spacing: 0.02,
            max_ues: default_max_ues(),
            plmn_id: default_plmn_id(),
            colors: default_colors(),
        }
    }
}

/// Route and mobility configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Number of routes, one UE is created per route
    pub num_routes: u32,
    /// Delay between mobility ticks in milliseconds
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    /// Key passed to the route generator
    #[serde(default)]
    pub api_key: String,
    /// Minimum waypoints per generated route
    #[serde(default = "default_min_waypoints")]
    pub min_waypoints: usize,
    /// Maximum waypoints per generated route
    #[serde(default = "default_max_waypoints")]
    pub max_waypoints: usize,
    /// Maximum length of one route leg in degrees
    #[serde(default = "default_max_leg")]
    pub max_leg: f64,
    /// Seed for the built-in route generator
    #[serde(default)]
    pub seed: u64,
}

fn default_step_delay_ms() -> u64 {
    1000
}

fn default_min_waypoints() -> usize {
    10
}

fn default_max_waypoints() -> usize {
    30
}

fn default_max_leg() -> f64 {
    0.002
}

impl RoutesConfig {
    /// Returns the tick delay as a Duration.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            num_routes: 3,
            step_delay_ms: default_step_delay_ms(),
            api_key: String::new(),
            min_waypoints: default_min_waypoints(),
            max_waypoints: default_max_waypoints(),
            max_leg: default_max_leg(),
            seed: 0,
        }
    }
}

/// E2 endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct E2Config {
    /// Address the E2 server listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Capacity of session queues and dispatcher listener channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_E2_PORT)
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for E2Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Tower grid
    pub towers: TowersConfig,
    /// Routes and mobility
    pub routes: RoutesConfig,
    /// E2 endpoint
    #[serde(default)]
    pub e2: E2Config,
    /// Log level name, overridden by `RUST_LOG`
    #[serde(default)]
    pub log_level: Option<String>,
}

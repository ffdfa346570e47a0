//! Common types and utilities for ransim
//!
//! This crate provides the simulation entity types, geo math, configuration
//! structures and logging setup shared by all ransim crates.

pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod sim_tick;
pub mod types;

pub use config::{
    E2Config, RoutesConfig, SimConfig, TowersConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_E2_PORT,
};
pub use error::Error;
pub use geo::{bearing, distance, Coordinate};
pub use logging::{
    init_logging, init_logging_with_filter, log_e2_message, Direction, HexDump, LogLevel,
};
pub use sim_tick::SimulationTick;
pub use types::*;

//! Configuration Loading for the simulator
//!
//! Wraps `SimConfig` from `ransim-common` with validation and error handling.
//! Any validation failure is a configuration fault and stops startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use ransim_sim::app::load_and_validate_sim_config;
//!
//! let config = load_and_validate_sim_config("config/ran-sim.yaml")?;
//! ```

use std::path::Path;

use ransim_common::{LogLevel, SimConfig};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Invalid grid shape
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Invalid tower settings
    #[error("Invalid towers: {0}")]
    InvalidTowers(String),

    /// Invalid PLMN
    #[error("Invalid PLMN: {0}")]
    InvalidPlmn(String),

    /// Invalid route settings
    #[error("Invalid routes: {0}")]
    InvalidRoutes(String),

    /// Invalid E2 endpoint settings
    #[error("Invalid E2 configuration: {0}")]
    InvalidE2(String),

    /// Unknown log level
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Loads a simulator configuration from a YAML file.
pub fn load_sim_config<P: AsRef<Path>>(path: P) -> Result<SimConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_sim_config_from_str(&contents)
}

/// Loads a simulator configuration from a YAML string.
pub fn load_sim_config_from_str(yaml: &str) -> Result<SimConfig, ConfigError> {
    let config: SimConfig =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok(config)
}

/// Validates a simulator configuration.
///
/// # Validation Rules
///
/// - Grid rows and columns must be at least 1 and their product fit in `u32`
/// - Tower spacing must be positive and finite, `max_ues` at least 1
/// - PLMN id must be 5 or 6 decimal digits
/// - At least one route, a tick delay of at least 1 ms, waypoint bounds of at
///   least 2 in increasing order and a positive leg length
/// - E2 channel capacity must be at least 1
/// - `log_level`, when set, must name a known level
pub fn validate_sim_config(config: &SimConfig) -> Result<(), ConfigValidationError> {
    let towers = &config.towers;
    if towers.rows == 0 || towers.cols == 0 {
        return Err(ConfigValidationError::InvalidGrid(format!(
            "{}x{} grid has no towers",
            towers.rows, towers.cols
        )));
    }
    if towers.rows.checked_mul(towers.cols).is_none() {
        return Err(ConfigValidationError::InvalidGrid(format!(
            "{}x{} grid is too large",
            towers.rows, towers.cols
        )));
    }

    if !towers.spacing.is_finite() || towers.spacing <= 0.0 {
        return Err(ConfigValidationError::InvalidTowers(format!(
            "spacing {} must be positive",
            towers.spacing
        )));
    }
    if towers.max_ues == 0 {
        return Err(ConfigValidationError::InvalidTowers(
            "max_ues must be at least 1".to_string(),
        ));
    }

    validate_plmn(&towers.plmn_id)?;

    let routes = &config.routes;
    if routes.num_routes == 0 {
        return Err(ConfigValidationError::InvalidRoutes(
            "at least one route is required".to_string(),
        ));
    }
    if routes.step_delay_ms == 0 {
        return Err(ConfigValidationError::InvalidRoutes(
            "step_delay_ms must be at least 1".to_string(),
        ));
    }
    if routes.min_waypoints < 2 {
        return Err(ConfigValidationError::InvalidRoutes(format!(
            "min_waypoints {} must be at least 2",
            routes.min_waypoints
        )));
    }
    if routes.max_waypoints < routes.min_waypoints {
        return Err(ConfigValidationError::InvalidRoutes(format!(
            "max_waypoints {} is below min_waypoints {}",
            routes.max_waypoints, routes.min_waypoints
        )));
    }
    if !routes.max_leg.is_finite() || routes.max_leg <= 0.0 {
        return Err(ConfigValidationError::InvalidRoutes(format!(
            "max_leg {} must be positive",
            routes.max_leg
        )));
    }

    if config.e2.channel_capacity == 0 {
        return Err(ConfigValidationError::InvalidE2(
            "channel_capacity must be at least 1".to_string(),
        ));
    }

    if let Some(level) = &config.log_level {
        level
            .parse::<LogLevel>()
            .map_err(ConfigValidationError::InvalidLogLevel)?;
    }

    Ok(())
}

/// Validates a PLMN identifier (MCC followed by a 2 or 3 digit MNC).
fn validate_plmn(plmn_id: &str) -> Result<(), ConfigValidationError> {
    if !(5..=6).contains(&plmn_id.len()) || !plmn_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigValidationError::InvalidPlmn(format!(
            "{plmn_id:?} must be 5 or 6 decimal digits"
        )));
    }
    if plmn_id.starts_with("000") {
        return Err(ConfigValidationError::InvalidPlmn(format!(
            "MCC in {plmn_id} must be between 001 and 999"
        )));
    }
    Ok(())
}

/// Loads and validates a simulator configuration in one step.
pub fn load_and_validate_sim_config<P: AsRef<Path>>(path: P) -> Result<SimConfig, ConfigError> {
    let config = load_sim_config(path)?;
    validate_sim_config(&config)?;
    Ok(config)
}

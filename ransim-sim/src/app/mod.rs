//! Simulator Application Module
//!
//! Configuration loading and validation, and status reporting.

mod config_loader;
mod status;

pub use config_loader::{
    load_and_validate_sim_config, load_sim_config, load_sim_config_from_str, validate_sim_config,
    ConfigError, ConfigValidationError,
};

pub use status::SimStatusInfo;

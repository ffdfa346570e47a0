//! Configuration File Tests
//!
//! Loads the shipped configuration and broken variants of it from disk and
//! builds a simulation from the result.

use std::io::Write;

use integration_tests::EastboundRouteGenerator;
use ransim_sim::{
    load_and_validate_sim_config, ConfigError, ConfigValidationError, SimState,
};
use tempfile::NamedTempFile;

const SHIPPED_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/ran-sim.yaml");

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_shipped_config_builds_simulation() {
    let config = load_and_validate_sim_config(SHIPPED_CONFIG).unwrap();
    assert_eq!(config.towers.tower_count(), 9);
    assert_eq!(config.e2.listen_addr.port(), 5150);

    let state = SimState::build(&config, &EastboundRouteGenerator::default())
        .await
        .unwrap();
    assert_eq!(state.tower_count(), 9);
    assert_eq!(state.ue_count(), config.routes.num_routes as usize);
}

#[test]
fn test_zero_rows_rejected() {
    let file = write_config(
        r#"
towers:
  rows: 0
  cols: 3
  center: { lat: 0.0, lng: 0.0 }
  spacing: 0.02
routes:
  num_routes: 1
"#,
    );
    let result = load_and_validate_sim_config(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::ValidationError(ConfigValidationError::InvalidGrid(_)))
    ));
}

#[test]
fn test_bad_plmn_rejected() {
    let file = write_config(
        r#"
towers:
  rows: 1
  cols: 1
  center: { lat: 0.0, lng: 0.0 }
  spacing: 0.02
  plmn_id: "12ab5"
routes:
  num_routes: 1
"#,
    );
    let result = load_and_validate_sim_config(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::ValidationError(ConfigValidationError::InvalidPlmn(_)))
    ));
}

#[test]
fn test_malformed_yaml_rejected() {
    let file = write_config("towers: [unterminated");
    let result = load_and_validate_sim_config(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

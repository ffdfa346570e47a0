//! Integration test framework for ransim
#![allow(missing_docs)]
//!
//! This crate provides test utilities and a mock E2 controller for
//! integration testing of the RAN simulator.
//!
//! # Components
//!
//! - [`mock_controller`] - Controller end of an E2 telemetry or control session
//! - [`test_fixtures`] - Deterministic corridor simulation and server harness
//! - [`test_utils`] - Utility functions for test setup and assertions
//!
//! # Test Categories
//!
//! 1. **Telemetry Tests** - Handover reports over a live TCP session
//! 2. **Control Tests** - Cell configuration requests and session rules
//! 3. **Mobility Tests** - Full route traversal and route replacement
//! 4. **Configuration Tests** - Shipped and broken configuration files

pub mod mock_controller;
pub mod test_fixtures;
pub mod test_utils;

pub use mock_controller::{CellConfigAnswer, MockController, MockControllerError};
pub use test_fixtures::{
    corridor_config, EastboundRouteGenerator, RunningServer, TestSimulation, CORRIDOR_SPACING,
    CORRIDOR_TOWERS,
};
pub use test_utils::{
    init_test_logging, wait_for_condition, TestResult, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};

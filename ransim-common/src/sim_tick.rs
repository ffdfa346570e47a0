//! Simulation tick counter
//!
//! Counts completed passes of the mobility loop so log lines and status
//! reports can refer to a simulation step.

use serde::{Deserialize, Serialize};

/// Simulation tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SimulationTick(u64);

impl SimulationTick {
    /// Creates a new simulation tick
    pub fn new(tick: u64) -> Self {
        Self(tick)
    }

    /// Creates the initial tick (tick 0)
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the tick value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Advances to the next tick
    pub fn next(&mut self) {
        self.0 += 1;
    }

    /// Returns true if this is the initial tick
    pub fn is_initial(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for SimulationTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}

impl From<u64> for SimulationTick {
    fn from(tick: u64) -> Self {
        Self::new(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_tick_creation() {
        let tick = SimulationTick::new(42);
        assert_eq!(tick.value(), 42);
        assert_eq!(format!("{tick}"), "Tick(42)");
    }

    #[test]
    fn test_simulation_tick_next() {
        let mut tick = SimulationTick::initial();
        assert!(tick.is_initial());
        tick.next();
        assert_eq!(tick.value(), 1);
        assert!(!tick.is_initial());
    }

    #[test]
    fn test_simulation_tick_from_u64() {
        let tick: SimulationTick = 100.into();
        assert_eq!(tick.value(), 100);
    }
}

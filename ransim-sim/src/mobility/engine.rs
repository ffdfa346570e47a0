//! Mobility engine
//!
//! Moves a UE exactly one waypoint per call. The UE's current waypoint is
//! found by exact coordinate match, so a UE is always on a waypoint between
//! ticks and never interpolated.

use std::collections::BTreeMap;

use ransim_common::{bearing, Coordinate, Route, Tower, Ue, UpdateType};

use crate::proximity::{closest_towers, reassign};

/// A UE snapshot after a successful move.
#[derive(Debug, Clone, PartialEq)]
pub struct UeUpdate {
    /// UE after the move
    pub ue: Ue,
    /// Position-only or tower-changed
    pub update_type: UpdateType,
}

/// Result of moving one UE.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The UE advanced to the next waypoint
    Moved(UeUpdate),
    /// The UE is on the last waypoint and needs a new route
    EndOfRoute {
        /// UE name
        ue: String,
        /// Exhausted route
        route: String,
        /// Last waypoint, where the new route must start
        finish: Coordinate,
    },
    /// The UE is not on its route; the simulation cannot continue
    Fault(String),
}

/// Advances `ue` to the waypoint after its current position.
pub fn move_ue(ue: &mut Ue, route: &Route, towers: &BTreeMap<String, Tower>) -> MoveOutcome {
    let Some(index) = route.index_of(&ue.position) else {
        return MoveOutcome::Fault(format!(
            "{} at {} is not on {} (starts at {})",
            ue.name,
            ue.position,
            route.name,
            route
                .start()
                .map(ToString::to_string)
                .unwrap_or_else(|| "nowhere".to_string())
        ));
    };

    if index + 1 == route.waypoints.len() {
        return MoveOutcome::EndOfRoute {
            ue: ue.name.clone(),
            route: route.name.clone(),
            finish: ue.position,
        };
    }

    let from = route.waypoints[index];
    let to = route.waypoints[index + 1];
    ue.position = to;
    // bearing is in [0, 360), truncation keeps it there
    ue.rotation = bearing(&from, &to) as u32;

    let ranked = closest_towers(&ue.position, towers.values());
    let Some(reassignment) = reassign(&ue.cells, &ranked) else {
        return MoveOutcome::Fault(format!("no towers left to serve {}", ue.name));
    };
    ue.cells = reassignment.cells;

    MoveOutcome::Moved(UeUpdate {
        ue: ue.clone(),
        update_type: reassignment.update_type,
    })
}

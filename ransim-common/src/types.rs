//! Simulation entity types
//!
//! Towers, routes and user equipment as held in the simulation tables, plus
//! the E2 cell global identifier used to address a tower on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// PLMN identifier of the simulated network.
///
/// MCC 001 / MNC 001 is reserved for test networks.
pub const TEST_PLMN_ID: &str = "001001";

/// Type tag given to every simulated UE.
pub const DEFAULT_UE_TYPE: &str = "Car";

/// E-UTRAN cell global identifier: PLMN plus cell id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ecgi {
    /// PLMN identifier (decimal digits)
    pub plmn_id: String,
    /// Cell id (7 hex digits)
    pub ecid: String,
}

impl Ecgi {
    /// Creates a new ECGI.
    pub fn new(plmn_id: impl Into<String>, ecid: impl Into<String>) -> Self {
        Self {
            plmn_id: plmn_id.into(),
            ecid: ecid.into(),
        }
    }
}

impl fmt::Display for Ecgi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.plmn_id, self.ecid)
    }
}

/// An ordered list of waypoints a UE travels along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route name, e.g. `Route-3`
    pub name: String,
    /// Waypoints in traversal order (at least two)
    pub waypoints: Vec<Coordinate>,
    /// Display colour
    pub color: String,
}

impl Route {
    /// Creates a new route.
    pub fn new(
        name: impl Into<String>,
        waypoints: Vec<Coordinate>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            waypoints,
            color: color.into(),
        }
    }

    /// Returns the first waypoint.
    pub fn start(&self) -> Option<&Coordinate> {
        self.waypoints.first()
    }

    /// Returns the last waypoint.
    pub fn finish(&self) -> Option<&Coordinate> {
        self.waypoints.last()
    }

    /// Returns the index of the waypoint exactly equal to `position`.
    pub fn index_of(&self, position: &Coordinate) -> Option<usize> {
        self.waypoints
            .iter()
            .position(|wp| wp.lat == position.lat && wp.lng == position.lng)
    }

    /// Returns true if the route has the minimum two waypoints.
    pub fn is_valid(&self) -> bool {
        self.waypoints.len() >= 2
    }
}

/// A simulated radio tower (cell).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Tower name, e.g. `Tower-5`
    pub name: String,
    /// Fixed position
    pub position: Coordinate,
    /// Display colour
    pub color: String,
    /// PLMN identifier
    pub plmn_id: String,
    /// Cell id (7 hex digits), filled by the grid indexer
    pub ecid: String,
    /// Configured maximum number of UEs (reported, not enforced)
    pub max_ues: u32,
    /// Names of the 4-connected grid neighbours
    pub neighbors: Vec<String>,
}

impl Tower {
    /// Creates a tower with empty network identifiers.
    pub fn new(name: impl Into<String>, position: Coordinate, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            color: color.into(),
            plmn_id: String::new(),
            ecid: String::new(),
            max_ues: 0,
            neighbors: Vec::new(),
        }
    }

    /// Returns the cell global identifier of this tower.
    pub fn ecgi(&self) -> Ecgi {
        Ecgi::new(self.plmn_id.clone(), self.ecid.clone())
    }
}

/// A tower name together with its distance from a UE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerDistance {
    /// Tower name
    pub name: String,
    /// Distance in degrees
    pub distance: f64,
}

impl TowerDistance {
    /// Creates a new tower distance entry.
    pub fn new(name: impl Into<String>, distance: f64) -> Self {
        Self {
            name: name.into(),
            distance,
        }
    }
}

/// The serving tower of a UE and its two handover candidates.
///
/// Candidates are absent only when fewer than three towers exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSet {
    /// Serving tower
    pub serving: TowerDistance,
    /// Second-closest tower
    pub second: Option<TowerDistance>,
    /// Third-closest tower
    pub third: Option<TowerDistance>,
}

impl ServingSet {
    /// Returns the candidate towers in order.
    pub fn candidates(&self) -> impl Iterator<Item = &TowerDistance> {
        self.second.iter().chain(self.third.iter())
    }

    /// Returns serving followed by the candidates.
    pub fn cells(&self) -> impl Iterator<Item = &TowerDistance> {
        std::iter::once(&self.serving).chain(self.candidates())
    }

    /// Returns the candidate names, used to detect handovers.
    pub fn candidate_names(&self) -> (Option<&str>, Option<&str>) {
        (
            self.second.as_ref().map(|t| t.name.as_str()),
            self.third.as_ref().map(|t| t.name.as_str()),
        )
    }
}

/// A simulated user equipment travelling along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ue {
    /// UE name, e.g. `Ue-3`
    pub name: String,
    /// Type tag
    pub ue_type: String,
    /// Current position, always one of the route's waypoints
    pub position: Coordinate,
    /// Current bearing in whole degrees
    pub rotation: u32,
    /// Name of the assigned route
    pub route: String,
    /// Serving tower and candidates
    pub cells: ServingSet,
    /// Radio identifier (4 hex digits), filled by the grid indexer
    pub crnti: String,
}

impl Ue {
    /// Returns the serving tower name.
    pub fn serving_tower(&self) -> &str {
        &self.cells.serving.name
    }
}

/// Kind of a dispatched simulation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Entity created
    Created,
    /// Entity updated
    Updated,
    /// Entity deleted
    Deleted,
}

/// Sub-kind of an update event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateType {
    /// Only the position changed
    Position,
    /// The serving set changed (handover)
    Tower,
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateType::Position => write!(f, "position"),
            UpdateType::Tower => write!(f, "tower"),
        }
    }
}

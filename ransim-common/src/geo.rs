//! Geographic coordinate type and planar geo math
//!
//! Distances are computed directly over latitude/longitude degrees without any
//! projection correction. The value is only ever used to rank towers against
//! each other, so the unit is "degrees" rather than metres.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar distance to `other` in degrees.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance(self, other)
    }

    /// Returns this coordinate shifted by the given deltas.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Straight-line distance between two coordinates in degrees.
///
/// Symmetric, non-negative, and zero only when both points are equal.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_lng = b.lng - a.lng;
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}

/// Direction of travel from `from` to `to` in degrees, clockwise from north.
///
/// The result is in `[0, 360)`. When both points are equal the direction is
/// undefined and `0.0` is returned.
pub fn bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let d_lat = to.lat - from.lat;
    let d_lng = to.lng - from.lng;
    if d_lat == 0.0 && d_lng == 0.0 {
        return 0.0;
    }

    let degrees = d_lng.atan2(d_lat).to_degrees();
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

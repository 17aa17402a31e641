//! # Mission messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A set of waypoints produced by the mission planner.
///
/// `points` is a flat list of `x, y` pairs (or `lat, lon` pairs in geodetic mode), so its length
/// is expected to be even. The guidance core validates this on ingestion.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointSet {
    /// Flattened coordinate pairs
    pub points: Vec<f64>,

    /// Coordinate frame of the points:
    ///
    /// - `0` - NED meters
    /// - `1` - Geodetic degrees (latitude, longitude)
    /// - `2` - Body frame meters, relative to the vehicle's current pose
    pub mode: i64,
}

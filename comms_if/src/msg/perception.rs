//! # Perception messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single detected obstacle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleMsg {
    /// Forward position in meters, measured from the sensor
    pub x: f64,

    /// Lateral position in meters
    pub y: f64,

    /// Radius of the obstacle in meters
    pub radius: f64,
}

/// The set of obstacles currently in view of the detector.
///
/// An empty set means no obstacles are in view.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSet {
    pub obstacles: Vec<ObstacleMsg>,

    /// Number of valid entries in `obstacles`
    pub count: usize,
}

impl ObstacleSet {
    /// Iterate over the valid obstacles in the set.
    ///
    /// Only the first `count` entries are valid, if `count` is larger than the list then the whole
    /// list is used.
    pub fn valid(&self) -> impl Iterator<Item = &ObstacleMsg> {
        self.obstacles.iter().take(self.count)
    }
}

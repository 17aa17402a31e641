//! # Navigation messages
//!
//! Pose, velocity and geodetic reference updates produced by the pose/velocity estimator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Vehicle pose in the local NED frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// North position in meters
    pub x: f64,

    /// East position in meters
    pub y: f64,

    /// Heading (yaw) in radians, measured from north towards east
    pub theta: f64,
}

/// Vehicle velocity in the body frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// Forward (surge) speed in meters/second
    pub u: f64,

    /// Lateral (sway) speed in meters/second
    pub v: f64,

    /// Yaw rate in radians/second
    pub r: f64,
}

/// Reference origin used when converting geodetic waypoints into the local NED frame.
///
/// Units: degrees
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodeticRef {
    pub lat: f64,
    pub lon: f64,
}

//! # Guidance output messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The command produced once per control cycle by the guidance core.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceCommand {
    /// Desired speed in meters/second
    pub speed_ms: f64,

    /// Desired heading in radians, in the range (-pi, pi]
    pub heading_rad: f64,
}

/// Diagnostic points published alongside the command, used for visualisation and testing only.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LosDiagnostics {
    /// The waypoint currently being targeted (NED meters)
    pub target_x: f64,
    pub target_y: f64,

    /// The line-of-sight reference point on the path (NED meters)
    pub los_x: f64,
    pub los_y: f64,
}

impl GuidanceCommand {
    /// A command bringing the vehicle to rest while holding the given heading.
    pub fn stop(heading_rad: f64) -> Self {
        Self {
            speed_ms: 0.0,
            heading_rad,
        }
    }
}

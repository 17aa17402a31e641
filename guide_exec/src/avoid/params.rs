//! Collision avoidance parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::f64::consts::PI;

use util::params::{require, InvalidParam};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for collision avoidance
#[derive(Deserialize, Debug, Clone)]
pub struct AvoidParams {
    /// Radius of a circle enclosing the vehicle.
    ///
    /// Units: meters
    pub boat_radius_m: f64,

    /// Extra clearance added around every obstacle.
    ///
    /// Units: meters
    pub safety_radius_m: f64,

    /// Distance from the vehicle reference point forward to the obstacle sensor, along the body
    /// x axis. Only used for body frame obstacles.
    ///
    /// Units: meters
    pub sensor_offset_m: f64,

    /// Change in the avoidance angle for each threatening obstacle in a cycle.
    ///
    /// Units: radians
    pub avoid_step_rad: f64,

    /// Limit on the magnitude of the accumulated avoidance angle.
    ///
    /// Units: radians
    pub max_avoid_angle_rad: f64,

    /// Speed limit applied in cycles where the avoidance angle is changed.
    ///
    /// Units: meters/second
    pub avoid_speed_ms: f64,

    /// Frame obstacle positions are reported in
    #[serde(default)]
    pub obstacle_frame: ObstacleFrame,
}

/// Frame obstacle positions are reported in
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObstacleFrame {
    /// Relative to the obstacle sensor, x forward and y to starboard
    Body,

    /// Absolute NED positions
    Ned,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ObstacleFrame {
    fn default() -> Self {
        ObstacleFrame::Body
    }
}

impl Default for AvoidParams {
    fn default() -> Self {
        Self {
            boat_radius_m: 0.5,
            safety_radius_m: 0.3,
            sensor_offset_m: 0.55,
            avoid_step_rad: 0.5,
            max_avoid_angle_rad: std::f64::consts::FRAC_PI_2,
            avoid_speed_ms: 0.6,
            obstacle_frame: ObstacleFrame::Body,
        }
    }
}

impl AvoidParams {
    /// Check the collision envelope and dodge limits.
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require(
            "avoid.boat_radius_m",
            self.boat_radius_m,
            self.boat_radius_m >= 0.0 && self.boat_radius_m.is_finite(),
            "non-negative and finite",
        )?;
        require(
            "avoid.safety_radius_m",
            self.safety_radius_m,
            self.safety_radius_m >= 0.0 && self.safety_radius_m.is_finite(),
            "non-negative and finite",
        )?;
        require(
            "avoid.sensor_offset_m",
            self.sensor_offset_m,
            self.sensor_offset_m.is_finite(),
            "finite",
        )?;
        require(
            "avoid.avoid_step_rad",
            self.avoid_step_rad,
            self.avoid_step_rad > 0.0 && self.avoid_step_rad <= PI,
            "in (0, pi]",
        )?;
        require(
            "avoid.max_avoid_angle_rad",
            self.max_avoid_angle_rad,
            self.max_avoid_angle_rad >= 0.0 && self.max_avoid_angle_rad <= PI,
            "in [0, pi]",
        )?;
        require(
            "avoid.avoid_speed_ms",
            self.avoid_speed_ms,
            self.avoid_speed_ms >= 0.0 && self.avoid_speed_ms.is_finite(),
            "non-negative and finite",
        )
    }
}

//! # Control context
//!
//! The control context is the snapshot of the world read by one control tick. It is updated by
//! whole field groups as messages arrive (see [`crate::inputs`]) and passed by reference into the
//! guidance processing, which never mutates it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{GeodeticRef, ObstacleSet, Pose, Velocity};
use nalgebra::Vector2;
use serde::Serialize;

use crate::frames;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Kinematic state of the vehicle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct VehicleState {
    /// Position in the NED frame
    pub position_m_ned: Vector2<f64>,

    /// Heading (yaw) in radians
    pub yaw_rad: f64,

    /// Body frame velocity, `[u, v]` in meters/second
    pub velocity_ms_body: Vector2<f64>,

    /// Yaw rate in radians/second
    pub yaw_rate_rads: f64,
}

/// An obstacle as reported by the detector.
///
/// The position frame depends on the detector, see `AvoidParams::obstacle_frame`.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct Obstacle {
    pub position_m: Vector2<f64>,
    pub radius_m: f64,
}

/// Snapshot of all inputs to a control tick.
#[derive(Debug, Default, Clone)]
pub struct ControlContext {
    /// Current vehicle state
    pub vehicle: VehicleState,

    /// True once at least one pose has been received
    pub pose_valid: bool,

    /// Reference for geodetic waypoints, `None` until one has been received
    pub geodetic_ref: Option<GeodeticRef>,

    /// The obstacles currently in view, replaced entirely on every detection update
    pub obstacles: Vec<Obstacle>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehicleState {
    /// Velocity of the vehicle rotated into the NED frame.
    pub fn velocity_ms_ned(&self) -> Vector2<f64> {
        frames::body_to_ned(self.velocity_ms_body, Vector2::zeros(), self.yaw_rad)
    }
}

impl ControlContext {
    /// Replace the pose field group.
    pub fn apply_pose(&mut self, pose: &Pose) {
        self.vehicle.position_m_ned = Vector2::new(pose.x, pose.y);
        self.vehicle.yaw_rad = pose.theta;
        self.pose_valid = true;
    }

    /// Replace the velocity field group.
    pub fn apply_velocity(&mut self, vel: &Velocity) {
        self.vehicle.velocity_ms_body = Vector2::new(vel.u, vel.v);
        self.vehicle.yaw_rate_rads = vel.r;
    }

    /// Replace the geodetic reference.
    pub fn apply_geodetic_ref(&mut self, geo_ref: &GeodeticRef) {
        self.geodetic_ref = Some(*geo_ref);
    }

    /// Replace the obstacle set. An empty message clears all obstacles.
    pub fn apply_obstacles(&mut self, set: &ObstacleSet) {
        self.obstacles = set
            .valid()
            .map(|o| Obstacle {
                position_m: Vector2::new(o.x, o.y),
                radius_m: o.radius,
            })
            .collect();
    }
}

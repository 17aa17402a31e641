//! # Waypoint path manager
//!
//! Holds the active waypoint path. A path is never edited in place, each accepted waypoint set
//! replaces it wholesale. On ingestion the raw points are converted into the NED frame according to
//! their mode, and the vehicle's current position is prepended so that the first segment always
//! runs from the vehicle to the first real waypoint.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use log::info;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{ctx::ControlContext, frames};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A path of waypoints in the NED frame.
#[derive(Debug, Clone, Serialize)]
pub struct WaypointPath {
    /// Points of the path, the first being the vehicle position when the path was received.
    pub points_m_ned: Vec<Vector2<f64>>,

    /// The frame the waypoints were originally given in
    pub mode: WaypointMode,
}

/// A segment between two path points
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct PathSegment {
    /// The start point of the segment
    pub start_m: Vector2<f64>,

    /// The target of the segment
    pub target_m: Vector2<f64>,

    /// The heading (angle to the +ve x axis) of the segment
    pub heading_rad: f64,

    /// The length of the segment
    pub length_m: f64,
}

/// Manages the active waypoint path.
#[derive(Debug, Default)]
pub struct PathMgr {
    path: Option<WaypointPath>,

    /// Number of paths accepted so far
    num_accepted: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The frame in which a waypoint set is expressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointMode {
    Ned,
    Geodetic,
    Body,
}

/// Reasons a waypoint set can be rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PathError {
    #[error("Invalid path: the waypoint set is empty")]
    Empty,

    #[error("Invalid path: expected an even number of coordinates, found {0}")]
    OddLength(usize),

    #[error("Invalid path: unsupported waypoint mode {0}")]
    UnsupportedMode(i64),

    #[error("Invalid path: geodetic waypoints given before any geodetic reference")]
    NoGeodeticRef,

    #[error("Invalid path: no vehicle pose has been received yet")]
    NoPose,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TryFrom<i64> for WaypointMode {
    type Error = PathError;

    fn try_from(mode: i64) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(WaypointMode::Ned),
            1 => Ok(WaypointMode::Geodetic),
            2 => Ok(WaypointMode::Body),
            m => Err(PathError::UnsupportedMode(m)),
        }
    }
}

impl WaypointPath {
    /// Get the number of points in the path, including the prepended start point.
    pub fn get_num_points(&self) -> usize {
        self.points_m_ned.len()
    }

    /// Get the number of segments in the path.
    pub fn get_num_segments(&self) -> usize {
        self.points_m_ned.len().saturating_sub(1)
    }

    /// Returns the segment connecting point `index - 1` to point `index`.
    ///
    /// If no such segment exists (`index` is zero or beyond the end of the path) then `None` is
    /// returned.
    pub fn get_segment_to_target(&self, index: usize) -> Option<PathSegment> {
        if index == 0 || index >= self.points_m_ned.len() {
            return None;
        }

        let start_m = self.points_m_ned[index - 1];
        let target_m = self.points_m_ned[index];
        let diff = target_m - start_m;

        Some(PathSegment {
            start_m,
            target_m,
            heading_rad: diff[1].atan2(diff[0]),
            length_m: diff.norm(),
        })
    }
}

impl PathMgr {
    /// Replace the active path with a new raw waypoint set.
    ///
    /// `raw_points` is a flat list of coordinate pairs and `mode` the wire mode tag. On error the
    /// previously active path is kept.
    pub fn set_path(
        &mut self,
        raw_points: &[f64],
        mode: i64,
        ctx: &ControlContext,
    ) -> Result<&WaypointPath, PathError> {
        if raw_points.is_empty() {
            return Err(PathError::Empty);
        }
        if raw_points.len() % 2 != 0 {
            return Err(PathError::OddLength(raw_points.len()));
        }
        let mode = WaypointMode::try_from(mode)?;

        if !ctx.pose_valid {
            return Err(PathError::NoPose);
        }

        let vehicle = &ctx.vehicle;
        let pairs = raw_points.chunks(2).map(|p| Vector2::new(p[0], p[1]));

        let converted: Vec<Vector2<f64>> = match mode {
            WaypointMode::Ned => pairs.collect(),
            WaypointMode::Geodetic => {
                let geo_ref = ctx.geodetic_ref.ok_or(PathError::NoGeodeticRef)?;
                pairs
                    .map(|p| frames::geodetic_to_ned(p[0], p[1], &geo_ref))
                    .collect()
            }
            WaypointMode::Body => pairs
                .map(|p| frames::body_to_ned(p, vehicle.position_m_ned, vehicle.yaw_rad))
                .collect(),
        };

        // The vehicle position becomes the start of the first segment
        let mut points_m_ned = Vec::with_capacity(converted.len() + 1);
        points_m_ned.push(vehicle.position_m_ned);
        points_m_ned.extend(converted);

        self.num_accepted += 1;
        info!(
            "New {:?} path accepted with {} waypoints (path #{})",
            mode,
            points_m_ned.len() - 1,
            self.num_accepted
        );

        Ok(self.path.insert(WaypointPath { points_m_ned, mode }))
    }

    /// The currently active path, if any.
    pub fn get_path(&self) -> Option<&WaypointPath> {
        self.path.as_ref()
    }

    /// Number of paths which have been accepted since start up.
    pub fn get_num_accepted(&self) -> usize {
        self.num_accepted
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use comms_if::msg::{GeodeticRef, Pose};
    use std::f64::consts::FRAC_PI_2;

    fn ctx_at(x: f64, y: f64, theta: f64) -> ControlContext {
        let mut ctx = ControlContext::default();
        ctx.apply_pose(&Pose { x, y, theta });
        ctx
    }

    #[test]
    fn test_ned_path_prepends_vehicle() {
        let mut mgr = PathMgr::default();
        let ctx = ctx_at(1.0, -1.0, 0.0);

        let path = mgr.set_path(&[10.0, 0.0, 10.0, 10.0], 0, &ctx).unwrap();
        assert_eq!(path.mode, WaypointMode::Ned);
        assert_eq!(path.get_num_points(), 3);
        assert_eq!(path.get_num_segments(), 2);
        assert_eq!(path.points_m_ned[0], Vector2::new(1.0, -1.0));
        assert_eq!(path.points_m_ned[2], Vector2::new(10.0, 10.0));

        let seg = path.get_segment_to_target(2).unwrap();
        assert_approx_eq!(seg.heading_rad, FRAC_PI_2);
        assert_approx_eq!(seg.length_m, 10.0);
        assert!(path.get_segment_to_target(0).is_none());
        assert!(path.get_segment_to_target(3).is_none());
    }

    #[test]
    fn test_body_path_converted() {
        let mut mgr = PathMgr::default();

        // Facing east at (5, 5), a waypoint 2 m ahead is at (5, 7)
        let ctx = ctx_at(5.0, 5.0, FRAC_PI_2);
        let path = mgr.set_path(&[2.0, 0.0], 2, &ctx).unwrap();
        assert_approx_eq!(path.points_m_ned[1][0], 5.0);
        assert_approx_eq!(path.points_m_ned[1][1], 7.0);
    }

    #[test]
    fn test_geodetic_path_converted() {
        let mut mgr = PathMgr::default();
        let mut ctx = ctx_at(0.0, 0.0, 0.0);

        assert_eq!(
            mgr.set_path(&[0.001, 0.0], 1, &ctx).unwrap_err(),
            PathError::NoGeodeticRef
        );

        ctx.apply_geodetic_ref(&GeodeticRef { lat: 0.0, lon: 0.0 });
        let path = mgr.set_path(&[0.001, 0.0], 1, &ctx).unwrap();
        assert_approx_eq!(path.points_m_ned[1][0], 111.3195, 1e-3);
        assert_approx_eq!(path.points_m_ned[1][1], 0.0, 1e-6);
    }

    #[test]
    fn test_invalid_paths_keep_previous() {
        let mut mgr = PathMgr::default();
        let ctx = ctx_at(0.0, 0.0, 0.0);

        mgr.set_path(&[3.0, 4.0], 0, &ctx).unwrap();

        assert_eq!(mgr.set_path(&[], 0, &ctx).unwrap_err(), PathError::Empty);
        assert_eq!(mgr.set_path(&[1.0, 2.0, 3.0], 0, &ctx).unwrap_err(), PathError::OddLength(3));
        assert_eq!(mgr.set_path(&[1.0, 2.0], 7, &ctx).unwrap_err(), PathError::UnsupportedMode(7));
        assert_eq!(
            mgr.set_path(&[1.0, 2.0], 0, &ControlContext::default()).unwrap_err(),
            PathError::NoPose
        );

        assert_eq!(mgr.get_num_accepted(), 1);
        assert_eq!(mgr.get_path().unwrap().points_m_ned[1], Vector2::new(3.0, 4.0));
    }
}

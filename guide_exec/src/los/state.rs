//! LOS guidance state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{LosParams, SpeedProfile};
use crate::{
    ctx::VehicleState,
    frames,
    path_mgr::{PathSegment, WaypointPath},
};
use util::maths::{logistic, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The LOS guidance engine.
///
/// Holds the segment cursor for the active path, the path itself is owned by the `PathMgr`.
pub struct LosGuidance {
    params: LosParams,

    /// Executing mode
    mode: LosMode,
}

/// Output of one LOS cycle while tracking a segment.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct LosOutput {
    /// The segment being tracked
    pub segment: PathSegment,

    /// Index of the segment target point within the path
    pub target_index: usize,

    /// Heading of the path used for guidance. Equal to the segment heading unless the vehicle
    /// has overshot the target and turn back is enabled.
    pub path_heading_rad: f64,

    /// Bearing demand before any avoidance bias is applied
    pub bearing_rad: f64,

    /// Speed demand
    pub speed_ms: f64,

    /// The look-ahead point on the path the vehicle is steering towards
    pub los_point_m: Vector2<f64>,

    /// Signed cross-track error, positive to starboard of the path
    pub cross_track_m: f64,

    /// Distance along the segment from its start point
    pub along_track_m: f64,

    /// Look-ahead distance
    pub delta_m: f64,

    /// Distance from the vehicle to the segment target
    pub dist_to_target_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of the LOS engine. Each mode is handled by a `mode_xyz` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LosMode {
    /// No path has been accepted yet
    Idle,

    /// Tracking the segment ending at the contained point index
    Tracking(usize),

    /// Every segment of the path has been completed
    Arrived,
}

/// Result of one LOS cycle.
#[derive(Debug, Copy, Clone)]
pub enum LosStep {
    Idle,
    Tracking(LosOutput),
    Arrived,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LosGuidance {
    /// Create a new idle engine.
    pub fn new(params: LosParams) -> Self {
        Self {
            params,
            mode: LosMode::Idle,
        }
    }

    pub fn get_mode(&self) -> LosMode {
        self.mode
    }

    pub fn get_params(&self) -> &LosParams {
        &self.params
    }

    /// Restart tracking from the first segment of a newly accepted path.
    ///
    /// The cursor starts at 1 as a segment is defined backwards, i.e. between the target and the
    /// previous point.
    pub fn begin_path(&mut self) {
        self.mode = LosMode::Tracking(1);
    }

    /// Run one guidance cycle against `path`.
    ///
    /// When a target is reached the cursor is advanced and the next segment is evaluated in the
    /// same cycle, so several targets may be consumed at once if they all lie within the arrival
    /// radius.
    pub fn step(&mut self, path: Option<&WaypointPath>, vehicle: &VehicleState) -> LosStep {
        let path = match path {
            Some(p) => p,
            None => {
                self.mode = LosMode::Idle;
                return LosStep::Idle;
            }
        };

        loop {
            match self.mode {
                LosMode::Idle => return self.mode_idle(),
                LosMode::Arrived => return self.mode_arrived(),
                LosMode::Tracking(k) => {
                    if let Some(out) = self.mode_tracking(path, k, vehicle) {
                        return LosStep::Tracking(out);
                    }
                }
            }
        }
    }

    /// Mode idle.
    ///
    /// No actions are taken in this mode, `begin_path` moves the engine into tracking.
    fn mode_idle(&self) -> LosStep {
        LosStep::Idle
    }

    /// Mode arrived.
    ///
    /// The path is complete, the engine stays here until a new path is begun.
    fn mode_arrived(&self) -> LosStep {
        LosStep::Arrived
    }

    /// Mode tracking.
    ///
    /// Returns `None` if the mode changed and the engine must be stepped again.
    fn mode_tracking(
        &mut self,
        path: &WaypointPath,
        k: usize,
        vehicle: &VehicleState,
    ) -> Option<LosOutput> {
        // ---- TARGET MANAGEMENT ----

        let segment = match path.get_segment_to_target(k) {
            Some(s) => s,
            None => {
                info!("Path complete");
                self.mode = LosMode::Arrived;
                return None;
            }
        };

        let dist_to_target_m = (segment.target_m - vehicle.position_m_ned).norm();

        // Only track while strictly outside the arrival radius
        if !(dist_to_target_m > self.params.arrival_radius_m) {
            info!(
                "Reached waypoint {} of {} ({:.2} m away)",
                k,
                path.get_num_segments(),
                dist_to_target_m
            );

            self.mode = if k >= path.get_num_segments() {
                info!("Path complete");
                LosMode::Arrived
            } else {
                LosMode::Tracking(k + 1)
            };
            return None;
        }

        // ---- BEARING CALCULATION ----

        Some(self.track_segment(&segment, k, dist_to_target_m, vehicle))
    }

    /// Calculate the LOS bearing and speed for a segment.
    fn track_segment(
        &self,
        segment: &PathSegment,
        target_index: usize,
        dist_to_target_m: f64,
        vehicle: &VehicleState,
    ) -> LosOutput {
        let mut path_heading_rad = segment.heading_rad;
        let mut pp = frames::ned_to_path_parallel(
            vehicle.position_m_ned,
            path_heading_rad,
            segment.start_m,
        );

        if self.params.turn_back_on_overshoot && pp[0] > segment.length_m {
            debug!("Overshot target {}, turning back", target_index);
            path_heading_rad = wrap_pi(path_heading_rad - std::f64::consts::PI);
            pp = frames::ned_to_path_parallel(
                vehicle.position_m_ned,
                path_heading_rad,
                segment.start_m,
            );
        }

        let along_track_m = pp[0];
        let cross_track_m = pp[1];

        let delta_m = (self.params.delta_max_m - self.params.delta_min_m)
            * (-cross_track_m.abs() / self.params.gamma_m).exp()
            + self.params.delta_min_m;

        let psi_r = (-cross_track_m / delta_m).atan();
        let bearing_rad = wrap_pi(path_heading_rad + psi_r);

        let los_point_m = segment.start_m
            + (delta_m + along_track_m)
                * Vector2::new(path_heading_rad.cos(), path_heading_rad.sin());

        let speed_ms = self.speed_demand(bearing_rad, dist_to_target_m, vehicle);

        LosOutput {
            segment: *segment,
            target_index,
            path_heading_rad,
            bearing_rad,
            speed_ms,
            los_point_m,
            cross_track_m,
            along_track_m,
            delta_m,
            dist_to_target_m,
        }
    }

    /// Speed demand from the configured profile.
    fn speed_demand(&self, bearing_rad: f64, dist_to_target_m: f64, vehicle: &VehicleState) -> f64 {
        match self.params.speed_profile {
            SpeedProfile::Stepped => {
                if dist_to_target_m < self.params.approach_radius_m {
                    self.params.approach_speed_ms
                } else {
                    self.params.nominal_speed_ms
                }
            }
            SpeedProfile::Sigmoid {
                u_max_ms,
                u_min_ms,
                threshold_radius_m,
                exp_gain,
                exp_offset,
            } => {
                let head_err_norm =
                    wrap_pi(bearing_rad - vehicle.yaw_rad).abs() * std::f64::consts::FRAC_2_PI;

                let u_psi = logistic(head_err_norm, -exp_gain, exp_offset);
                let u_r = logistic(dist_to_target_m / threshold_radius_m, exp_gain, exp_offset);

                (u_max_ms - u_min_ms) * u_psi.min(u_r) + u_min_ms
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path_mgr::WaypointMode;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn path(points: &[[f64; 2]]) -> WaypointPath {
        WaypointPath {
            points_m_ned: points.iter().map(|p| Vector2::new(p[0], p[1])).collect(),
            mode: WaypointMode::Ned,
        }
    }

    fn vehicle_at(x: f64, y: f64) -> VehicleState {
        VehicleState {
            position_m_ned: Vector2::new(x, y),
            ..Default::default()
        }
    }

    fn tracking(step: LosStep) -> LosOutput {
        match step {
            LosStep::Tracking(o) => o,
            s => panic!("Expected tracking, got {:?}", s),
        }
    }

    #[test]
    fn test_idle_without_path() {
        let mut los = LosGuidance::new(LosParams::default());
        assert!(matches!(los.step(None, &vehicle_at(0.0, 0.0)), LosStep::Idle));

        let p = path(&[[0.0, 0.0], [10.0, 0.0]]);
        assert!(matches!(los.step(Some(&p), &vehicle_at(0.0, 0.0)), LosStep::Idle));
    }

    #[test]
    fn test_on_path_bearing() {
        let mut los = LosGuidance::new(LosParams::default());
        let p = path(&[[0.0, 0.0], [10.0, 0.0]]);
        los.begin_path();

        let out = tracking(los.step(Some(&p), &vehicle_at(0.0, 0.0)));

        assert_approx_eq!(out.cross_track_m, 0.0);
        assert_approx_eq!(out.delta_m, 5.0);
        assert_approx_eq!(out.bearing_rad, 0.0);
        assert_approx_eq!(out.speed_ms, 1.0);
        assert_approx_eq!(out.los_point_m[0], 5.0);
        assert_approx_eq!(out.los_point_m[1], 0.0);
        assert_eq!(out.target_index, 1);
    }

    #[test]
    fn test_cross_track_correction() {
        let mut los = LosGuidance::new(LosParams::default());
        let p = path(&[[0.0, 0.0], [0.0, 10.0]]);
        los.begin_path();

        // Path heads along +y, vehicle one meter to -x
        let out = tracking(los.step(Some(&p), &vehicle_at(-1.0, 0.0)));

        let delta = 4.5 * (-2f64).exp() + 0.5;
        assert_approx_eq!(out.cross_track_m, 1.0);
        assert_approx_eq!(out.along_track_m, 0.0);
        assert_approx_eq!(out.delta_m, delta);
        assert_approx_eq!(out.bearing_rad, FRAC_PI_2 + (-1.0 / delta).atan());
        assert!(out.bearing_rad < FRAC_PI_2);
    }

    #[test]
    fn test_large_cross_track_uses_min_delta() {
        let mut los = LosGuidance::new(LosParams::default());
        let p = path(&[[0.0, 0.0], [100.0, 0.0]]);
        los.begin_path();

        let out = tracking(los.step(Some(&p), &vehicle_at(10.0, -50.0)));

        assert_approx_eq!(out.delta_m, 0.5, 1e-9);
        assert!(out.bearing_rad > 0.0 && out.bearing_rad < FRAC_PI_2);
    }

    #[test]
    fn test_approach_speed() {
        let mut los = LosGuidance::new(LosParams::default());
        let p = path(&[[0.0, 0.0], [10.0, 0.0]]);
        los.begin_path();

        let out = tracking(los.step(Some(&p), &vehicle_at(7.0, 0.0)));
        assert_approx_eq!(out.speed_ms, 0.6);
    }

    #[test]
    fn test_arrival_and_advance() {
        let mut los = LosGuidance::new(LosParams::default());
        let p = path(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        los.begin_path();

        // Within the arrival radius of the first target, the second segment is tracked in the
        // same cycle
        let out = tracking(los.step(Some(&p), &vehicle_at(9.5, 0.0)));
        assert_eq!(out.target_index, 2);
        assert_eq!(los.get_mode(), LosMode::Tracking(2));

        // Exactly on the arrival radius counts as arrived
        assert!(matches!(los.step(Some(&p), &vehicle_at(10.0, 9.0)), LosStep::Arrived));
        assert_eq!(los.get_mode(), LosMode::Arrived);

        // Stays arrived wherever the vehicle goes
        assert!(matches!(los.step(Some(&p), &vehicle_at(0.0, 0.0)), LosStep::Arrived));
    }

    #[test]
    fn test_multiple_targets_in_one_cycle() {
        let mut los = LosGuidance::new(LosParams::default());
        let p = path(&[[0.0, 0.0], [0.2, 0.0], [0.4, 0.0], [20.0, 0.0]]);
        los.begin_path();

        let out = tracking(los.step(Some(&p), &vehicle_at(0.0, 0.0)));
        assert_eq!(out.target_index, 3);
    }

    #[test]
    fn test_turn_back_on_overshoot() {
        let mut params = LosParams::default();
        params.turn_back_on_overshoot = true;
        let mut los = LosGuidance::new(params);
        let p = path(&[[0.0, 0.0], [10.0, 0.0]]);
        los.begin_path();

        let out = tracking(los.step(Some(&p), &vehicle_at(15.0, 0.0)));
        assert_approx_eq!(out.path_heading_rad.abs(), std::f64::consts::PI);
        assert_approx_eq!(out.bearing_rad.abs(), std::f64::consts::PI);

        // Without turn back the overshot vehicle keeps the segment heading
        let mut los = LosGuidance::new(LosParams::default());
        los.begin_path();
        let out = tracking(los.step(Some(&p), &vehicle_at(15.0, 0.0)));
        assert_approx_eq!(out.bearing_rad, 0.0);
    }

    #[test]
    fn test_sigmoid_speed() {
        let mut params = LosParams::default();
        params.speed_profile = SpeedProfile::Sigmoid {
            u_max_ms: 1.0,
            u_min_ms: 0.3,
            threshold_radius_m: 5.0,
            exp_gain: 10.0,
            exp_offset: 0.5,
        };
        let mut los = LosGuidance::new(params);
        let p = path(&[[0.0, 0.0], [100.0, 0.0]]);
        los.begin_path();

        // Aligned and far away, close to full speed
        let out = tracking(los.step(Some(&p), &vehicle_at(0.0, 0.0)));
        assert!(out.speed_ms > 0.99);

        // Facing away from the bearing demand, close to minimum speed
        let mut vehicle = vehicle_at(0.0, 0.0);
        vehicle.yaw_rad = FRAC_PI_2 + FRAC_PI_4;
        let out = tracking(los.step(Some(&p), &vehicle));
        assert!(out.speed_ms < 0.31);
        assert!(out.speed_ms >= 0.3);
    }
}

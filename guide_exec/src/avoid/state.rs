//! Collision avoidance state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

// Internal
use super::{AvoidParams, ObstacleFrame};
use crate::{
    ctx::{Obstacle, VehicleState},
    frames,
};
use util::maths::{clamp, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Collision avoidance controller.
///
/// The only state carried between cycles is the accumulated avoidance angle.
pub struct AvoidCtrl {
    params: AvoidParams,

    /// Heading bias added to the LOS bearing.
    avoid_angle_rad: f64,
}

/// Output of one avoidance cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct AvoidOutput {
    /// The avoidance angle to add to the LOS bearing
    pub avoid_angle_rad: f64,

    /// Number of obstacles whose collision cone contains the velocity vector
    pub num_threats: usize,

    /// Number of threats for which the avoidance angle was changed
    pub num_dodges: usize,

    /// Number of threats already inside the safety envelope
    pub num_breaches: usize,

    /// Speed limit to apply this cycle, if any
    pub speed_limit_ms: Option<f64>,
}

/// Collision cone geometry for a single obstacle, in the path-parallel frame.
#[derive(Debug, Copy, Clone)]
pub struct ThreatGeometry {
    /// Sum of vehicle, safety and obstacle radii
    pub total_radius_m: f64,

    /// Distance from the vehicle to the obstacle centre
    pub distance_m: f64,

    /// Collision cone half angle
    pub alpha_rad: f64,

    /// Absolute angle between the velocity vector and the line of sight to the obstacle
    pub beta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AvoidCtrl {
    pub fn new(params: AvoidParams) -> Self {
        Self {
            params,
            avoid_angle_rad: 0.0,
        }
    }

    pub fn get_avoid_angle(&self) -> f64 {
        self.avoid_angle_rad
    }

    pub fn get_params(&self) -> &AvoidParams {
        &self.params
    }

    /// Clear the accumulated avoidance angle.
    pub fn reset(&mut self) {
        self.avoid_angle_rad = 0.0;
    }

    /// Run one avoidance cycle.
    ///
    /// # Inputs
    /// - `path_heading_rad`: heading of the path used by LOS guidance this cycle.
    /// - `target_m_ned`: the current segment target, the origin of the path-parallel frame.
    /// - `vehicle`: the current vehicle state.
    /// - `obstacles`: obstacles in the frame given by `AvoidParams::obstacle_frame`, processed in
    ///   order.
    pub fn proc(
        &mut self,
        path_heading_rad: f64,
        target_m_ned: Vector2<f64>,
        vehicle: &VehicleState,
        obstacles: &[Obstacle],
    ) -> AvoidOutput {
        let mut out = AvoidOutput::default();

        let ppos = frames::ned_to_path_parallel(
            vehicle.position_m_ned,
            path_heading_rad,
            target_m_ned,
        );
        let vpp = frames::ned_to_path_parallel(
            vehicle.velocity_ms_ned(),
            path_heading_rad,
            Vector2::zeros(),
        );

        for (i, obstacle) in obstacles.iter().enumerate() {
            let obs_ned = self.obstacle_to_ned(obstacle, vehicle);
            let opp = frames::ned_to_path_parallel(obs_ned, path_heading_rad, target_m_ned);

            let total_radius_m =
                self.params.boat_radius_m + self.params.safety_radius_m + obstacle.radius_m;

            let geom = match assess_threat(vpp, ppos, opp, total_radius_m) {
                Some(g) => g,
                None => {
                    debug!("Obstacle {} has non-finite geometry, skipped", i);
                    continue;
                }
            };

            trace!(
                "Obstacle {}: d = {:.3} m, alpha = {:.3} rad, beta = {:.3} rad",
                i,
                geom.distance_m,
                geom.alpha_rad,
                geom.beta_rad
            );

            if geom.beta_rad > geom.alpha_rad {
                continue;
            }

            out.num_threats += 1;
            if geom.distance_m < geom.total_radius_m {
                out.num_breaches += 1;
            }

            if self.dodge(vpp, ppos) {
                out.num_dodges += 1;
                out.speed_limit_ms = Some(self.params.avoid_speed_ms);
            }
        }

        if out.num_threats == 0 {
            self.avoid_angle_rad = 0.0;
        } else {
            debug!(
                "{} threat(s), avoidance angle {:.3} rad",
                out.num_threats, self.avoid_angle_rad
            );
        }

        out.avoid_angle_rad = self.avoid_angle_rad;
        out
    }

    /// Step the avoidance angle to one side of the path.
    ///
    /// If the velocity is pointing further to starboard than the vehicle sits from the target,
    /// the angle is increased, otherwise decreased. Returns `false` without changing the angle
    /// if either vector has zero length.
    fn dodge(&mut self, vpp: Vector2<f64>, ppos: Vector2<f64>) -> bool {
        let vel_norm = vpp.norm();
        let pos_norm = ppos.norm();

        if vel_norm < std::f64::EPSILON || pos_norm < std::f64::EPSILON {
            return false;
        }

        let unit_vel_y = vpp[1] / vel_norm;
        let unit_pos_y = ppos[1] / pos_norm;

        let step = if unit_vel_y > unit_pos_y {
            self.params.avoid_step_rad
        } else {
            -self.params.avoid_step_rad
        };

        self.avoid_angle_rad = clamp(
            self.avoid_angle_rad + step,
            -self.params.max_avoid_angle_rad,
            self.params.max_avoid_angle_rad,
        );

        true
    }

    /// Get the NED position of an obstacle.
    fn obstacle_to_ned(&self, obstacle: &Obstacle, vehicle: &VehicleState) -> Vector2<f64> {
        match self.params.obstacle_frame {
            ObstacleFrame::Ned => obstacle.position_m,
            ObstacleFrame::Body => frames::body_to_ned(
                obstacle.position_m + Vector2::new(self.params.sensor_offset_m, 0.0),
                vehicle.position_m_ned,
                vehicle.yaw_rad,
            ),
        }
    }
}

/// Half angle of the collision cone of an obstacle.
///
/// Inside the safety envelope, or for a zero or undefined distance, the cone is widened to the
/// whole half plane facing the obstacle and `pi/2` is returned.
pub fn collision_half_angle(total_radius_m: f64, distance_m: f64) -> f64 {
    if !(distance_m >= total_radius_m) || distance_m <= 0.0 {
        return FRAC_PI_2;
    }

    (total_radius_m / distance_m).asin()
}

/// Calculate the collision cone geometry of an obstacle.
///
/// All vectors are in the path-parallel frame. Returns `None` if any input is not finite.
pub fn assess_threat(
    vpp: Vector2<f64>,
    ppos: Vector2<f64>,
    opp: Vector2<f64>,
    total_radius_m: f64,
) -> Option<ThreatGeometry> {
    let finite = |v: &Vector2<f64>| v.iter().all(|c| c.is_finite());
    if !finite(&vpp) || !finite(&ppos) || !finite(&opp) || !total_radius_m.is_finite() {
        return None;
    }

    let rel = opp - ppos;
    let distance_m = rel.norm();
    let alpha_rad = collision_half_angle(total_radius_m, distance_m);
    let beta_rad = wrap_pi(vpp[1].atan2(vpp[0]) - rel[1].atan2(rel[0])).abs();

    Some(ThreatGeometry {
        total_radius_m,
        distance_m,
        alpha_rad,
        beta_rad,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    fn moving_vehicle(x: f64, y: f64, yaw: f64, u: f64) -> VehicleState {
        VehicleState {
            position_m_ned: Vector2::new(x, y),
            yaw_rad: yaw,
            velocity_ms_body: Vector2::new(u, 0.0),
            yaw_rate_rads: 0.0,
        }
    }

    fn ned_params() -> AvoidParams {
        AvoidParams {
            obstacle_frame: ObstacleFrame::Ned,
            ..Default::default()
        }
    }

    fn obstacle(x: f64, y: f64, r: f64) -> Obstacle {
        Obstacle {
            position_m: Vector2::new(x, y),
            radius_m: r,
        }
    }

    #[test]
    fn test_collision_half_angle() {
        assert_approx_eq!(collision_half_angle(0.5 + 0.3 + 0.2, 2.0), PI / 6.0);
        assert_approx_eq!(collision_half_angle(1.0, 1.0), PI / 2.0);

        // Inside the envelope
        assert_eq!(collision_half_angle(1.0, 0.5), FRAC_PI_2);
        assert_eq!(collision_half_angle(1.0, 0.0), FRAC_PI_2);
        assert_eq!(collision_half_angle(1.0, std::f64::NAN), FRAC_PI_2);
    }

    #[test]
    fn test_assess_threat() {
        let geom = assess_threat(
            Vector2::new(1.0, 0.0),
            Vector2::new(-10.0, 0.0),
            Vector2::new(-8.0, 0.0),
            1.0,
        )
        .unwrap();

        assert_approx_eq!(geom.distance_m, 2.0);
        assert_approx_eq!(geom.alpha_rad, PI / 6.0);
        assert_approx_eq!(geom.beta_rad, 0.0);

        assert!(assess_threat(
            Vector2::new(std::f64::NAN, 0.0),
            Vector2::zeros(),
            Vector2::zeros(),
            1.0
        )
        .is_none());
    }

    /// Vehicle just to port of a path along +x, moving along the path at 1 m/s
    fn port_vehicle() -> VehicleState {
        VehicleState {
            position_m_ned: Vector2::new(0.0, -0.1),
            ..moving_vehicle(0.0, 0.0, 0.0, 1.0)
        }
    }

    #[test]
    fn test_obstacle_ahead_biases() {
        let mut avoid = AvoidCtrl::new(ned_params());

        let out = avoid.proc(
            0.0,
            Vector2::new(10.0, 0.0),
            &port_vehicle(),
            &[obstacle(3.0, -0.1, 0.2)],
        );

        assert_eq!(out.num_threats, 1);
        assert_eq!(out.num_dodges, 1);
        assert_eq!(out.num_breaches, 0);
        assert_eq!(out.speed_limit_ms, Some(0.6));

        // Velocity has no lateral component while the vehicle sits to port of the target, so the
        // angle steps to starboard
        assert_approx_eq!(out.avoid_angle_rad, 0.5);
        assert_approx_eq!(avoid.get_avoid_angle(), 0.5);
    }

    #[test]
    fn test_dodge_to_port() {
        let mut avoid = AvoidCtrl::new(ned_params());
        let vehicle = VehicleState {
            position_m_ned: Vector2::new(0.0, 0.1),
            ..port_vehicle()
        };

        let out = avoid.proc(
            0.0,
            Vector2::new(10.0, 0.0),
            &vehicle,
            &[obstacle(3.0, 0.1, 0.2)],
        );
        assert_approx_eq!(out.avoid_angle_rad, -0.5);
    }

    #[test]
    fn test_bias_accumulates_and_clamps() {
        let mut avoid = AvoidCtrl::new(ned_params());
        let vehicle = port_vehicle();
        let obstacles = [obstacle(3.0, -0.1, 0.2)];
        let target = Vector2::new(10.0, 0.0);

        assert_approx_eq!(avoid.proc(0.0, target, &vehicle, &obstacles).avoid_angle_rad, 0.5);
        assert_approx_eq!(avoid.proc(0.0, target, &vehicle, &obstacles).avoid_angle_rad, 1.0);
        assert_approx_eq!(avoid.proc(0.0, target, &vehicle, &obstacles).avoid_angle_rad, 1.5);
        assert_approx_eq!(
            avoid.proc(0.0, target, &vehicle, &obstacles).avoid_angle_rad,
            FRAC_PI_2
        );
    }

    #[test]
    fn test_obstacles_compound_in_order() {
        let mut avoid = AvoidCtrl::new(ned_params());

        let out = avoid.proc(
            0.0,
            Vector2::new(10.0, 0.0),
            &port_vehicle(),
            &[obstacle(3.0, -0.1, 0.2), obstacle(5.0, -0.1, 0.2)],
        );
        assert_eq!(out.num_threats, 2);
        assert_approx_eq!(out.avoid_angle_rad, 1.0);
    }

    #[test]
    fn test_reset_when_clear() {
        let mut avoid = AvoidCtrl::new(ned_params());
        let vehicle = port_vehicle();
        let target = Vector2::new(10.0, 0.0);

        avoid.proc(0.0, target, &vehicle, &[obstacle(3.0, -0.1, 0.2)]);
        assert!(avoid.get_avoid_angle() != 0.0);

        let out = avoid.proc(0.0, target, &vehicle, &[]);
        assert_eq!(out.num_threats, 0);
        assert_eq!(out.avoid_angle_rad, 0.0);
        assert_eq!(out.speed_limit_ms, None);

        // An obstacle behind the vehicle is not a threat and also resets the angle
        avoid.proc(0.0, target, &vehicle, &[obstacle(3.0, -0.1, 0.2)]);
        let out = avoid.proc(0.0, target, &vehicle, &[obstacle(-5.0, -0.1, 0.2)]);
        assert_eq!(out.num_threats, 0);
        assert_eq!(out.avoid_angle_rad, 0.0);
    }

    #[test]
    fn test_envelope_breach() {
        let mut avoid = AvoidCtrl::new(ned_params());
        let target = Vector2::new(10.0, 0.0);

        // Inside the envelope and off the bow
        let out = avoid.proc(0.0, target, &port_vehicle(), &[obstacle(0.3, 0.5, 0.2)]);
        assert_eq!(out.num_threats, 1);
        assert_eq!(out.num_breaches, 1);
        assert!(out.avoid_angle_rad.is_finite());

        // Inside the envelope but astern while moving away
        let out = avoid.proc(0.0, target, &port_vehicle(), &[obstacle(-0.5, -0.1, 0.2)]);
        assert_eq!(out.num_threats, 0);
    }

    #[test]
    fn test_stationary_vehicle_no_dodge() {
        let mut avoid = AvoidCtrl::new(ned_params());
        let vehicle = moving_vehicle(0.0, 0.0, 0.0, 0.0);

        let out = avoid.proc(
            0.0,
            Vector2::new(10.0, 0.0),
            &vehicle,
            &[obstacle(3.0, 0.0, 0.2)],
        );

        // Threat is detected but no correction is possible
        assert_eq!(out.num_threats, 1);
        assert_eq!(out.num_dodges, 0);
        assert_eq!(out.avoid_angle_rad, 0.0);
        assert_eq!(out.speed_limit_ms, None);
    }

    #[test]
    fn test_body_frame_obstacle() {
        let mut avoid = AvoidCtrl::new(AvoidParams::default());

        // Facing east (+y), an obstacle reported 2 m ahead of the sensor is east of the vehicle
        let vehicle = VehicleState {
            position_m_ned: Vector2::new(0.1, 0.0),
            ..moving_vehicle(0.0, 0.0, PI / 2.0, 1.0)
        };
        let out = avoid.proc(
            PI / 2.0,
            Vector2::new(0.0, 10.0),
            &vehicle,
            &[obstacle(2.0, 0.0, 0.2)],
        );
        assert_eq!(out.num_threats, 1);

        // The same report abeam to port is clear
        let out = avoid.proc(
            PI / 2.0,
            Vector2::new(0.0, 10.0),
            &vehicle,
            &[obstacle(0.0, -5.0, 0.2)],
        );
        assert_eq!(out.num_threats, 0);
    }
}

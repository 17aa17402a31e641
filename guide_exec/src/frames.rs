//! # Frame transforms
//!
//! Pure coordinate conversions between the frames used by guidance:
//!
//! - NED: local north-east frame, x north, y east, meters.
//! - Body: vehicle frame, x forward, y to starboard, rotated from NED by the vehicle yaw.
//! - Path-parallel (PP): frame whose x axis lies along the current path segment.
//! - Geodetic: latitude/longitude in degrees.
//!
//! All rotations are proper 2D rotations, so inverses are taken as transposes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::GeodeticRef;
use nalgebra::{Rotation2, Vector2};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Equatorial radius of the earth (WGS84), in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert a body frame vector into the NED frame.
///
/// The vector is rotated by `yaw_rad` and translated by `origin_m_ned`. Pass a zero origin to
/// rotate a free vector (for example a velocity).
pub fn body_to_ned(body: Vector2<f64>, origin_m_ned: Vector2<f64>, yaw_rad: f64) -> Vector2<f64> {
    Rotation2::new(yaw_rad) * body + origin_m_ned
}

/// Convert an NED point into the body frame of a vehicle at `origin_m_ned` with heading `yaw_rad`.
pub fn ned_to_body(ned: Vector2<f64>, origin_m_ned: Vector2<f64>, yaw_rad: f64) -> Vector2<f64> {
    Rotation2::new(yaw_rad).transpose() * (ned - origin_m_ned)
}

/// Convert an NED point into the path-parallel frame anchored at `anchor_m_ned` with x axis along
/// `path_heading_rad`.
///
/// In this frame the x coordinate is the along-track distance and y the cross-track distance
/// (positive to starboard of the path).
pub fn ned_to_path_parallel(
    ned: Vector2<f64>,
    path_heading_rad: f64,
    anchor_m_ned: Vector2<f64>,
) -> Vector2<f64> {
    Rotation2::new(path_heading_rad).transpose() * (ned - anchor_m_ned)
}

/// Convert a geodetic position (degrees) into the local NED frame centred on `reference`.
///
/// The position is found from the great circle bearing and haversine distance from the reference,
/// which is a flat-earth approximation only valid close to the reference point.
pub fn geodetic_to_ned(lat_deg: f64, lon_deg: f64, reference: &GeodeticRef) -> Vector2<f64> {
    let phi_1 = reference.lat.to_radians();
    let phi_2 = lat_deg.to_radians();
    let delta_phi = phi_2 - phi_1;
    let delta_lambda = (lon_deg - reference.lon).to_radians();

    // Initial great circle bearing from the reference, clockwise from north
    let bearing_rad = (delta_lambda.sin() * phi_2.cos())
        .atan2(phi_1.cos() * phi_2.sin() - phi_1.sin() * phi_2.cos() * delta_lambda.cos());

    // Haversine distance. `a` is clamped as rounding can push it just outside [0, 1].
    let a = ((delta_phi / 2.0).sin().powi(2)
        + phi_1.cos() * phi_2.cos() * (delta_lambda / 2.0).sin().powi(2))
    .max(0.0)
    .min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let distance_m = EARTH_RADIUS_M * c;

    Vector2::new(distance_m * bearing_rad.cos(), distance_m * bearing_rad.sin())
}

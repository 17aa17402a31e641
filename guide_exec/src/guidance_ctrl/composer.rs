//! Command composition
//!
//! Merges the LOS and avoidance outputs of a cycle into the published command. No smoothing or
//! rate limiting is applied here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::{GuidanceCommand, LosDiagnostics};

use crate::{avoid::AvoidOutput, los::LosOutput};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compose the command for a cycle in which a segment is being tracked.
///
/// The heading is the LOS bearing plus the avoidance angle, so the deviation from the raw bearing
/// is exactly the avoidance angle. The speed is limited if avoidance requested it.
pub fn compose(los: &LosOutput, avoid: &AvoidOutput) -> GuidanceCommand {
    let speed_ms = match avoid.speed_limit_ms {
        Some(limit) => los.speed_ms.min(limit),
        None => los.speed_ms,
    };

    GuidanceCommand {
        speed_ms,
        heading_rad: wrap_pi(los.bearing_rad + avoid.avoid_angle_rad),
    }
}

/// Diagnostic points for a tracking cycle.
pub fn diagnostics(los: &LosOutput) -> LosDiagnostics {
    LosDiagnostics {
        target_x: los.segment.target_m[0],
        target_y: los.segment.target_m[1],
        los_x: los.los_point_m[0],
        los_y: los.los_point_m[1],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_compose_without_avoidance() {
        let los = LosOutput {
            bearing_rad: 0.3,
            speed_ms: 1.0,
            ..Default::default()
        };

        let cmd = compose(&los, &AvoidOutput::default());
        assert_approx_eq!(cmd.heading_rad, 0.3);
        assert_approx_eq!(cmd.speed_ms, 1.0);
    }

    #[test]
    fn test_compose_with_avoidance() {
        let los = LosOutput {
            bearing_rad: 3.0,
            speed_ms: 1.0,
            ..Default::default()
        };
        let avoid = AvoidOutput {
            avoid_angle_rad: 0.5,
            num_threats: 1,
            num_dodges: 1,
            speed_limit_ms: Some(0.6),
            ..Default::default()
        };

        let cmd = compose(&los, &avoid);
        assert_approx_eq!(cmd.heading_rad, 3.5 - 2.0 * PI);
        assert_approx_eq!(cmd.speed_ms, 0.6);

        // A limit above the LOS speed has no effect
        let los = LosOutput {
            speed_ms: 0.4,
            ..los
        };
        assert_approx_eq!(compose(&los, &avoid).speed_ms, 0.4);
    }
}

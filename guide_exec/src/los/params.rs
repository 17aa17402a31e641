//! LOS guidance parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use util::params::{require, InvalidParam};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for LOS guidance
#[derive(Deserialize, Debug, Clone)]
pub struct LosParams {
    /// Look-ahead distance when on the path.
    ///
    /// Units: meters
    pub delta_max_m: f64,

    /// Look-ahead distance when far from the path, must be smaller than `delta_max_m` and
    /// positive.
    ///
    /// Units: meters
    pub delta_min_m: f64,

    /// Decay rate of the look-ahead distance with cross-track error. Larger values keep the
    /// look-ahead large over a wider band around the path.
    ///
    /// Units: meters
    pub gamma_m: f64,

    /// Distance to a segment target under which the target is considered reached.
    ///
    /// Units: meters
    pub arrival_radius_m: f64,

    /// Distance to a segment target under which the approach speed is used.
    ///
    /// Units: meters
    pub approach_radius_m: f64,

    /// Speed demand when away from the target.
    ///
    /// Units: meters/second
    pub nominal_speed_ms: f64,

    /// Speed demand inside the approach radius.
    ///
    /// Units: meters/second
    pub approach_speed_ms: f64,

    /// If true, when the vehicle overshoots the current target along the segment direction the
    /// segment heading is reversed so the vehicle turns back towards the target.
    #[serde(default)]
    pub turn_back_on_overshoot: bool,

    /// How the speed demand is calculated.
    #[serde(default)]
    pub speed_profile: SpeedProfile,
}

/// Speed demand law.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub enum SpeedProfile {
    /// Nominal speed, dropping to the approach speed inside the approach radius.
    Stepped,

    /// Smooth speed law reducing speed for large heading errors and close to the target.
    ///
    /// `speed = (u_max - u_min) * min(u_psi, u_r) + u_min`, where `u_psi` and `u_r` are logistic
    /// functions of the normalised heading error and target distance.
    Sigmoid {
        u_max_ms: f64,
        u_min_ms: f64,

        /// Target distance normalisation radius, meters
        threshold_radius_m: f64,

        /// Steepness of the logistic functions
        exp_gain: f64,

        /// Normalised value at which the logistic functions are at half value
        exp_offset: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SpeedProfile {
    fn default() -> Self {
        SpeedProfile::Stepped
    }
}

impl Default for LosParams {
    fn default() -> Self {
        Self {
            delta_max_m: 5.0,
            delta_min_m: 0.5,
            gamma_m: 0.5,
            arrival_radius_m: 1.0,
            approach_radius_m: 5.0,
            nominal_speed_ms: 1.0,
            approach_speed_ms: 0.6,
            turn_back_on_overshoot: false,
            speed_profile: SpeedProfile::Stepped,
        }
    }
}

impl LosParams {
    /// Check the parameters describe a usable guidance law.
    ///
    /// The look-ahead law needs `delta_max_m > delta_min_m > 0` and `gamma_m > 0`, otherwise the
    /// look-ahead distance and therefore the bearing can be NaN.
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require(
            "los.delta_min_m",
            self.delta_min_m,
            self.delta_min_m > 0.0 && self.delta_min_m.is_finite(),
            "positive and finite",
        )?;
        require(
            "los.delta_max_m",
            self.delta_max_m,
            self.delta_max_m > self.delta_min_m && self.delta_max_m.is_finite(),
            "greater than los.delta_min_m and finite",
        )?;
        require(
            "los.gamma_m",
            self.gamma_m,
            self.gamma_m > 0.0 && self.gamma_m.is_finite(),
            "positive and finite",
        )?;
        require(
            "los.arrival_radius_m",
            self.arrival_radius_m,
            self.arrival_radius_m > 0.0 && self.arrival_radius_m.is_finite(),
            "positive and finite",
        )?;
        require(
            "los.approach_radius_m",
            self.approach_radius_m,
            self.approach_radius_m >= 0.0 && self.approach_radius_m.is_finite(),
            "non-negative and finite",
        )?;
        require(
            "los.nominal_speed_ms",
            self.nominal_speed_ms,
            self.nominal_speed_ms >= 0.0 && self.nominal_speed_ms.is_finite(),
            "non-negative and finite",
        )?;
        require(
            "los.approach_speed_ms",
            self.approach_speed_ms,
            self.approach_speed_ms >= 0.0 && self.approach_speed_ms.is_finite(),
            "non-negative and finite",
        )?;

        if let SpeedProfile::Sigmoid {
            u_max_ms,
            u_min_ms,
            threshold_radius_m,
            exp_gain,
            exp_offset,
        } = self.speed_profile
        {
            require(
                "los.speed_profile.u_min_ms",
                u_min_ms,
                u_min_ms >= 0.0 && u_min_ms.is_finite(),
                "non-negative and finite",
            )?;
            require(
                "los.speed_profile.u_max_ms",
                u_max_ms,
                u_max_ms >= u_min_ms && u_max_ms.is_finite(),
                "at least los.speed_profile.u_min_ms and finite",
            )?;
            require(
                "los.speed_profile.threshold_radius_m",
                threshold_radius_m,
                threshold_radius_m > 0.0 && threshold_radius_m.is_finite(),
                "positive and finite",
            )?;
            require(
                "los.speed_profile.exp_gain",
                exp_gain,
                exp_gain.is_finite(),
                "finite",
            )?;
            require(
                "los.speed_profile.exp_offset",
                exp_offset,
                exp_offset.is_finite(),
                "finite",
            )?;
        }

        Ok(())
    }
}

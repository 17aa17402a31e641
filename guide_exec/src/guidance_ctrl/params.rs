//! Parameters structure for GuidanceCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{avoid::AvoidParams, los::LosParams};
use util::params::InvalidParam;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for guidance control, read from `guidance_ctrl.toml`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Params {
    pub los: LosParams,

    pub avoid: AvoidParams,
}

impl Params {
    pub fn validate(&self) -> Result<(), InvalidParam> {
        self.los.validate()?;
        self.avoid.validate()
    }
}

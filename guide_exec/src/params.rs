//! # Guidance Executable Parameters
//!
//! This module provide parameters for the guidance executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct GuideExecParams {
    /// Number of control cycles per second
    pub cycle_frequency_hz: f64,

    /// Number of consecutive cycle overruns after which an error is logged
    pub max_consec_cycle_overruns: u64,

    /// If true the guidance command and status report are archived each cycle
    pub archive: bool,
}

impl GuideExecParams {
    /// Target period of one cycle in seconds.
    pub fn cycle_period_s(&self) -> f64 {
        1.0 / self.cycle_frequency_hz
    }
}

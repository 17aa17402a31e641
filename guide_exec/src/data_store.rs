//! # Data Store

use comms_if::msg::{GuidanceCommand, LosDiagnostics};

use crate::{ctx::ControlContext, guidance_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Snapshot of all inputs, updated at the start of each cycle
    pub ctx: ControlContext,

    /// True once every input stream has been closed
    pub inputs_closed: bool,

    // GuidanceCtrl
    pub guidance_ctrl: guidance_ctrl::GuidanceCtrl,
    pub guidance_cmd: GuidanceCommand,
    pub guidance_status_rpt: guidance_ctrl::StatusReport,
    pub los_diagnostics: Option<LosDiagnostics>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a data store around an already initialised guidance controller.
    pub fn new(guidance_ctrl: guidance_ctrl::GuidanceCtrl) -> Self {
        Self {
            guidance_ctrl,
            ..Default::default()
        }
    }

    /// Clear items that need wiping at the start of the cycle.
    pub fn cycle_start(&mut self) {
        self.los_diagnostics = None;
    }

    /// Finish the cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

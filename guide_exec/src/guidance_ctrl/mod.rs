//! # Guidance control module
//!
//! Top level of the guidance core. `GuidanceCtrl` owns the active path, the LOS guidance engine
//! and the collision avoidance controller, and composes their outputs into one
//! `GuidanceCommand` per control cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod composer;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use composer::*;
pub use params::*;
pub use state::*;

use crate::path_mgr::PathError;
use util::{
    archive::ArchiveError,
    params::{InvalidParam, LoadError},
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during GuidanceCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GuidanceCtrlError {
    #[error("Could not load the guidance parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Invalid guidance parameters: {0}")]
    InvalidParams(InvalidParam),

    #[error("Could not set up the guidance archives: {0}")]
    ArchiveError(ArchiveError),

    #[error("No vehicle pose has been received yet")]
    NoPose,

    #[error("Waypoint set rejected: {0}")]
    InvalidPath(PathError),
}

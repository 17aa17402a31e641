//! # Guidance library.
//!
//! This library contains the guidance core of the USV: waypoint path management, line-of-sight
//! path following and collision cone obstacle avoidance. The `guide_exec` binary runs it at a
//! fixed rate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Collision avoidance - biases the bearing demand away from obstacles on a collision course
pub mod avoid;

/// Control context - the snapshot of all inputs used by one control cycle
pub mod ctx;

/// Control cycle - a single evaluation of the guidance core
pub mod cycle;

/// Global data store for the executable
pub mod data_store;

/// Frame transforms between the body, NED, path-parallel and geodetic frames
pub mod frames;

/// Guidance control module - produces the speed and heading command
pub mod guidance_ctrl;

/// Input streams - one channel per input, drained at the start of each cycle
pub mod inputs;

/// Line-of-sight guidance - keeps the vehicle on the active path
pub mod los;

/// Executable parameters
pub mod params;

/// Shutdown requests from outside the process
pub mod signal;

/// Waypoint path manager - validates waypoint sets and holds the active path
pub mod path_mgr;

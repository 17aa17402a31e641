//! # Communications interface crate.
//!
//! Provides the message contracts exchanged between the guidance core and its collaborators
//! (pose estimator, mission planner, obstacle detector and actuation).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions consumed and produced by the guidance core
pub mod msg;

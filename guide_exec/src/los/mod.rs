//! # Line-of-sight guidance module
//!
//! LOS guidance keeps the vehicle on the active waypoint path by steering towards a point a
//! look-ahead distance further along the current segment, rather than directly at the next
//! waypoint.
//!
//! For the segment from `p1` to `p2` with heading `ak`, the vehicle position is projected into the
//! segment's frame to give the along-track distance `xe` and the cross-track error `ye`. The
//! look-ahead distance shrinks as the cross-track error grows,
//!
//! ```text
//! delta = (delta_max - delta_min) * exp(-|ye| / gamma) + delta_min
//! ```
//!
//! so a vehicle far off the path steers back more aggressively. The bearing demand is then
//! `ak + atan(-ye / delta)`.
//!
//! Segments are consumed in order. Once the vehicle comes within the arrival radius of a segment's
//! target the next segment is selected, and after the last segment the engine reports arrival.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::{LosParams, SpeedProfile};
pub use state::*;

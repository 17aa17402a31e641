//! # Collision avoidance module
//!
//! Biases the LOS bearing demand away from obstacles which lie inside the vehicle's collision
//! cone.
//!
//! Obstacles and the vehicle are expressed in a path-parallel frame anchored at the current
//! segment target. For each obstacle a cone of half angle `alpha = asin(R / d)` is formed, where
//! `R` is the sum of the vehicle, safety and obstacle radii and `d` the distance to the obstacle.
//! If the velocity vector lies within the cone the obstacle is a threat and the avoidance angle
//! is stepped to one side. The angle accumulates over consecutive threatened cycles and is reset
//! as soon as a cycle passes with no threat.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::{AvoidParams, ObstacleFrame};
pub use state::*;

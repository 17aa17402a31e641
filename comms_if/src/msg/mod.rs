//! # Message module
//!
//! This module provides the logical messages which flow into and out of the guidance core. The
//! transport carrying these messages is not defined here, any transport able to deliver serde
//! types can be used.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod guidance;
pub mod mission;
pub mod nav;
pub mod perception;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
pub use guidance::*;
pub use mission::*;
pub use nav::*;
pub use perception::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An input message, i.e. one update arriving from a collaborator of the guidance core.
///
/// In JSON form the message is an object with a `type` string and a `payload`, for example:
///
/// ```json
/// {"type": "POSE", "payload": {"x": 1.0, "y": 2.0, "theta": 0.1}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum InputMsg {
    /// Vehicle pose in the NED frame
    #[serde(rename = "POSE")]
    Pose(Pose),

    /// Vehicle velocity in the body frame
    #[serde(rename = "VEL")]
    Velocity(Velocity),

    /// Reference origin for geodetic conversion
    #[serde(rename = "GEO_REF")]
    GeodeticRef(GeodeticRef),

    /// A new set of waypoints to follow
    #[serde(rename = "WAYPOINTS")]
    Waypoints(WaypointSet),

    /// The obstacles currently in view
    #[serde(rename = "OBSTACLES")]
    Obstacles(ObstacleSet),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum MsgParseError {
    #[error("Message contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputMsg {
    /// Parse a new message from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, MsgParseError> {
        serde_json::from_str(json_str).map_err(MsgParseError::InvalidJson)
    }

    /// Short name of the stream this message belongs to, used in logs.
    pub fn stream_name(&self) -> &'static str {
        match self {
            InputMsg::Pose(_) => "pose",
            InputMsg::Velocity(_) => "velocity",
            InputMsg::GeodeticRef(_) => "geodetic_ref",
            InputMsg::Waypoints(_) => "waypoints",
            InputMsg::Obstacles(_) => "obstacles",
        }
    }
}

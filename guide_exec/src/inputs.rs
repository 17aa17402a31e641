//! # Input streams
//!
//! Each input stream (pose, velocity, geodetic reference, waypoints, obstacles) is carried by its
//! own channel. Collaborators push messages through [`InputSenders`] whenever they like, the control
//! loop drains [`InputStreams`] at the top of each tick without blocking. Only the most recent
//! message of each stream is kept, older ones are superseded.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::msg::{GeodeticRef, InputMsg, ObstacleSet, Pose, Velocity, WaypointSet};
use log::trace;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use thiserror::Error;

use crate::ctx::ControlContext;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sending halves of the input channels, handed to the transport.
#[derive(Clone)]
pub struct InputSenders {
    pub pose: Sender<Pose>,
    pub velocity: Sender<Velocity>,
    pub geodetic_ref: Sender<GeodeticRef>,
    pub waypoints: Sender<WaypointSet>,
    pub obstacles: Sender<ObstacleSet>,
}

/// Receiving halves of the input channels, owned by the control loop.
pub struct InputStreams {
    pose: Receiver<Pose>,
    velocity: Receiver<Velocity>,
    geodetic_ref: Receiver<GeodeticRef>,
    waypoints: Receiver<WaypointSet>,
    obstacles: Receiver<ObstacleSet>,
}

/// The result of draining the input streams.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// The most recent waypoint set received since the last drain, if any
    pub new_waypoints: Option<WaypointSet>,

    /// Number of messages taken from the streams
    pub num_msgs: usize,

    /// True if every sender has been dropped, i.e. no more input will ever arrive
    pub all_disconnected: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum InputError {
    #[error("The {0} stream has been closed by the control loop")]
    StreamClosed(&'static str),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create the set of input channels.
pub fn input_channels() -> (InputSenders, InputStreams) {
    let (pose_tx, pose_rx) = channel();
    let (vel_tx, vel_rx) = channel();
    let (geo_tx, geo_rx) = channel();
    let (wp_tx, wp_rx) = channel();
    let (obs_tx, obs_rx) = channel();

    (
        InputSenders {
            pose: pose_tx,
            velocity: vel_tx,
            geodetic_ref: geo_tx,
            waypoints: wp_tx,
            obstacles: obs_tx,
        },
        InputStreams {
            pose: pose_rx,
            velocity: vel_rx,
            geodetic_ref: geo_rx,
            waypoints: wp_rx,
            obstacles: obs_rx,
        },
    )
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputSenders {
    /// Route a message to its stream.
    pub fn send(&self, msg: InputMsg) -> Result<(), InputError> {
        let name = msg.stream_name();
        let res = match msg {
            InputMsg::Pose(m) => self.pose.send(m).is_ok(),
            InputMsg::Velocity(m) => self.velocity.send(m).is_ok(),
            InputMsg::GeodeticRef(m) => self.geodetic_ref.send(m).is_ok(),
            InputMsg::Waypoints(m) => self.waypoints.send(m).is_ok(),
            InputMsg::Obstacles(m) => self.obstacles.send(m).is_ok(),
        };

        match res {
            true => Ok(()),
            false => Err(InputError::StreamClosed(name)),
        }
    }
}

impl InputStreams {
    /// Drain all streams, applying the most recent message of each into the context.
    ///
    /// Streams with no new message leave their field group untouched, so the previous snapshot is
    /// reused. Waypoint sets are not applied here but returned, since they must pass validation by
    /// the path manager.
    pub fn drain(&self, ctx: &mut ControlContext) -> DrainReport {
        let mut report = DrainReport::default();
        let mut num_disconnected = 0;

        let (pose, n, d) = latest(&self.pose);
        report.num_msgs += n;
        num_disconnected += d as usize;
        if let Some(p) = pose {
            ctx.apply_pose(&p);
        }

        let (vel, n, d) = latest(&self.velocity);
        report.num_msgs += n;
        num_disconnected += d as usize;
        if let Some(v) = vel {
            ctx.apply_velocity(&v);
        }

        let (geo, n, d) = latest(&self.geodetic_ref);
        report.num_msgs += n;
        num_disconnected += d as usize;
        if let Some(g) = geo {
            ctx.apply_geodetic_ref(&g);
        }

        let (obs, n, d) = latest(&self.obstacles);
        report.num_msgs += n;
        num_disconnected += d as usize;
        if let Some(o) = obs {
            ctx.apply_obstacles(&o);
        }

        let (wps, n, d) = latest(&self.waypoints);
        report.num_msgs += n;
        num_disconnected += d as usize;
        report.new_waypoints = wps;

        report.all_disconnected = num_disconnected == 5;

        if report.num_msgs > 0 {
            trace!("Drained {} input messages", report.num_msgs);
        }

        report
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Take every pending message from the receiver, returning the last one, the number taken, and
/// whether the sender side has gone.
fn latest<T>(rx: &Receiver<T>) -> (Option<T>, usize, bool) {
    let mut last = None;
    let mut num = 0;

    loop {
        match rx.try_recv() {
            Ok(m) => {
                last = Some(m);
                num += 1;
            }
            Err(TryRecvError::Empty) => return (last, num, false),
            Err(TryRecvError::Disconnected) => return (last, num, true),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::ObstacleMsg;

    #[test]
    fn test_most_recent_wins() {
        let (tx, rx) = input_channels();
        let mut ctx = ControlContext::default();

        tx.send(InputMsg::Pose(Pose { x: 1.0, y: 0.0, theta: 0.0 })).unwrap();
        tx.send(InputMsg::Pose(Pose { x: 2.0, y: 0.0, theta: 0.0 })).unwrap();
        tx.send(InputMsg::Waypoints(WaypointSet { points: vec![1.0, 1.0], mode: 0 }))
            .unwrap();
        tx.send(InputMsg::Waypoints(WaypointSet { points: vec![5.0, 5.0], mode: 0 }))
            .unwrap();

        let report = rx.drain(&mut ctx);
        assert_eq!(report.num_msgs, 4);
        assert!(!report.all_disconnected);
        assert_eq!(ctx.vehicle.position_m_ned[0], 2.0);
        assert_eq!(report.new_waypoints.unwrap().points, vec![5.0, 5.0]);

        // Nothing new, the previous snapshot remains
        let report = rx.drain(&mut ctx);
        assert_eq!(report.num_msgs, 0);
        assert!(report.new_waypoints.is_none());
        assert_eq!(ctx.vehicle.position_m_ned[0], 2.0);
    }

    #[test]
    fn test_obstacles_replaced() {
        let (tx, rx) = input_channels();
        let mut ctx = ControlContext::default();

        let o = ObstacleMsg { x: 4.0, y: 0.0, radius: 0.3 };
        tx.send(InputMsg::Obstacles(ObstacleSet { obstacles: vec![o], count: 1 })).unwrap();
        rx.drain(&mut ctx);
        assert_eq!(ctx.obstacles.len(), 1);

        tx.send(InputMsg::Obstacles(ObstacleSet::default())).unwrap();
        rx.drain(&mut ctx);
        assert!(ctx.obstacles.is_empty());
    }

    #[test]
    fn test_disconnection() {
        let (tx, rx) = input_channels();
        let mut ctx = ControlContext::default();

        tx.send(InputMsg::Velocity(Velocity { u: 1.0, v: 0.0, r: 0.0 })).unwrap();
        drop(tx);

        // Pending messages are still delivered on disconnection
        let report = rx.drain(&mut ctx);
        assert!(report.all_disconnected);
        assert_eq!(ctx.vehicle.velocity_ms_body[0], 1.0);
    }
}

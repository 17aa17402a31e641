//! # Control cycle
//!
//! One evaluation of the guidance core: drain the input streams into the control context, apply
//! any new waypoint set, then run guidance control and store the command for publication.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::GuidanceCommand;
use log::{debug, warn};

use crate::{
    data_store::DataStore,
    guidance_ctrl::GuidanceCtrlError,
    inputs::InputStreams,
    path_mgr::WaypointPath,
};
use util::{maths::wrap_pi, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Events from a cycle which the executable may want to act on.
#[derive(Debug, Default)]
pub struct CycleEvents {
    /// The path accepted this cycle, if any
    pub new_path: Option<WaypointPath>,

    /// Number of input messages received this cycle
    pub num_msgs: usize,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute one control cycle.
///
/// Errors never leave this function: a failed guidance cycle publishes a stop command holding
/// the current heading.
pub fn run_cycle(ds: &mut DataStore, streams: &InputStreams) -> CycleEvents {
    ds.cycle_start();

    // ---- INPUTS ----

    let drain = streams.drain(&mut ds.ctx);
    ds.inputs_closed = drain.all_disconnected;

    let mut events = CycleEvents {
        new_path: None,
        num_msgs: drain.num_msgs,
    };

    if let Some(set) = drain.new_waypoints {
        match ds.guidance_ctrl.set_path(&set, &ds.ctx) {
            Ok(path) => events.new_path = Some(path.clone()),
            Err(e) => warn!("{}", e),
        }
    }

    // ---- GUIDANCE ----

    match ds.guidance_ctrl.proc(&ds.ctx) {
        Ok((cmd, rpt)) => {
            ds.guidance_cmd = cmd;
            ds.guidance_status_rpt = rpt;
        }
        Err(e) => {
            match e {
                GuidanceCtrlError::NoPose => debug!("{}", e),
                _ => warn!("Error during GuidanceCtrl processing: {}", e),
            }
            ds.guidance_cmd = GuidanceCommand::stop(wrap_pi(ds.ctx.vehicle.yaw_rad));
            ds.guidance_status_rpt = ds.guidance_ctrl.get_report();
        }
    }

    ds.los_diagnostics = ds.guidance_ctrl.get_diagnostics();

    events
}

/// Stop the guidance core, storing the final command for publication.
///
/// The final command is zero speed on the last known heading.
pub fn run_shutdown(ds: &mut DataStore) -> GuidanceCommand {
    ds.los_diagnostics = None;
    ds.guidance_cmd = ds.guidance_ctrl.shutdown();
    ds.guidance_cmd
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{inputs::input_channels, signal::ShutdownFlag};
    use assert_approx_eq::assert_approx_eq;
    use comms_if::msg::{Pose, WaypointSet};
    use std::f64::consts::PI;

    #[test]
    fn test_cycle_without_pose() {
        let (senders, streams) = input_channels();
        let mut ds = DataStore::default();

        senders
            .waypoints
            .send(WaypointSet {
                points: vec![10.0, 0.0],
                mode: 0,
            })
            .unwrap();

        let events = run_cycle(&mut ds, &streams);

        assert!(events.new_path.is_none());
        assert_eq!(ds.guidance_cmd, GuidanceCommand::stop(0.0));
    }

    #[test]
    fn test_cycle_accepts_path() {
        let (senders, streams) = input_channels();
        let mut ds = DataStore::default();

        senders.pose.send(Pose { x: 0.0, y: 0.0, theta: 0.0 }).unwrap();
        senders
            .waypoints
            .send(WaypointSet {
                points: vec![10.0, 0.0],
                mode: 0,
            })
            .unwrap();

        let events = run_cycle(&mut ds, &streams);

        assert_eq!(events.num_msgs, 2);
        assert_eq!(events.new_path.unwrap().get_num_points(), 2);
        assert_eq!(ds.guidance_cmd.speed_ms, 1.0);
        assert!(ds.los_diagnostics.is_some());
        assert!(!ds.inputs_closed);

        drop(senders);
        run_cycle(&mut ds, &streams);
        assert!(ds.inputs_closed);
    }

    #[test]
    fn test_shutdown_request_publishes_stop() {
        let (senders, streams) = input_channels();
        let mut ds = DataStore::default();
        let shutdown = ShutdownFlag::new();

        senders.pose.send(Pose { x: 0.0, y: 0.0, theta: 0.3 }).unwrap();
        senders
            .waypoints
            .send(WaypointSet {
                points: vec![10.0, 0.0],
                mode: 0,
            })
            .unwrap();

        // Run as the main loop does until the flag is raised part way through the path
        let mut num_cycles = 0;
        loop {
            if shutdown.is_requested() {
                break;
            }
            run_cycle(&mut ds, &streams);
            num_cycles += 1;
            if num_cycles == 3 {
                shutdown.request();
            }
        }

        assert_eq!(num_cycles, 3);
        assert!(ds.guidance_cmd.speed_ms > 0.0);

        let final_cmd = run_shutdown(&mut ds);
        assert_eq!(final_cmd, GuidanceCommand::stop(0.3));
        assert_eq!(ds.guidance_cmd, final_cmd);
        assert!(ds.los_diagnostics.is_none());
    }

    #[test]
    fn test_idle_cycle_heading_wrapped() {
        let (senders, streams) = input_channels();
        let mut ds = DataStore::default();

        senders.pose.send(Pose { x: 0.0, y: 0.0, theta: 4.0 }).unwrap();
        run_cycle(&mut ds, &streams);
        assert_approx_eq!(ds.guidance_cmd.heading_rad, 4.0 - 2.0 * PI);

        let final_cmd = run_shutdown(&mut ds);
        assert!(final_cmd.heading_rad > -PI && final_cmd.heading_rad <= PI);
        assert_approx_eq!(final_cmd.heading_rad, 4.0 - 2.0 * PI);
    }
}

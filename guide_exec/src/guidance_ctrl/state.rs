//! Implementations for the GuidanceCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::msg::{GuidanceCommand, LosDiagnostics, WaypointSet};
use log::trace;
use serde::Serialize;

// Internal
use super::{compose, diagnostics, GuidanceCtrlError, Params};
use crate::{
    avoid::AvoidCtrl,
    ctx::ControlContext,
    los::{LosGuidance, LosMode, LosStep},
    path_mgr::{PathMgr, WaypointPath},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    maths::wrap_pi,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Guidance control module state
pub struct GuidanceCtrl {
    params: Params,

    path_mgr: PathMgr,
    los: LosGuidance,
    avoid: AvoidCtrl,

    /// Heading of the vehicle at the last cycle, held by the shutdown command
    last_yaw_rad: f64,

    report: StatusReport,
    arch_report: Archiver,

    output: GuidanceCommand,
    arch_output: Archiver,

    diagnostics: Option<LosDiagnostics>,
}

/// Status report for GuidanceCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub mode: GuidanceMode,

    /// Index of the segment target within the path, 0 when not tracking
    pub target_index: usize,

    /// Distance to the segment target
    pub dist_to_target_m: f64,

    /// Cross-track error, positive to starboard of the path
    pub cross_track_m: f64,

    /// Along-track distance from the segment start
    pub along_track_m: f64,

    /// LOS look-ahead distance
    pub delta_m: f64,

    pub path_heading_rad: f64,

    /// Bearing demand before avoidance
    pub los_bearing_rad: f64,

    pub avoid_angle_rad: f64,

    pub num_threats: usize,
    pub num_dodges: usize,
    pub num_breaches: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Guidance mode reported each cycle.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum GuidanceMode {
    /// No pose received yet
    NoPose,
    Idle,
    Tracking,
    Arrived,
}

impl Default for GuidanceMode {
    fn default() -> Self {
        GuidanceMode::Idle
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GuidanceCtrl {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl State for GuidanceCtrl {
    type InitData = &'static str;
    type InitError = GuidanceCtrlError;

    type InputData = ControlContext;
    type OutputData = GuidanceCommand;
    type StatusReport = StatusReport;
    type ProcError = GuidanceCtrlError;

    /// Initialise the GuidanceCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        let params: Params =
            params::load(init_data).map_err(GuidanceCtrlError::ParamLoadError)?;
        *self = Self::from_params(params)?;

        self.arch_report = Archiver::from_path(session, "guidance_ctrl/status_report.csv")
            .map_err(GuidanceCtrlError::ArchiveError)?;
        self.arch_output = Archiver::from_path(session, "guidance_ctrl/command.csv")
            .map_err(GuidanceCtrlError::ArchiveError)?;

        Ok(())
    }

    /// Perform cyclic processing of guidance control.
    ///
    /// Any new waypoint set must be given with `set_path` before calling this function for it
    /// to take effect in the same cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the cycle data
        self.report = StatusReport::default();
        self.diagnostics = None;

        if !input_data.pose_valid {
            self.report.mode = GuidanceMode::NoPose;
            self.output = GuidanceCommand::stop(0.0);
            return Err(GuidanceCtrlError::NoPose);
        }

        let vehicle = &input_data.vehicle;
        let yaw_rad = wrap_pi(vehicle.yaw_rad);
        self.last_yaw_rad = yaw_rad;

        let output = match self.los.step(self.path_mgr.get_path(), vehicle) {
            LosStep::Idle => {
                self.report.mode = GuidanceMode::Idle;
                self.avoid.reset();
                GuidanceCommand::stop(yaw_rad)
            }
            LosStep::Arrived => {
                self.report.mode = GuidanceMode::Arrived;
                self.avoid.reset();
                GuidanceCommand::stop(yaw_rad)
            }
            LosStep::Tracking(los_out) => {
                let avoid_out = self.avoid.proc(
                    los_out.path_heading_rad,
                    los_out.segment.target_m,
                    vehicle,
                    &input_data.obstacles,
                );

                self.report = StatusReport {
                    mode: GuidanceMode::Tracking,
                    target_index: los_out.target_index,
                    dist_to_target_m: los_out.dist_to_target_m,
                    cross_track_m: los_out.cross_track_m,
                    along_track_m: los_out.along_track_m,
                    delta_m: los_out.delta_m,
                    path_heading_rad: los_out.path_heading_rad,
                    los_bearing_rad: los_out.bearing_rad,
                    avoid_angle_rad: avoid_out.avoid_angle_rad,
                    num_threats: avoid_out.num_threats,
                    num_dodges: avoid_out.num_dodges,
                    num_breaches: avoid_out.num_breaches,
                };
                self.diagnostics = Some(diagnostics(&los_out));

                compose(&los_out, &avoid_out)
            }
        };

        trace!(
            "GuidanceCtrl output: speed {:.3} m/s, heading {:.4} rad ({:?})",
            output.speed_ms,
            output.heading_rad,
            self.report.mode
        );

        self.output = output;

        Ok((output, self.report))
    }

    /// Stop the vehicle on its last known heading.
    fn shutdown(&mut self) -> Self::OutputData {
        self.output = GuidanceCommand::stop(self.last_yaw_rad);
        self.output
    }
}

impl Archived for GuidanceCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

impl GuidanceCtrl {
    /// Create a new guidance controller without archiving.
    pub fn new(params: Params) -> Self {
        Self {
            path_mgr: PathMgr::default(),
            los: LosGuidance::new(params.los.clone()),
            avoid: AvoidCtrl::new(params.avoid.clone()),
            params,
            last_yaw_rad: 0.0,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: GuidanceCommand::default(),
            arch_output: Archiver::default(),
            diagnostics: None,
        }
    }

    /// Create a new guidance controller without archiving, rejecting invalid parameters.
    pub fn from_params(params: Params) -> Result<Self, GuidanceCtrlError> {
        params
            .validate()
            .map_err(GuidanceCtrlError::InvalidParams)?;

        Ok(Self::new(params))
    }

    /// Replace the active path with a new waypoint set.
    ///
    /// On success tracking restarts from the first segment of the new path. On error the
    /// previous path, and progress along it, is kept.
    pub fn set_path(
        &mut self,
        set: &WaypointSet,
        ctx: &ControlContext,
    ) -> Result<&WaypointPath, GuidanceCtrlError> {
        let path = self
            .path_mgr
            .set_path(&set.points, set.mode, ctx)
            .map_err(GuidanceCtrlError::InvalidPath)?;

        self.los.begin_path();
        self.avoid.reset();

        Ok(path)
    }

    pub fn get_params(&self) -> &Params {
        &self.params
    }

    pub fn get_path(&self) -> Option<&WaypointPath> {
        self.path_mgr.get_path()
    }

    pub fn get_num_paths_accepted(&self) -> usize {
        self.path_mgr.get_num_accepted()
    }

    pub fn get_los_mode(&self) -> LosMode {
        self.los.get_mode()
    }

    /// Status report from the last cycle.
    pub fn get_report(&self) -> StatusReport {
        self.report
    }

    /// Diagnostic points from the last cycle, `None` if no segment was tracked.
    pub fn get_diagnostics(&self) -> Option<LosDiagnostics> {
        self.diagnostics
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path_mgr::PathError;
    use assert_approx_eq::assert_approx_eq;
    use comms_if::msg::Pose;
    use std::f64::consts::PI;

    fn ctx_at(x: f64, y: f64, theta: f64) -> ControlContext {
        let mut ctx = ControlContext::default();
        ctx.apply_pose(&Pose { x, y, theta });
        ctx
    }

    #[test]
    fn test_no_pose() {
        let mut ctrl = GuidanceCtrl::default();
        let ctx = ControlContext::default();

        assert!(matches!(ctrl.proc(&ctx), Err(GuidanceCtrlError::NoPose)));

        let set = WaypointSet {
            points: vec![10.0, 0.0],
            mode: 0,
        };
        assert!(matches!(
            ctrl.set_path(&set, &ctx),
            Err(GuidanceCtrlError::InvalidPath(PathError::NoPose))
        ));
    }

    #[test]
    fn test_idle_holds_heading() {
        let mut ctrl = GuidanceCtrl::default();
        let ctx = ctx_at(0.0, 0.0, 1.2);

        let (cmd, report) = ctrl.proc(&ctx).unwrap();
        assert_eq!(cmd, GuidanceCommand::stop(1.2));
        assert_eq!(report.mode, GuidanceMode::Idle);
        assert!(ctrl.get_diagnostics().is_none());
    }

    #[test]
    fn test_tracking_and_diagnostics() {
        let mut ctrl = GuidanceCtrl::default();
        let ctx = ctx_at(0.0, 0.0, 0.0);

        let set = WaypointSet {
            points: vec![10.0, 0.0],
            mode: 0,
        };
        ctrl.set_path(&set, &ctx).unwrap();

        let (cmd, report) = ctrl.proc(&ctx).unwrap();
        assert_eq!(report.mode, GuidanceMode::Tracking);
        assert_eq!(report.target_index, 1);
        assert_approx_eq!(cmd.heading_rad, 0.0);
        assert_approx_eq!(cmd.speed_ms, 1.0);

        let diag = ctrl.get_diagnostics().unwrap();
        assert_approx_eq!(diag.target_x, 10.0);
        assert_approx_eq!(diag.los_x, 5.0);
        assert_approx_eq!(diag.los_y, 0.0);
    }

    #[test]
    fn test_rejected_path_keeps_progress() {
        let mut ctrl = GuidanceCtrl::default();
        let mut ctx = ctx_at(0.0, 0.0, 0.0);

        let set = WaypointSet {
            points: vec![10.0, 0.0, 10.0, 10.0],
            mode: 0,
        };
        ctrl.set_path(&set, &ctx).unwrap();

        ctx.apply_pose(&Pose {
            x: 9.5,
            y: 0.0,
            theta: 0.0,
        });
        ctrl.proc(&ctx).unwrap();
        assert_eq!(ctrl.get_los_mode(), LosMode::Tracking(2));

        let bad = WaypointSet {
            points: vec![1.0, 2.0, 3.0],
            mode: 0,
        };
        assert!(ctrl.set_path(&bad, &ctx).is_err());
        assert_eq!(ctrl.get_los_mode(), LosMode::Tracking(2));
        assert_eq!(ctrl.get_num_paths_accepted(), 1);
    }

    #[test]
    fn test_shutdown_stops_on_last_heading() {
        let mut ctrl = GuidanceCtrl::default();
        ctrl.proc(&ctx_at(0.0, 0.0, -0.7)).unwrap();

        assert_eq!(ctrl.shutdown(), GuidanceCommand::stop(-0.7));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = Params::default();
        params.los.gamma_m = 0.0;

        match GuidanceCtrl::from_params(params) {
            Err(GuidanceCtrlError::InvalidParams(e)) => assert_eq!(e.name, "los.gamma_m"),
            _ => panic!("Zero gamma accepted"),
        }

        let mut params = Params::default();
        params.avoid.avoid_speed_ms = -1.0;
        assert!(matches!(
            GuidanceCtrl::from_params(params),
            Err(GuidanceCtrlError::InvalidParams(_))
        ));

        assert!(GuidanceCtrl::from_params(Params::default()).is_ok());
    }

    #[test]
    fn test_stop_heading_wrapped() {
        let mut ctrl = GuidanceCtrl::default();

        let (cmd, _) = ctrl.proc(&ctx_at(0.0, 0.0, -PI)).unwrap();
        assert_approx_eq!(cmd.heading_rad, PI);

        let (cmd, _) = ctrl.proc(&ctx_at(0.0, 0.0, 4.0)).unwrap();
        assert_approx_eq!(cmd.heading_rad, 4.0 - 2.0 * PI);
        assert!(cmd.heading_rad > -PI && cmd.heading_rad <= PI);

        let cmd = ctrl.shutdown();
        assert_approx_eq!(cmd.heading_rad, 4.0 - 2.0 * PI);
    }

    #[test]
    fn test_arrived_heading_wrapped() {
        let mut ctrl = GuidanceCtrl::default();
        let ctx = ctx_at(0.0, 0.0, 0.0);

        let set = WaypointSet {
            points: vec![0.5, 0.0],
            mode: 0,
        };
        ctrl.set_path(&set, &ctx).unwrap();

        let (cmd, report) = ctrl.proc(&ctx_at(0.5, 0.0, 2.0 * PI + 0.1)).unwrap();
        assert_eq!(report.mode, GuidanceMode::Arrived);
        assert_approx_eq!(cmd.heading_rad, 0.1);
    }
}

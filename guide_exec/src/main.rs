//! Main guidance executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Feed input messages due from the script into the input streams
//!         - Control cycle:
//!             - Drain the input streams into the control context
//!             - Apply any new waypoint set
//!             - Guidance control processing (LOS guidance then collision avoidance)
//!         - Command publication
//!         - Archiving
//!     - Publish a final stop command and exit, at end of script, when all inputs close or on
//!       SIGINT/SIGTERM
//!
//! # Modules
//!
//! All modules (e.g. `guidance_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use comms_if::msg::{GuidanceCommand, LosDiagnostics};
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use guide_lib::{
    cycle::{run_cycle, run_shutdown},
    data_store::DataStore,
    guidance_ctrl::GuidanceCtrl,
    inputs::{input_channels, InputSenders},
    params::GuideExecParams,
    signal::ShutdownFlag,
};
use util::{
    archive::Archived,
    logger::{logger_init, parse_level},
    module::State,
    script_interpreter::{PendingMsgs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// USV guidance executable
#[derive(Debug, StructOpt)]
#[structopt(name = "guide_exec")]
struct Args {
    /// Script of timed input messages to replay into the guidance core
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum level of log messages to display (info, debug or trace)
    #[structopt(short, long, default_value = "info")]
    log_level: String,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let min_level = parse_level(&args.log_level)
        .ok_or_else(|| eyre!("Unknown log level \"{}\"", args.log_level))?;

    // Initialise session
    let session = Session::new("guide_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(min_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("USV Guidance Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let exec_params: GuideExecParams =
        util::params::load("guide_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    info!("Loading script from {:?}", args.script);

    let mut script = ScriptInterpreter::new(&args.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} messages\n",
        script.get_duration(),
        script.get_num_msgs()
    );

    let (senders, streams) = input_channels();

    let shutdown = ShutdownFlag::new();
    shutdown
        .install_handler()
        .wrap_err("Failed to install the shutdown signal handler")?;

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut guidance_ctrl = GuidanceCtrl::default();
    guidance_ctrl
        .init("guidance_ctrl.toml", &session)
        .wrap_err("Failed to initialise GuidanceCtrl")?;
    info!("GuidanceCtrl init complete");

    let mut ds = DataStore::new(guidance_ctrl);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s());

    info!("Beginning main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        if shutdown.is_requested() {
            info!("Shutdown requested, stopping");
            break;
        }

        // ---- SCRIPT INPUT ----

        match script.get_pending_msgs(session::get_elapsed_seconds()) {
            PendingMsgs::None => (),
            PendingMsgs::Some(msgs) => feed(&senders, msgs),
            PendingMsgs::EndOfScript => {
                info!("End of input script reached, stopping");
                break;
            }
        }

        // ---- CONTROL CYCLE ----

        let events = run_cycle(&mut ds, &streams);

        if let Some(path) = events.new_path {
            let path_name = format!(
                "paths/path_{}.json",
                ds.guidance_ctrl.get_num_paths_accepted()
            );
            session.save(&path_name, path);
        }

        // ---- PUBLICATION ----

        publish(&ds.guidance_cmd, ds.los_diagnostics.as_ref());

        // ---- WRITE ARCHIVES ----

        if exec_params.archive {
            if let Err(e) = ds.guidance_ctrl.write() {
                warn!("Could not write the GuidanceCtrl archives: {}", e);
            }
        }

        if ds.inputs_closed {
            warn!("All input streams closed, stopping");
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns == exec_params.max_consec_cycle_overruns {
                    error!(
                        "{} consecutive cycle overruns, the cycle frequency cannot be held",
                        ds.num_consec_cycle_overruns
                    );
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    let final_cmd = run_shutdown(&mut ds);
    info!(
        "Final command: speed {:.2} m/s, heading {:.4} rad",
        final_cmd.speed_ms, final_cmd.heading_rad
    );
    publish(&final_cmd, None);

    if exec_params.archive {
        if let Err(e) = ds.guidance_ctrl.write() {
            warn!("Could not write the GuidanceCtrl archives: {}", e);
        }
    }

    info!("Executed {} cycles", ds.num_cycles);

    session.exit();

    info!("End of execution");

    Ok(())
}

/// Route messages from the script into the input streams.
fn feed(senders: &InputSenders, msgs: Vec<comms_if::msg::InputMsg>) {
    for msg in msgs {
        if let Err(e) = senders.send(msg) {
            warn!("Could not feed script message: {}", e);
        }
    }
}

/// Publish the command of this cycle.
///
/// The transport to the actuation layer is external, so commands are published to the log as
/// JSON packets.
fn publish(cmd: &GuidanceCommand, diagnostics: Option<&LosDiagnostics>) {
    match serde_json::to_string(cmd) {
        Ok(s) => trace!("GUIDANCE_CMD {}", s),
        Err(e) => warn!("Could not serialise the guidance command: {}", e),
    }

    if let Some(d) = diagnostics {
        match serde_json::to_string(d) {
            Ok(s) => trace!("LOS_DIAG {}", s),
            Err(e) => warn!("Could not serialise the LOS diagnostics: {}", e),
        }
    }
}

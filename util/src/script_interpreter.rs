//! # Input script interpreter module
//!
//! This module provides an interpreter for input scripts, allowing timed input messages (pose,
//! velocity, waypoints, obstacles) to be replayed into the guidance executable when no live
//! transport is connected.
//!
//! A script is a sequence of entries of the form
//!
//! ```text
//! <time_s>: <json message>;
//! ```
//!
//! where the time is relative to the start of execution and the message is an
//! [`InputMsg`](comms_if::msg::InputMsg) in its JSON form. Entries must be in time order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::msg::{InputMsg, MsgParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A message which is scripted to arrive at a specific time.
struct ScriptedMsg {
    /// The time the message is supposed to arrive at
    exec_time_s: f64,

    /// The message to deliver
    msg: InputMsg
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_msgs` to
/// acquire a list of messages that are due.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    msgs: VecDeque<ScriptedMsg>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid message at {0} s: {1}")]
    InvalidMsg(f64, MsgParseError),

    #[error("Script entries are out of order, {0} s comes after {1} s")]
    OutOfOrder(f64, f64)
}

/// Messages which are due for delivery.
#[derive(Debug)]
pub enum PendingMsgs {
    None,
    Some(Vec<InputMsg>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let msgs = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            msgs
        })
    }

    /// Create a new interpreter from the script contents directly.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {
        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            msgs: Self::parse(script)?
        })
    }

    /// Return the messages due at the given time (seconds since the start of execution).
    pub fn get_pending_msgs(&mut self, current_time_s: f64) -> PendingMsgs {

        // If the queue is empty the script is over
        if self.msgs.is_empty() {
            return PendingMsgs::EndOfScript
        }

        let mut msg_vec: Vec<InputMsg> = vec![];

        // Pop items from the head of the queue while their time has been reached
        while let Some(head) = self.msgs.front() {
            if head.exec_time_s > current_time_s {
                break;
            }

            if let Some(m) = self.msgs.pop_front() {
                msg_vec.push(m.msg);
            }
        }

        if msg_vec.is_empty() {
            PendingMsgs::None
        }
        else {
            PendingMsgs::Some(msg_vec)
        }
    }

    /// Get the number of messages remaining in the script
    pub fn get_num_msgs(&self) -> usize {
        self.msgs.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.msgs.back() {
            Some(m) => m.exec_time_s,
            None => 0f64
        }
    }

    fn parse(script: &str) -> Result<VecDeque<ScriptedMsg>, ScriptError> {
        let mut queue: VecDeque<ScriptedMsg> = VecDeque::new();

        // Lines starting with '#' are comments and never match
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(|e| ScriptError::InvalidTimestamp(e.to_string()))?;

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{} ({})", time_str, e)))?;

            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or("");
            let msg = InputMsg::from_json(payload)
                .map_err(|e| ScriptError::InvalidMsg(exec_time_s, e))?;

            if let Some(prev) = queue.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s, prev.exec_time_s));
                }
            }

            queue.push_back(ScriptedMsg { exec_time_s, msg });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(queue)
    }
}

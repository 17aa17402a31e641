//! External shutdown requests
//!
//! SIGINT and SIGTERM are caught so the main loop can leave through its shutdown path and
//! publish a final stop command, rather than the process ending with the last command standing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared flag raised when the executable has been asked to stop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a process-wide handler for SIGINT and SIGTERM which raises this flag.
    ///
    /// Only one handler may be installed per process.
    pub fn install_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.request())
    }

    /// Raise the flag.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

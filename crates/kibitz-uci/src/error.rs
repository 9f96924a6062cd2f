//! UCI client errors.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while talking to an engine process.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The engine executable does not exist.
    #[error("engine not found at {}", path.display())]
    EngineNotFound {
        /// The configured executable path.
        path: PathBuf,
    },

    /// The engine process could not be started.
    #[error("failed to start engine {}: {source}", path.display())]
    Spawn {
        /// The configured executable path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The engine closed its output, usually because it exited or crashed.
    #[error("engine exited unexpectedly ({status})")]
    EngineExited {
        /// Exit status as reported by the OS, if known.
        status: String,
    },

    /// The engine did not answer within the allowed time.
    #[error("engine did not send {expected} within {}ms", timeout.as_millis())]
    Timeout {
        /// The reply we were waiting for.
        expected: &'static str,
        /// How long we waited.
        timeout: Duration,
    },

    /// A line from the engine could not be parsed.
    #[error("malformed engine message: {line}")]
    MalformedMessage {
        /// The offending line.
        line: String,
    },

    /// An I/O error occurred while writing to the engine.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

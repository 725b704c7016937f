//! Failure taxonomy for the monitoring cycle.
//!
//! Command and persistence failures are separate types on purpose: a fetch
//! failure aborts one cycle, a persistence failure belongs to the caller of
//! the logging operation, and neither may be conflated with the other.
//! Degraded parses and unavailable recommendations are modeled as data
//! ([`Degradation`](crate::usage::Degradation),
//! [`ModelAdvice::Unavailable`](crate::advisor::ModelAdvice)), not errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The external status command produced no usable output this cycle.
///
/// Never fatal to a long-running monitor: the caller treats any variant as
/// "no data available this cycle" and moves on.
#[derive(Debug, Error)]
pub enum CommandFailure {
    /// The process could not be started at all
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process did not finish within the bounded wait
    #[error("`{command} status` timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    /// Non-zero exit with no output to salvage
    #[error("`{command} status` exited with code {code:?} and no output: {stderr}")]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// The append-only usage log could not be opened or written.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("failed to open usage log {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to usage log {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

//! Error types for the process, status query, command and configuration layers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to spawn or supervise an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

/// Failure of a lifecycle command request.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command name is not in the allow-list; nothing was spawned.
    #[error("Vagrant can't run '{command}'.")]
    Rejected { command: String },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl CommandError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, CommandError::Rejected { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Process(ProcessError::TimedOut { .. }))
    }
}

/// Failure of a global status query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("status query exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

/// Failure while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

//! Where status snapshots come from.

use log::debug;
use std::time::Duration;

use super::model::InstanceStatus;
use super::parser::parse_global_status;
use crate::error::QueryError;
use crate::process::capture_output;

/// Enumerates every known instance in one call.
///
/// Implementations block until the query has completed and yield its result
/// exactly once.
pub trait StatusSource: Send + Sync {
    fn global_status(&self) -> Result<Vec<InstanceStatus>, QueryError>;
}

/// Runs `vagrant global-status` and parses its table
#[derive(Debug, Clone)]
pub struct VagrantGlobalStatus {
    program: String,
    prune: bool,
    timeout: Duration,
}

impl VagrantGlobalStatus {
    pub fn new(program: impl Into<String>, prune: bool, timeout: Duration) -> Self {
        VagrantGlobalStatus {
            program: program.into(),
            prune,
            timeout,
        }
    }

    pub fn args(&self) -> Vec<&'static str> {
        if self.prune {
            vec!["global-status", "--prune"]
        } else {
            vec!["global-status"]
        }
    }
}

impl StatusSource for VagrantGlobalStatus {
    fn global_status(&self) -> Result<Vec<InstanceStatus>, QueryError> {
        let args = self.args();
        let output = capture_output(&self.program, &args, self.timeout)?;

        if !output.status.success() {
            return Err(QueryError::Failed {
                code: output.status.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let statuses = parse_global_status(&output.stdout);
        debug!("global-status reported {} instance(s)", statuses.len());
        Ok(statuses)
    }
}

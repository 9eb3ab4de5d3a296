//! Allow-list check in front of the process runner.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CommandError;
use crate::notify::{AlertSink, Severity};
use crate::process::{CommandStatus, ProcessRunner};

/// Lifecycle actions that may be sent to vagrant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VagrantCommand {
    Up,
    Halt,
    Reload,
    Suspend,
    Resume,
}

impl VagrantCommand {
    pub const ALL: [VagrantCommand; 5] = [
        VagrantCommand::Up,
        VagrantCommand::Halt,
        VagrantCommand::Reload,
        VagrantCommand::Suspend,
        VagrantCommand::Resume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VagrantCommand::Up => "up",
            VagrantCommand::Halt => "halt",
            VagrantCommand::Reload => "reload",
            VagrantCommand::Suspend => "suspend",
            VagrantCommand::Resume => "resume",
        }
    }
}

impl fmt::Display for VagrantCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VagrantCommand {
    type Err = CommandError;

    /// Exact, case-sensitive match against the allow-list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VagrantCommand::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| CommandError::Rejected {
                command: s.to_string(),
            })
    }
}

/// Validates command names and hands accepted ones to the runner
pub struct CommandGate {
    runner: Arc<dyn ProcessRunner>,
    alerts: Arc<dyn AlertSink>,
}

impl CommandGate {
    pub fn new(runner: Arc<dyn ProcessRunner>, alerts: Arc<dyn AlertSink>) -> Self {
        CommandGate { runner, alerts }
    }

    /// Accept an allow-listed command; anything else is alerted and rejected.
    pub fn validate(&self, command: &str) -> Result<VagrantCommand, CommandError> {
        command.parse::<VagrantCommand>().inspect_err(|err| {
            warn!("Rejected command {:?}", command);
            self.alerts.alert("Error", &err.to_string(), Severity::Error);
        })
    }

    /// Run `vagrant <command> <id>` if the command is allow-listed.
    pub fn run(&self, command: &str, id: &str) -> Result<CommandStatus, CommandError> {
        let command = self.validate(command)?;
        self.execute(command, id)
    }

    pub fn execute(&self, command: VagrantCommand, id: &str) -> Result<CommandStatus, CommandError> {
        info!("Running {} on {}", command, id);
        Ok(self.runner.execute(&[command.as_str(), id])?)
    }
}

//! Command-line surface of the `vagrant-tray` binary.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::CommandGate;
use crate::config::ManagerConfig;
use crate::error::CommandError;
use crate::notify::LogAlertSink;
use crate::process::{CommandStatus, ExternalProcessRunner};

#[derive(Debug, Parser)]
#[command(
    name = "vagrant-tray",
    version,
    about = "Track Vagrant machines and run lifecycle commands",
    long_about = "Without arguments, keeps the status of all Vagrant machines fresh and reads \
                  line commands on stdin (list, status <id>, refresh, <command> <id>, quit). \
                  With <COMMAND> <ID>, runs that single command and exits with its exit code."
)]
pub struct Cli {
    /// Lifecycle command to run once: up, halt, reload, suspend or resume
    #[arg(requires = "id")]
    pub command: Option<String>,

    /// Vagrant machine id, as shown by `vagrant global-status`
    pub id: Option<String>,

    /// Read settings from this file instead of the default config.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Run one lifecycle command through the allow-list.
///
/// No status refresh follows: nothing would read the cache before exit.
pub fn run_once(
    config: &ManagerConfig,
    command: &str,
    id: &str,
) -> Result<CommandStatus, CommandError> {
    let runner = ExternalProcessRunner::new(
        config.vagrant_bin.clone(),
        config.elevation.launcher(),
        config.command_timeout(),
    );
    CommandGate::new(Arc::new(runner), Arc::new(LogAlertSink)).run(command, id)
}

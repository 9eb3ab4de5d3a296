//! Launch strategies for the vagrant binary.
//!
//! Some hosts need vagrant to run with elevated privileges (Hyper-V on
//! Windows). Call sites only see the [`Launcher`] trait and never branch on
//! the platform themselves.

use serde::{Deserialize, Serialize};
use std::process::Command;

/// Builds the OS command that runs `program args...`
pub trait Launcher: Send + Sync {
    /// Whether commands built by this launcher run with elevated privileges
    fn requires_elevation(&self) -> bool;

    fn command(&self, program: &str, args: &[&str]) -> Command;
}

/// Runs the program as a plain child process
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectLauncher;

impl Launcher for DirectLauncher {
    fn requires_elevation(&self) -> bool {
        false
    }

    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut command = Command::new(program);
        command.args(args);
        command
    }
}

/// Runs the program through the platform's elevation helper and waits for it.
///
/// Windows goes through `Start-Process -Verb RunAs -Wait` so the UAC prompt is
/// shown and the real exit code is passed back. Elsewhere `sudo -n` is used,
/// which fails fast instead of prompting for a password.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevatedLauncher;

impl Launcher for ElevatedLauncher {
    fn requires_elevation(&self) -> bool {
        true
    }

    #[cfg(windows)]
    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut command = Command::new("powershell");
        command.args([
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            powershell_run_as_script(program, args).as_str(),
        ]);
        command
    }

    #[cfg(not(windows))]
    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut command = Command::new("sudo");
        command.arg("-n").arg(program).args(args);
        command
    }
}

/// PowerShell script that starts `program` elevated, waits, and exits with its code.
pub fn powershell_run_as_script(program: &str, args: &[&str]) -> String {
    let mut script = format!(
        "$p = Start-Process -FilePath {} -Verb RunAs -Wait -PassThru -WindowStyle Hidden",
        powershell_quote(program)
    );
    if !args.is_empty() {
        let quoted: Vec<String> = args.iter().map(|arg| powershell_quote(arg)).collect();
        script.push_str(" -ArgumentList ");
        script.push_str(&quoted.join(","));
    }
    script.push_str("; exit $p.ExitCode");
    script
}

fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// When to route commands through [`ElevatedLauncher`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    /// Elevate only on hosts that need it
    #[default]
    Auto,
    Always,
    Never,
}

impl Elevation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(Elevation::Auto),
            "always" => Some(Elevation::Always),
            "never" => Some(Elevation::Never),
            _ => None,
        }
    }

    pub fn is_required(self) -> bool {
        match self {
            Elevation::Auto => host_requires_elevation(),
            Elevation::Always => true,
            Elevation::Never => false,
        }
    }

    pub fn launcher(self) -> Box<dyn Launcher> {
        if self.is_required() {
            Box::new(ElevatedLauncher)
        } else {
            Box::new(DirectLauncher)
        }
    }
}

/// Vagrant needs an elevated shell on Windows hosts.
pub fn host_requires_elevation() -> bool {
    cfg!(windows)
}

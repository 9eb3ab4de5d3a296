//! External process invocation: launch strategies and the supervised runner.

pub mod launcher;
pub mod runner;

pub use launcher::{host_requires_elevation, DirectLauncher, ElevatedLauncher, Elevation, Launcher};
pub use runner::{
    capture_output, CapturedOutput, CommandStatus, ExternalProcessRunner, ProcessRunner,
};

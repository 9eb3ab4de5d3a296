pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod notify;
pub mod process;
pub mod scheduler;
pub mod status;

#[cfg(test)]
mod tests;

pub use commands::VagrantCommand;
pub use config::ManagerConfig;
pub use error::{CommandError, ConfigError, ProcessError, QueryError};
pub use manager::VagrantManager;
pub use notify::{AlertSink, LogAlertSink, Severity, Subscriber};
pub use process::CommandStatus;
pub use scheduler::{RefreshOutcome, StatusScheduler};
pub use status::{InstanceStatus, StatusSnapshot};

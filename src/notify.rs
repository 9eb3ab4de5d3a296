//! Outbound interfaces towards the tray layer.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// Receives a signal whenever the cached status changed.
///
/// Called synchronously from inside a refresh cycle, on whichever thread ran
/// that cycle.
pub trait Subscriber: Send + Sync {
    fn notify(&self);
}

impl<F> Subscriber for F
where
    F: Fn() + Send + Sync,
{
    fn notify(&self) {
        self()
    }
}

/// Severity of a user-facing alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Shows a message to the user (dialog, notification bubble, ...)
pub trait AlertSink: Send + Sync {
    fn alert(&self, title: &str, message: &str, severity: Severity);
}

/// Alert sink that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!("[{}] {}", title, message),
            Severity::Warning => warn!("[{}] {}", title, message),
            Severity::Error => error!("[{}] {}", title, message),
        }
    }
}

//! Entry point used by the tray layer: status queries and lifecycle commands.

use log::info;
use std::sync::Arc;

use crate::commands::CommandGate;
use crate::config::ManagerConfig;
use crate::error::CommandError;
use crate::notify::{AlertSink, Subscriber};
use crate::process::{CommandStatus, ExternalProcessRunner, ProcessRunner};
use crate::scheduler::{RefreshOutcome, SchedulerSettings, StatusScheduler};
use crate::status::{InstanceStatus, StatusCache, StatusSnapshot, StatusSource, VagrantGlobalStatus};

/// One per process; share it behind an `Arc`.
pub struct VagrantManager {
    cache: Arc<StatusCache>,
    scheduler: StatusScheduler,
    gate: CommandGate,
}

impl VagrantManager {
    /// Wire up the real `vagrant` binary according to `config`.
    pub fn from_config(
        config: &ManagerConfig,
        subscriber: Arc<dyn Subscriber>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let source = Arc::new(VagrantGlobalStatus::new(
            config.vagrant_bin.clone(),
            config.prune,
            config.query_timeout(),
        ));
        let runner = Arc::new(ExternalProcessRunner::new(
            config.vagrant_bin.clone(),
            config.elevation.launcher(),
            config.command_timeout(),
        ));
        info!(
            "Using {} (elevation: {})",
            config.vagrant_bin,
            runner.requires_elevation()
        );
        Self::new(source, runner, subscriber, alerts, config.scheduler_settings())
    }

    pub fn new(
        source: Arc<dyn StatusSource>,
        runner: Arc<dyn ProcessRunner>,
        subscriber: Arc<dyn Subscriber>,
        alerts: Arc<dyn AlertSink>,
        settings: SchedulerSettings,
    ) -> Self {
        let cache = Arc::new(StatusCache::new());
        let scheduler = StatusScheduler::new(source, Arc::clone(&cache), subscriber, settings);
        VagrantManager {
            cache,
            scheduler,
            gate: CommandGate::new(runner, alerts),
        }
    }

    pub fn start(&self) {
        self.scheduler.start();
    }

    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Ids of all known instances, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.cache.list()
    }

    /// Cached status of `id`; a placeholder with only the id set when unknown.
    pub fn get_status(&self, id: &str) -> InstanceStatus {
        self.cache.get_status(id)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.cache.snapshot().as_ref().clone()
    }

    pub fn request_refresh(&self) {
        self.scheduler.request_refresh();
    }

    /// Run one refresh cycle on the calling thread.
    pub fn refresh(&self) -> RefreshOutcome {
        self.scheduler.refresh()
    }

    pub fn scheduler(&self) -> &StatusScheduler {
        &self.scheduler
    }

    /// Run `vagrant <command> <id>` and block until it exits or times out.
    ///
    /// Rejected commands return immediately. Anything that got past the gate
    /// requests a refresh afterwards, whatever its exit status; the cache
    /// itself is only touched by that refresh.
    pub fn run(&self, command: &str, id: &str) -> Result<CommandStatus, CommandError> {
        let command = self.gate.validate(command)?;
        let result = self.gate.execute(command, id);
        self.scheduler.request_refresh();
        result
    }
}

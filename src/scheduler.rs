//! Periodic and on-demand refresh of the status cache.
//!
//! Every trigger, whether the repeating timer or an explicit request, goes
//! through the same minimum-interval guard. A trigger that arrives too soon
//! after the previous attempt is dropped, not queued.

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::notify::Subscriber;
use crate::status::{StatusCache, StatusSnapshot, StatusSource};

/// Default period of the repeating timer
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(600);

/// Default minimum time between two refresh attempts
pub const UPDATE_MIN_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub update_interval: Duration,
    pub min_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        SchedulerSettings {
            update_interval: UPDATE_INTERVAL,
            min_interval: UPDATE_MIN_INTERVAL,
        }
    }
}

/// What a single refresh trigger ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cache replaced and the subscriber notified
    Changed,
    /// Cache replaced with an identical snapshot
    Unchanged,
    /// Dropped by the minimum-interval guard
    TooEarly,
    /// Dropped because another refresh was still running
    InFlight,
    /// The status query failed; cache untouched
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Attempt {
    at: Instant,
    wall: DateTime<Local>,
}

struct RefreshCycle {
    source: Arc<dyn StatusSource>,
    cache: Arc<StatusCache>,
    subscriber: Arc<dyn Subscriber>,
    min_interval: Duration,
    last_attempt: Mutex<Option<Attempt>>,
    in_flight: Mutex<()>,
    /// Set while a cycle holds `in_flight`
    busy: AtomicBool,
    /// A request has been handed to the timer thread and not yet picked up
    pending: AtomicBool,
}

impl RefreshCycle {
    fn run(&self) -> RefreshOutcome {
        let _flight = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                info!("Update of global-status of vagrant already in progress.");
                return RefreshOutcome::InFlight;
            }
        };

        self.busy.store(true, Ordering::SeqCst);
        let outcome = self.run_locked();
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    fn run_locked(&self) -> RefreshOutcome {
        if !self.claim_attempt() {
            return RefreshOutcome::TooEarly;
        }

        let statuses = match self.source.global_status() {
            Ok(statuses) => statuses,
            Err(err) => {
                warn!("Failed to update global-status of vagrant: {}", err);
                return RefreshOutcome::Failed;
            }
        };

        let snapshot: StatusSnapshot = statuses.into_iter().collect();
        let count = snapshot.len();
        let changes = self.cache.apply(snapshot);
        if !changes.is_changed() {
            debug!("global-status unchanged ({} instance(s))", count);
            return RefreshOutcome::Unchanged;
        }

        info!(
            "global-status changed: {} instance(s), {} added, {} removed, {} modified",
            count,
            changes.added.len(),
            changes.removed.len(),
            changes.modified.len()
        );
        self.subscriber.notify();
        RefreshOutcome::Changed
    }

    /// Check a request before it is handed to the timer thread, so a
    /// request that would be dropped never waits behind a running cycle.
    fn admits(&self) -> bool {
        if self.busy.load(Ordering::SeqCst) {
            info!("Update of global-status of vagrant already in progress.");
            return false;
        }

        let last = self.last_attempt.lock().unwrap_or_else(|e| e.into_inner());
        !self.too_early(&last, Instant::now())
    }

    fn too_early(&self, last: &Option<Attempt>, now: Instant) -> bool {
        let Some(previous) = last else {
            return false;
        };
        let elapsed = now.duration_since(previous.at);
        if elapsed >= self.min_interval {
            return false;
        }
        info!(
            "Too early to update global-status of vagrant. [{:.3}sec from {}]",
            elapsed.as_secs_f64(),
            previous.wall.format("%Y/%m/%d %H:%M:%S%.3f")
        );
        true
    }

    /// Record a new attempt unless the previous one is too recent.
    fn claim_attempt(&self) -> bool {
        let mut last = self.last_attempt.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        if self.too_early(&last, now) {
            return false;
        }

        info!("Update global-status of vagrant.");
        *last = Some(Attempt {
            at: now,
            wall: Local::now(),
        });
        true
    }
}

enum Signal {
    Refresh,
    Stop,
}

struct Worker {
    tx: mpsc::Sender<Signal>,
    handle: JoinHandle<()>,
}

/// Owns the repeating timer and the refresh guard
pub struct StatusScheduler {
    cycle: Arc<RefreshCycle>,
    update_interval: Duration,
    worker: Mutex<Option<Worker>>,
}

impl StatusScheduler {
    pub fn new(
        source: Arc<dyn StatusSource>,
        cache: Arc<StatusCache>,
        subscriber: Arc<dyn Subscriber>,
        settings: SchedulerSettings,
    ) -> Self {
        StatusScheduler {
            cycle: Arc::new(RefreshCycle {
                source,
                cache,
                subscriber,
                min_interval: settings.min_interval,
                last_attempt: Mutex::new(None),
                in_flight: Mutex::new(()),
                busy: AtomicBool::new(false),
                pending: AtomicBool::new(false),
            }),
            update_interval: settings.update_interval,
            worker: Mutex::new(None),
        }
    }

    /// Start the timer thread. It refreshes once right away, then
    /// `update_interval` after the end of each tick. Calling `start` on a
    /// running scheduler does nothing.
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        if worker.is_some() {
            debug!("Status scheduler already running");
            return;
        }

        let (tx, rx) = mpsc::channel();
        let cycle = Arc::clone(&self.cycle);
        let interval = self.update_interval;
        let handle = thread::spawn(move || {
            let mut next_tick = run_tick(&cycle, interval);

            loop {
                // No deadline when the interval does not fit in an Instant.
                let signal = match next_tick {
                    Some(tick) => rx.recv_timeout(tick.saturating_duration_since(Instant::now())),
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                match signal {
                    Ok(Signal::Refresh) => {
                        cycle.pending.store(false, Ordering::SeqCst);
                        cycle.run();
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        next_tick = run_tick(&cycle, interval);
                    }
                    Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("Status scheduler thread exiting");
        });

        info!(
            "Status scheduler started (interval {}s)",
            interval.as_secs()
        );
        *worker = Some(Worker { tx, handle });
    }

    /// Stop the timer thread and wait for it. Idempotent.
    ///
    /// Called from the timer thread itself (e.g. the scheduler is dropped
    /// inside a subscriber), the thread is told to exit but not joined.
    pub fn stop(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(worker) = worker else {
            return;
        };

        let _ = worker.tx.send(Signal::Stop);
        if worker.handle.thread().id() == thread::current().id() {
            debug!("Status scheduler stopped from its own thread");
            return;
        }
        if worker.handle.join().is_err() {
            warn!("Status scheduler thread panicked");
        }
        info!("Status scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Ask for an out-of-band refresh.
    ///
    /// While the timer thread runs, the refresh happens there and this call
    /// returns immediately; a request that the guard or a running cycle
    /// would drop is dropped here, and at most one request is outstanding.
    /// Otherwise the refresh runs on the calling thread.
    pub fn request_refresh(&self) {
        let sent = {
            let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
            match worker.as_ref() {
                Some(worker) => {
                    if !self.cycle.admits() {
                        return;
                    }
                    if self.cycle.pending.swap(true, Ordering::SeqCst) {
                        debug!("Refresh already requested");
                        return;
                    }
                    let sent = worker.tx.send(Signal::Refresh).is_ok();
                    if !sent {
                        self.cycle.pending.store(false, Ordering::SeqCst);
                    }
                    sent
                }
                None => false,
            }
        };
        if !sent {
            self.refresh();
        }
    }

    /// Run one refresh cycle on the calling thread.
    pub fn refresh(&self) -> RefreshOutcome {
        self.cycle.run()
    }

    /// Wall-clock time of the last refresh attempt that passed the guard.
    pub fn last_attempt(&self) -> Option<DateTime<Local>> {
        self.cycle
            .last_attempt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|attempt| attempt.wall)
    }
}

/// Run one timer tick and return when the next one is due.
fn run_tick(cycle: &RefreshCycle, interval: Duration) -> Option<Instant> {
    cycle.run();
    Instant::now().checked_add(interval)
}

impl Drop for StatusScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Periodic refresh scheduling ──
//
// A `RefreshController` drives one `RefreshTask` on a fixed period and
// publishes a per-second countdown to the next cycle. Refresh requests
// (timer ticks or manual) are funnelled through a single worker; a
// request arriving while a cycle is in flight is dropped, so cycles
// never overlap and never queue up behind a slow backend.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::notify::{Notification, Notifier};

/// Pause between stopping and restarting when the interval changes.
pub const APPLY_DELAY: Duration = Duration::from_millis(100);

/// One unit of refresh work, e.g. re-fetching resource samples.
pub trait RefreshTask: Send + Sync + 'static {
    fn refresh(&self) -> BoxFuture<'_, Result<(), CoreError>>;
}

// ── Countdown ───────────────────────────────────────────────────────

/// Seconds until the next scheduled refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Monitoring is stopped.
    Idle,
    Seconds(u64),
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("–"),
            Self::Seconds(n) => write!(f, "{n}s"),
        }
    }
}

/// Next countdown value: decrements, wrapping back to the full interval
/// where it would reach zero.
fn next_countdown(current: u64, interval_secs: u64) -> u64 {
    if current <= 1 {
        interval_secs
    } else {
        current - 1
    }
}

fn validate_interval(secs: u64) -> Result<(), CoreError> {
    if secs == 0 {
        return Err(CoreError::ValidationFailed {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(())
}

// ── Trigger ─────────────────────────────────────────────────────────

/// Hands refresh requests to the worker, dropping them while a cycle is
/// in flight.
#[derive(Clone)]
struct Trigger {
    in_flight: Arc<AtomicBool>,
    tx: mpsc::Sender<()>,
}

impl Trigger {
    fn fire(&self) -> bool {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("refresh already in flight, request dropped");
            return false;
        }
        if self.tx.try_send(()).is_err() {
            self.in_flight.store(false, Ordering::Release);
            return false;
        }
        true
    }
}

// ── Worker ──────────────────────────────────────────────────────────

struct Worker {
    task: Arc<dyn RefreshTask>,
    notifier: Arc<dyn Notifier>,
    in_flight: Arc<AtomicBool>,
    last_refresh: Arc<watch::Sender<Option<DateTime<Utc>>>>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::Receiver<()>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                request = rx.recv() => {
                    let Some(()) = request else { break };
                    self.cycle().await;
                }
            }
        }
        debug!("refresh worker stopped");
    }

    async fn cycle(&self) {
        match self.task.refresh().await {
            Ok(()) => {
                self.last_refresh.send_replace(Some(Utc::now()));
                debug!("refresh cycle complete");
            }
            Err(e) => {
                warn!(error = %e, "refresh cycle failed");
                self.notifier
                    .notify(Notification::error("Refresh failed", e.to_string()));
            }
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

// ── Driver ──────────────────────────────────────────────────────────

/// Ticks the refresh period and the one-second countdown for one run.
async fn drive(
    interval_secs: u64,
    trigger: Trigger,
    countdown: Arc<watch::Sender<Countdown>>,
    cancel: CancellationToken,
) {
    let mut refresh_tick = tokio::time::interval(Duration::from_secs(interval_secs));
    let mut countdown_tick = tokio::time::interval(Duration::from_secs(1));
    refresh_tick.tick().await; // consume the immediate first tick
    countdown_tick.tick().await;

    let mut remaining = interval_secs;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = refresh_tick.tick() => {
                if !cancel.is_cancelled() {
                    trigger.fire();
                }
            }
            _ = countdown_tick.tick() => {
                remaining = next_countdown(remaining, interval_secs);
                // Checked under the channel lock so a concurrent stop's
                // `Idle` is never overwritten.
                countdown.send_if_modified(|value| {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    *value = Countdown::Seconds(remaining);
                    true
                });
            }
        }
    }
}

// ── Controller ──────────────────────────────────────────────────────

struct RunHandle {
    cancel: CancellationToken,
    driver: JoinHandle<()>,
}

struct RunState {
    interval_secs: u64,
    run: Option<RunHandle>,
    /// Bumped by every `stop` call and every `start` that takes effect.
    epoch: u64,
    /// Taken when the worker is first spawned.
    worker_rx: Option<mpsc::Receiver<()>>,
}

struct Shared {
    task: Arc<dyn RefreshTask>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<RunState>,
    trigger: Trigger,
    countdown: Arc<watch::Sender<Countdown>>,
    last_refresh: Arc<watch::Sender<Option<DateTime<Utc>>>>,
    shutdown: CancellationToken,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_worker(&self, state: &mut RunState) {
        let Some(rx) = state.worker_rx.take() else {
            return;
        };
        let worker = Worker {
            task: Arc::clone(&self.task),
            notifier: Arc::clone(&self.notifier),
            in_flight: Arc::clone(&self.trigger.in_flight),
            last_refresh: Arc::clone(&self.last_refresh),
        };
        tokio::spawn(worker.run(rx, self.shutdown.child_token()));
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Start/stop control over a periodic refresh.
///
/// Cheaply cloneable. Every method must be called from within a Tokio
/// runtime. Dropping the last clone stops the background tasks.
#[derive(Clone)]
pub struct RefreshController {
    shared: Arc<Shared>,
}

impl RefreshController {
    pub fn new(
        task: Arc<dyn RefreshTask>,
        interval_secs: u64,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        validate_interval(interval_secs)?;
        let (tx, rx) = mpsc::channel(1);
        let (countdown, _) = watch::channel(Countdown::Idle);
        let (last_refresh, _) = watch::channel(None);

        Ok(Self {
            shared: Arc::new(Shared {
                task,
                notifier,
                state: Mutex::new(RunState {
                    interval_secs,
                    run: None,
                    epoch: 0,
                    worker_rx: Some(rx),
                }),
                trigger: Trigger {
                    in_flight: Arc::new(AtomicBool::new(false)),
                    tx,
                },
                countdown: Arc::new(countdown),
                last_refresh: Arc::new(last_refresh),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Begin periodic refresh: one refresh immediately, then one per
    /// interval. Returns `false` if already active.
    pub fn start(&self) -> bool {
        let mut state = self.shared.state();
        if state.run.is_some() {
            debug!("refresh already active");
            return false;
        }
        self.shared.ensure_worker(&mut state);

        let interval_secs = state.interval_secs;
        let cancel = self.shared.shutdown.child_token();
        self.shared
            .countdown
            .send_replace(Countdown::Seconds(interval_secs));
        self.shared.trigger.fire();

        let driver = tokio::spawn(drive(
            interval_secs,
            self.shared.trigger.clone(),
            Arc::clone(&self.shared.countdown),
            cancel.clone(),
        ));
        state.run = Some(RunHandle { cancel, driver });
        state.epoch += 1;
        info!(interval_secs, "monitoring started");
        true
    }

    /// Cancel the timers and blank the countdown. An in-flight cycle is
    /// allowed to finish. Also cancels a restart pending in
    /// [`set_interval`](Self::set_interval). Returns `false` if already
    /// stopped.
    pub fn stop(&self) -> bool {
        let run = {
            let mut state = self.shared.state();
            state.epoch += 1;
            let Some(run) = state.run.take() else {
                return false;
            };
            run
        };
        run.cancel.cancel();
        run.driver.abort();
        self.shared.countdown.send_replace(Countdown::Idle);
        info!("monitoring stopped");
        true
    }

    /// Change the period. When active, restarts after `APPLY_DELAY` so
    /// the new period and countdown take effect at once. A `start` or
    /// `stop` from elsewhere during the delay wins over the restart.
    pub async fn set_interval(&self, secs: u64) -> Result<(), CoreError> {
        validate_interval(secs)?;
        let was_active = {
            let mut state = self.shared.state();
            state.interval_secs = secs;
            state.run.is_some()
        };
        if was_active {
            self.stop();
            let epoch = self.shared.state().epoch;
            tokio::time::sleep(APPLY_DELAY).await;
            if self.shared.state().epoch == epoch {
                self.start();
            } else {
                debug!("run state changed during interval change, not restarting");
            }
        }
        info!(interval_secs = secs, "refresh interval applied");
        Ok(())
    }

    /// Request one refresh now. Returns `false` if a cycle is already in
    /// flight and the request was dropped.
    pub fn execute_refresh(&self) -> bool {
        self.shared.ensure_worker(&mut self.shared.state());
        self.shared.trigger.fire()
    }

    pub fn is_active(&self) -> bool {
        self.shared.state().run.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.shared.trigger.in_flight.load(Ordering::Acquire)
    }

    pub fn interval_secs(&self) -> u64 {
        self.shared.state().interval_secs
    }

    pub fn countdown(&self) -> Countdown {
        *self.shared.countdown.borrow()
    }

    pub fn subscribe_countdown(&self) -> watch::Receiver<Countdown> {
        self.shared.countdown.subscribe()
    }

    /// Completion time of the last successful cycle.
    pub fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.shared.last_refresh.subscribe()
    }

    /// Stop and tear down the worker.
    pub fn shutdown(&self) {
        self.stop();
        self.shared.shutdown.cancel();
    }
}

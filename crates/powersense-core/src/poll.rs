// ── Generic polling loop ──
//
// One `PollLoop<P, T>` owns one slot of telemetry state: a parameter `P`
// (window hours, averaging period) and the last fetched value `T`. Fetches
// run in their own tasks so a slow request never delays the timer. Every
// fetch is stamped with a monotonic generation number and only the most
// recently issued generation may write its result back.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Async fetch function driven by a loop: parameter in, domain value out.
pub type FetchFn<P, T> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

/// Observable state of one polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopState<P, T> {
    /// Parameter the next fetch will use.
    pub parameter: P,
    /// `true` while the most recently issued fetch is in flight.
    pub loading: bool,
    /// Message from the last applied failure, cleared when a fetch starts.
    pub error: Option<String>,
    /// Last applied value; `T::default()` after a failure.
    pub value: T,
    /// Parameter of the fetch that produced `value`.
    pub fetched_with: Option<P>,
    /// Wall-clock time of the last successful fetch.
    pub updated_at: Option<DateTime<Utc>>,
    /// Most recently issued generation.
    pub generation: u64,
    /// Generation of the last applied result, success or failure. 0 = none yet.
    pub applied: u64,
}

impl<P, T: Default> LoopState<P, T> {
    /// Idle state before any fetch: not loading, default value.
    pub fn new(parameter: P) -> Self {
        Self {
            parameter,
            loading: false,
            error: None,
            value: T::default(),
            fetched_with: None,
            updated_at: None,
            generation: 0,
            applied: 0,
        }
    }

    /// Loading and nothing has ever been applied.
    pub fn is_initial_load(&self) -> bool {
        self.loading && self.applied == 0
    }
}

/// Static settings for one loop.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Short name used in log fields.
    pub name: &'static str,
    /// Prefix for failure messages, e.g. "Failed to fetch sensor data".
    pub error_context: &'static str,
    /// Tick cadence.
    pub cadence: Duration,
}

/// A self-rescheduling fetch loop with generation-guarded results.
///
/// Cheaply cloneable; all clones drive the same loop.
pub struct PollLoop<P, T> {
    inner: Arc<LoopInner<P, T>>,
}

impl<P, T> Clone for PollLoop<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct LoopInner<P, T> {
    settings: PollSettings,
    fetch: FetchFn<P, T>,
    state: watch::Sender<LoopState<P, T>>,
    generation: AtomicU64,
    cancel: CancellationToken,
    timer: Mutex<Option<CancellationToken>>,
}

impl<P, T> PollLoop<P, T>
where
    P: Clone + Debug + Send + Sync + 'static,
    T: Clone + Default + Send + Sync + 'static,
{
    /// Create an idle loop. Nothing is fetched until [`start`](Self::start)
    /// or [`refresh`](Self::refresh).
    ///
    /// The loop shuts down when `parent` is cancelled.
    pub fn new(
        settings: PollSettings,
        parameter: P,
        fetch: FetchFn<P, T>,
        parent: &CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(LoopState::new(parameter));
        Self {
            inner: Arc::new(LoopInner {
                settings,
                fetch,
                state,
                generation: AtomicU64::new(0),
                cancel: parent.child_token(),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Start ticking: one fetch now, then one per cadence.
    pub fn start(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        info!(
            poll = self.inner.settings.name,
            cadence_ms = u64::try_from(self.inner.settings.cadence.as_millis()).unwrap_or(u64::MAX),
            "starting poll loop"
        );
        self.arm_timer();
    }

    /// Re-fetch now, optionally with a new parameter.
    ///
    /// `None` reuses the current parameter. A running loop has its timer
    /// restarted so the next scheduled tick is a full cadence away; an idle
    /// loop performs a single fetch. Either way the fetch is issued even if
    /// an earlier one is still in flight, and that earlier result is then
    /// discarded as stale.
    pub fn refresh(&self, parameter: Option<P>) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        if let Some(parameter) = parameter {
            debug!(poll = self.inner.settings.name, ?parameter, "reparameterized");
            self.inner.state.send_modify(|s| s.parameter = parameter);
        }
        if self.is_running() {
            self.arm_timer();
        } else {
            self.trigger();
        }
    }

    /// Stop the timer and discard any result still in flight.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(timer) = self.lock_timer().take() {
            timer.cancel();
        }
        self.inner.state.send_modify(|s| s.loading = false);
        debug!(poll = self.inner.settings.name, "poll loop stopped");
    }

    /// Whether a timer is currently armed.
    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled() && self.lock_timer().is_some()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoopState<P, T> {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LoopState<P, T>> {
        self.inner.state.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the timer task. The new interval's first tick is immediate.
    fn arm_timer(&self) {
        let token = self.inner.cancel.child_token();
        if let Some(previous) = self.lock_timer().replace(token.clone()) {
            previous.cancel();
        }
        tokio::spawn(timer_task(self.clone(), token));
    }

    /// Issue one fetch with the current parameter under a fresh generation.
    fn trigger(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut parameter = None;
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.generation = generation;
            parameter = Some(s.parameter.clone());
        });
        let Some(parameter) = parameter else { return };

        debug!(poll = self.inner.settings.name, generation, ?parameter, "fetch issued");
        let inner = Arc::clone(&self.inner);
        let fut = (inner.fetch)(parameter.clone());
        tokio::spawn(async move {
            let result = fut.await;
            inner.apply(generation, parameter, result);
        });
    }
}

impl<P, T> LoopInner<P, T>
where
    P: Debug,
    T: Default,
{
    fn apply(&self, generation: u64, parameter: P, result: Result<T, CoreError>) {
        let name = self.settings.name;
        if self.cancel.is_cancelled() {
            debug!(poll = name, generation, "discarding result after shutdown");
            return;
        }
        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest {
            debug!(poll = name, generation, latest, "discarding stale result");
            return;
        }

        match result {
            Ok(value) => {
                debug!(poll = name, generation, ?parameter, "fetch applied");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = None;
                    s.value = value;
                    s.fetched_with = Some(parameter);
                    s.updated_at = Some(Utc::now());
                    s.applied = generation;
                });
            }
            Err(e) => {
                warn!(poll = name, generation, error = %e, "fetch failed");
                let message = format!("{}: {e}", self.settings.error_context);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(message);
                    s.value = T::default();
                    s.fetched_with = Some(parameter);
                    s.applied = generation;
                });
            }
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn timer_task<P, T>(poll: PollLoop<P, T>, token: CancellationToken)
where
    P: Clone + Debug + Send + Sync + 'static,
    T: Clone + Default + Send + Sync + 'static,
{
    let cadence = poll.inner.settings.cadence.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval(cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut first = true;

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = interval.tick() => {
                // Scheduled ticks coalesce with a fetch still in flight so a
                // slow service can't starve the loop of applicable results.
                if first || !poll.inner.state.borrow().loading {
                    poll.trigger();
                } else {
                    debug!(poll = poll.inner.settings.name, "tick skipped, fetch in flight");
                }
                first = false;
            }
        }
    }
}

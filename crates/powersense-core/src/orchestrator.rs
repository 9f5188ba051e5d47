// ── Metrics orchestrator ──
//
// Owns the two independent polling loops: the snapshot loop (latest
// readings plus histories, parameterized by window hours) and the
// period-average loop (average power, parameterized by `AvgPeriod`).
// Neither loop's failures or timers affect the other.

use std::sync::Arc;

use futures_util::FutureExt;
use powersense_api::{TelemetryClient, TransportConfig};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::model::{AvgPeriod, MetricSnapshot, PeriodAverage};
use crate::poll::{FetchFn, LoopState, PollLoop, PollSettings};

/// State of the snapshot loop.
pub type SnapshotState = LoopState<u32, MetricSnapshot>;

/// State of the period-average loop.
pub type PeriodState = LoopState<AvgPeriod, PeriodAverage>;

/// Read-only view of everything the dashboard renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub snapshot: SnapshotState,
    pub period: PeriodState,
}

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<OrchestratorInner>`.
#[derive(Clone)]
pub struct MetricsOrchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    config: OrchestratorConfig,
    snapshot: PollLoop<u32, MetricSnapshot>,
    period: PollLoop<AvgPeriod, PeriodAverage>,
    cancel: CancellationToken,
}

impl MetricsOrchestrator {
    /// Build an orchestrator that polls the telemetry service at
    /// `config.host`. Nothing is fetched until [`start`](Self::start).
    pub fn new(config: OrchestratorConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client = TelemetryClient::new(config.host.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Build an orchestrator around an existing client.
    pub fn with_client(config: OrchestratorConfig, client: TelemetryClient) -> Self {
        let sensor_client = client.clone();
        let snapshot_fetch: FetchFn<u32, MetricSnapshot> = Arc::new(move |hours: u32| {
            let client = sensor_client.clone();
            async move {
                let raw = client.fetch_sensor_data(hours).await?;
                MetricSnapshot::try_from(raw)
            }
            .boxed()
        });

        let period_fetch: FetchFn<AvgPeriod, PeriodAverage> = Arc::new(move |period: AvgPeriod| {
            let client = client.clone();
            async move {
                let raw = client.fetch_avg_power(period.minutes()).await?;
                PeriodAverage::try_from(raw)
            }
            .boxed()
        });

        Self::from_fetchers(config, snapshot_fetch, period_fetch)
    }

    /// Build an orchestrator from arbitrary fetch functions.
    pub fn from_fetchers(
        config: OrchestratorConfig,
        snapshot_fetch: FetchFn<u32, MetricSnapshot>,
        period_fetch: FetchFn<AvgPeriod, PeriodAverage>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let snapshot = PollLoop::new(
            PollSettings {
                name: "snapshot",
                error_context: "Failed to fetch sensor data",
                cadence: config.snapshot_interval,
            },
            config.window_hours,
            snapshot_fetch,
            &cancel,
        );
        let period = PollLoop::new(
            PollSettings {
                name: "period_average",
                error_context: "Failed to fetch average power",
                cadence: config.period_interval,
            },
            config.period,
            period_fetch,
            &cancel,
        );

        Self {
            inner: Arc::new(OrchestratorInner {
                config,
                snapshot,
                period,
                cancel,
            }),
        }
    }

    /// Access the orchestrator configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start both loops. Each fetches immediately, then on its own cadence.
    pub fn start(&self) {
        info!(host = %self.inner.config.host, "starting telemetry polling");
        self.inner.snapshot.start();
        self.inner.period.start();
    }

    /// Stop both loops. Results still in flight are discarded.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.snapshot.shutdown();
        self.inner.period.shutdown();
        info!("telemetry polling stopped");
    }

    // ── Refresh operations ───────────────────────────────────────

    /// Re-fetch the snapshot now. `None` keeps the last-used window.
    pub fn refresh_snapshot(&self, window_hours: Option<u32>) {
        self.inner.snapshot.refresh(window_hours);
    }

    /// Re-fetch the period average now. `None` keeps the current period.
    pub fn refresh_period_average(&self, period: Option<AvgPeriod>) {
        self.inner.period.refresh(period);
    }

    // ── Observation ──────────────────────────────────────────────

    /// Current state of both loops.
    pub fn view(&self) -> DashboardView {
        DashboardView {
            snapshot: self.inner.snapshot.state(),
            period: self.inner.period.state(),
        }
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<SnapshotState> {
        self.inner.snapshot.subscribe()
    }

    pub fn subscribe_period(&self) -> watch::Receiver<PeriodState> {
        self.inner.period.subscribe()
    }
}

// ── Runtime orchestration configuration ──
//
// Describes *where* to poll and *how often*. Never touches disk: the TUI
// loads `powersense_config::Config`, validates it, and hands one of these in.

use std::time::Duration;

use url::Url;

use crate::model::AvgPeriod;

/// Default telemetry service host.
pub const DEFAULT_HOST: &str = "https://backend.powersense.site";

/// Default cadence of both polling loops.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default snapshot window in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Configuration for a `MetricsOrchestrator`.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Telemetry service root (e.g., `https://backend.powersense.site`).
    pub host: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Cadence of the snapshot loop.
    pub snapshot_interval: Duration,
    /// Cadence of the period-average loop.
    pub period_interval: Duration,
    /// Initial snapshot window in hours.
    pub window_hours: u32,
    /// Initial averaging period.
    pub period: AvgPeriod,
}

impl OrchestratorConfig {
    /// Config for `host` with every other setting at its default.
    pub fn new(host: Url) -> Self {
        Self {
            host,
            timeout: Duration::from_secs(10),
            snapshot_interval: DEFAULT_POLL_INTERVAL,
            period_interval: DEFAULT_POLL_INTERVAL,
            window_hours: DEFAULT_WINDOW_HOURS,
            period: AvgPeriod::default(),
        }
    }
}

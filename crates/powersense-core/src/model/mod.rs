// ── Telemetry domain model ──
//
// Canonical, validated representations of what the telemetry service
// reports. Wire types from `powersense_api` are converted into these at the
// fetcher boundary (see `convert.rs`); nothing downstream sees strings.

pub mod period;
pub mod snapshot;

pub use period::{AvgPeriod, PeriodAverage};
pub use snapshot::{HistoryPoint, MetricSnapshot};

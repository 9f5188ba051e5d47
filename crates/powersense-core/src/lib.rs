// powersense-core: Polling orchestration and domain model between
// powersense-api and the dashboard.

pub mod config;
pub mod convert;
pub mod cost;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod poll;
pub mod price;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_HOST, OrchestratorConfig};
pub use error::CoreError;
pub use model::{AvgPeriod, HistoryPoint, MetricSnapshot, PeriodAverage};
pub use orchestrator::{DashboardView, MetricsOrchestrator, PeriodState, SnapshotState};
pub use poll::{FetchFn, LoopState, PollLoop, PollSettings};

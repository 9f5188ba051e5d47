//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use powersense_core::{AvgPeriod, PeriodState, SnapshotState};

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,

    // ── Overlays and presentation ──
    ToggleHelp,
    ToggleTheme,

    // ── User requests ──
    /// Re-fetch the snapshot with the last-used window.
    RefreshSnapshot,
    /// Switch the averaging period and re-fetch the period average.
    SelectPeriod(AvgPeriod),
    /// A valid price was entered; apply it and persist it.
    SetPrice(f64),

    // ── Data updates from the orchestrator ──
    SnapshotUpdated(Arc<SnapshotState>),
    PeriodUpdated(Arc<PeriodState>),
}

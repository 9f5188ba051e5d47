//! Data bridge: connects the orchestrator's loop states to TUI actions.
//!
//! Runs as a background task: subscribes to both polling loops, starts
//! them, and forwards every state change as an [`Action`] through the
//! TUI's action channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use powersense_core::MetricsOrchestrator;

use crate::action::Action;

/// Start polling and forward loop states until `cancel` fires, then shut
/// the orchestrator down.
pub async fn spawn_data_bridge(
    orchestrator: MetricsOrchestrator,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut snapshot = orchestrator.subscribe_snapshot();
    let mut period = orchestrator.subscribe_period();

    orchestrator.start();

    // Push initial states so the screen shows loading immediately
    let snap = snapshot.borrow_and_update().clone();
    let _ = action_tx.send(Action::SnapshotUpdated(Arc::new(snap)));
    let per = period.borrow_and_update().clone();
    let _ = action_tx.send(Action::PeriodUpdated(Arc::new(per)));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = snapshot.changed() => {
                let state = snapshot.borrow_and_update().clone();
                debug!(generation = state.generation, loading = state.loading, "dispatching SnapshotUpdated");
                let _ = action_tx.send(Action::SnapshotUpdated(Arc::new(state)));
            }
            Ok(()) = period.changed() => {
                let state = period.borrow_and_update().clone();
                debug!(generation = state.generation, loading = state.loading, "dispatching PeriodUpdated");
                let _ = action_tx.send(Action::PeriodUpdated(Arc::new(state)));
            }
        }
    }

    orchestrator.shutdown();
    debug!("data bridge shut down");
}

use serde::{Deserialize, Serialize};

/// One `(timestamp, value)` sample of a history series.
///
/// The timestamp is kept exactly as received; formatting for display is the
/// renderer's job and must tolerate values that don't parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: String,
    pub value: f64,
}

impl HistoryPoint {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// Latest instantaneous readings plus the four history series for the
/// requested window.
///
/// `Default` is the all-zero snapshot a loop falls back to after a failed
/// fetch. Series are drawn in the order received; alignment between them
/// is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Amperes.
    pub current: f64,
    /// Amperes.
    pub avg_current: f64,
    /// Volts.
    pub voltage: f64,
    /// Watts.
    pub inst_power: f64,
    /// Watts.
    pub avg_power: f64,
    pub current_history: Vec<HistoryPoint>,
    pub avg_current_history: Vec<HistoryPoint>,
    pub voltage_history: Vec<HistoryPoint>,
    pub power_history: Vec<HistoryPoint>,
}

impl MetricSnapshot {
    /// Timestamp of the first current-history sample, if any.
    pub fn first_timestamp(&self) -> Option<&str> {
        self.current_history.first().map(|p| p.timestamp.as_str())
    }
}

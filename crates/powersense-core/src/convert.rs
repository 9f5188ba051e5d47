// ── Wire-to-domain conversions ──
//
// Bridges `powersense_api` response types into `crate::model`. Every numeric
// field is validated here; a value that isn't a finite number fails the
// whole conversion with `CoreError::InvalidMeasurement` naming the field.

use powersense_api::{AvgPowerResponse, SensorDataResponse, WireHistoryPoint, WireNumber};

use crate::error::CoreError;
use crate::model::{HistoryPoint, MetricSnapshot, PeriodAverage};

// ── Helpers ────────────────────────────────────────────────────────

fn measurement(raw: &WireNumber, field: &str) -> Result<f64, CoreError> {
    raw.to_f64(field).map_err(CoreError::from)
}

fn series(raw: Vec<WireHistoryPoint>, field: &str) -> Result<Vec<HistoryPoint>, CoreError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, point)| {
            let value = measurement(&point.value, &format!("{field}[{i}].value"))?;
            Ok(HistoryPoint {
                timestamp: point.timestamp,
                value,
            })
        })
        .collect()
}

// ── Snapshot ───────────────────────────────────────────────────────

impl TryFrom<SensorDataResponse> for MetricSnapshot {
    type Error = CoreError;

    fn try_from(raw: SensorDataResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            current: measurement(&raw.current, "current")?,
            avg_current: measurement(&raw.avg_current, "avgCurrent")?,
            voltage: measurement(&raw.voltage, "voltage")?,
            inst_power: measurement(&raw.inst_power, "instPower")?,
            avg_power: measurement(&raw.avg_power, "avgPower")?,
            current_history: series(raw.current_history, "currentHistory")?,
            avg_current_history: series(raw.avg_current_history, "avgCurrentHistory")?,
            voltage_history: series(raw.voltage_history, "voltageHistory")?,
            power_history: series(raw.power_history, "powerHistory")?,
        })
    }
}

// ── Period average ─────────────────────────────────────────────────

impl TryFrom<AvgPowerResponse> for PeriodAverage {
    type Error = CoreError;

    fn try_from(raw: AvgPowerResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            watts: measurement(&raw.avg_power, "avgPower")?,
        })
    }
}

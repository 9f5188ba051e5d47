// Wire types for the telemetry service.
//
// The service emits numbers either as JSON numbers or as numeric strings,
// so every scalar goes through `WireNumber` and is validated by `to_f64`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A numeric field as it appears on the wire: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    /// Parse into a finite `f64`, rejecting anything else with a typed error
    /// that names the offending field.
    pub fn to_f64(&self, field: &str) -> Result<f64, Error> {
        let parsed = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(Error::InvalidNumber {
                field: field.to_owned(),
                value: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for WireNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for WireNumber {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// One `{timestamp, value}` entry of a history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireHistoryPoint {
    pub timestamp: String,
    pub value: WireNumber,
}

/// Body of `GET /api/sensor-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataResponse {
    pub current: WireNumber,
    pub avg_current: WireNumber,
    pub voltage: WireNumber,
    pub inst_power: WireNumber,
    pub avg_power: WireNumber,
    #[serde(default)]
    pub current_history: Vec<WireHistoryPoint>,
    #[serde(default)]
    pub avg_current_history: Vec<WireHistoryPoint>,
    #[serde(default)]
    pub voltage_history: Vec<WireHistoryPoint>,
    #[serde(default)]
    pub power_history: Vec<WireHistoryPoint>,
}

/// Body of `GET /api/avg-power-consumption`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvgPowerResponse {
    pub avg_power: WireNumber,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

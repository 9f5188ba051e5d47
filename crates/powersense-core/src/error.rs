// ── Core error types ──
//
// User-facing errors from powersense-core. Transport-layer failures from
// `powersense_api` are translated by the `From` impl so polling loops only
// ever carry `CoreError`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to telemetry service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Telemetry service timed out")]
    Timeout,

    // ── Service errors ───────────────────────────────────────────────
    /// Non-2xx response, rendered as `{status} {reason} - {message}`.
    #[error("{status} {reason} - {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Invalid measurement in '{field}': {value}")]
    InvalidMeasurement { field: String, value: String },

    #[error("Malformed response: {message}")]
    Malformed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the next scheduled poll has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<powersense_api::Error> for CoreError {
    fn from(err: powersense_api::Error) -> Self {
        match err {
            powersense_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Malformed {
                        message: e.to_string(),
                    }
                }
            }
            powersense_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            powersense_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            powersense_api::Error::Api {
                status,
                reason,
                message,
            } => CoreError::Api {
                status,
                reason,
                message,
            },
            powersense_api::Error::Deserialization { message, body: _ } => {
                CoreError::Malformed { message }
            }
            powersense_api::Error::InvalidNumber { field, value } => {
                CoreError::InvalidMeasurement { field, value }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_service_format() {
        let err: CoreError = powersense_api::Error::Api {
            status: 502,
            reason: "Bad Gateway".into(),
            message: "Unknown error".into(),
        }
        .into();
        assert_eq!(err.to_string(), "502 Bad Gateway - Unknown error");
        assert!(err.is_transient());
    }

    #[test]
    fn invalid_number_becomes_invalid_measurement() {
        let err: CoreError = powersense_api::Error::InvalidNumber {
            field: "voltage".into(),
            value: "\"--\"".into(),
        }
        .into();
        assert!(matches!(
            err,
            CoreError::InvalidMeasurement { ref field, .. } if field == "voltage"
        ));
        assert!(!err.is_transient());
    }
}

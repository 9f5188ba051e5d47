use thiserror::Error;

/// Top-level error type for the `powersense-api` crate.
///
/// Covers every failure mode of the telemetry service client: transport,
/// non-2xx responses, malformed bodies, and numeric fields that fail
/// validation. `powersense-core` maps these into per-loop diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service ─────────────────────────────────────────────────────
    /// Non-2xx response. `message` comes from the JSON body's `message`
    /// field, or "Unknown error" when the body carries none.
    #[error("{status} {reason} - {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A numeric field was present but did not hold a finite number.
    #[error("Invalid number in field '{field}': {value}")]
    InvalidNumber { field: String, value: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

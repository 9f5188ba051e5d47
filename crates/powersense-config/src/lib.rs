//! Configuration for the PowerSense dashboard.
//!
//! TOML settings layered under environment overrides, validation and
//! translation to `powersense_core::OrchestratorConfig`, plus the small
//! durable store that remembers the user's price per kWh.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use powersense_core::{AvgPeriod, DEFAULT_HOST, OrchestratorConfig};

mod price_store;

pub use price_store::{PRICE_KEY, PriceStore};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub telemetry: TelemetrySettings,

    #[serde(default)]
    pub polling: PollingSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

/// Where the telemetry service lives.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TelemetrySettings {
    /// Service root URL.
    #[serde(default = "default_host")]
    pub host: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Polling cadence and initial parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollingSettings {
    #[serde(default = "default_interval_ms")]
    pub snapshot_interval_ms: u64,

    #[serde(default = "default_interval_ms")]
    pub period_interval_ms: u64,

    /// Snapshot history window in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    /// Initial averaging period: 1, 5, 10 or 30.
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: default_interval_ms(),
            period_interval_ms: default_interval_ms(),
            window_hours: default_window_hours(),
            period_minutes: default_period_minutes(),
        }
    }
}

/// Color scheme the dashboard starts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    #[default]
    Dark,
    Light,
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub theme: ThemeSetting,

    /// Gauge drawing-surface supersampling factor (1..=4).
    #[serde(default = "default_scale")]
    pub scale: u8,

    /// Price per kWh used until the user enters one.
    #[serde(default = "default_price")]
    pub default_price: f64,

    /// Currency label shown before cost estimates.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Milliseconds between animation steps (spinners, chart reveal).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Frames drawn per second.
    #[serde(default = "default_fps")]
    pub fps: u16,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            theme: ThemeSetting::default(),
            scale: default_scale(),
            default_price: default_price(),
            currency: default_currency(),
            tick_ms: default_tick_ms(),
            fps: default_fps(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}
fn default_timeout() -> u64 {
    10
}
fn default_interval_ms() -> u64 {
    2000
}
fn default_window_hours() -> u32 {
    24
}
fn default_period_minutes() -> u32 {
    5
}
fn default_scale() -> u8 {
    2
}
fn default_price() -> f64 {
    9.0
}
fn default_currency() -> String {
    "Rs.".into()
}
fn default_tick_ms() -> u64 {
    250
}
fn default_fps() -> u16 {
    30
}

// ── Validation ──────────────────────────────────────────────────────

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

impl Config {
    /// Check every setting against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.host_url()?;
        self.period()?;
        if self.telemetry.timeout_secs == 0 {
            return Err(invalid("telemetry.timeout_secs", "must be greater than zero"));
        }
        if self.polling.snapshot_interval_ms == 0 {
            return Err(invalid("polling.snapshot_interval_ms", "must be greater than zero"));
        }
        if self.polling.period_interval_ms == 0 {
            return Err(invalid("polling.period_interval_ms", "must be greater than zero"));
        }
        if self.polling.window_hours == 0 {
            return Err(invalid("polling.window_hours", "must be greater than zero"));
        }
        if !(1..=4).contains(&self.display.scale) {
            return Err(invalid(
                "display.scale",
                format!("expected 1 to 4, got {}", self.display.scale),
            ));
        }
        if self.display.tick_ms == 0 {
            return Err(invalid("display.tick_ms", "must be greater than zero"));
        }
        if !(1..=120).contains(&self.display.fps) {
            return Err(invalid(
                "display.fps",
                format!("expected 1 to 120, got {}", self.display.fps),
            ));
        }
        if !self.display.default_price.is_finite() || self.display.default_price < 0.0 {
            return Err(invalid(
                "display.default_price",
                format!("must be a non-negative number, got {}", self.display.default_price),
            ));
        }
        Ok(())
    }

    fn host_url(&self) -> Result<url::Url, ConfigError> {
        let url: url::Url = self
            .telemetry
            .host
            .parse()
            .map_err(|_| invalid("telemetry.host", format!("invalid URL: {}", self.telemetry.host)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "telemetry.host",
                format!("expected an http(s) URL, got {}", self.telemetry.host),
            ));
        }
        Ok(url)
    }

    fn period(&self) -> Result<AvgPeriod, ConfigError> {
        AvgPeriod::try_from(self.polling.period_minutes).map_err(|_| {
            invalid(
                "polling.period_minutes",
                format!("expected 1, 5, 10 or 30, got {}", self.polling.period_minutes),
            )
        })
    }

    /// Validate and build the runtime orchestrator configuration.
    pub fn to_orchestrator_config(&self) -> Result<OrchestratorConfig, ConfigError> {
        self.validate()?;
        let mut cfg = OrchestratorConfig::new(self.host_url()?);
        cfg.timeout = Duration::from_secs(self.telemetry.timeout_secs);
        cfg.snapshot_interval = Duration::from_millis(self.polling.snapshot_interval_ms);
        cfg.period_interval = Duration::from_millis(self.polling.period_interval_ms);
        cfg.window_hours = self.polling.window_hours;
        cfg.period = self.period()?;
        Ok(cfg)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("site", "powersense", "powersense")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "powersense", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the local state file that holds the saved price.
pub fn state_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "powersense", "state.toml"]),
        |dirs| dirs.data_dir().join("state.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults fill every key. Environment
/// variables use the `POWERSENSE_` prefix with `__` between sections,
/// e.g. `POWERSENSE_TELEMETRY__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("POWERSENSE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        let orch = cfg.to_orchestrator_config().unwrap();
        assert_eq!(orch.host.as_str(), "https://backend.powersense.site/");
        assert_eq!(orch.period, AvgPeriod::Five);
        assert_eq!(orch.window_hours, 24);
        assert_eq!(orch.snapshot_interval, Duration::from_millis(2000));
    }

    #[test]
    fn rejects_unsupported_period() {
        let mut cfg = Config::default();
        cfg.polling.period_minutes = 15;
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "polling.period_minutes")
        );
    }

    #[test]
    fn rejects_bad_host_and_scale() {
        let mut cfg = Config::default();
        cfg.telemetry.host = "not a url".into();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.telemetry.host = "ftp://example.com".into();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.display.scale = 0;
        assert!(cfg.validate().is_err());
        cfg.display.scale = 5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_intervals_and_negative_price() {
        let mut cfg = Config::default();
        cfg.polling.snapshot_interval_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.display.default_price = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_frame_pacing_out_of_range() {
        let cfg = Config::default();
        assert_eq!((cfg.display.tick_ms, cfg.display.fps), (250, 30));

        let mut cfg = Config::default();
        cfg.display.tick_ms = 0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "display.tick_ms"));

        let mut cfg = Config::default();
        cfg.display.fps = 0;
        assert!(cfg.validate().is_err());
        cfg.display.fps = 240;
        assert!(cfg.validate().is_err());
        cfg.display.fps = 60;
        cfg.validate().unwrap();
    }
}

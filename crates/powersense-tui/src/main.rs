//! `powersense`: live energy telemetry dashboard for the terminal.
//!
//! Polls a PowerSense telemetry service for instantaneous readings, 24-hour
//! histories and the average power over a selectable period, and renders
//! them as gauges, line charts and a running cost estimate.
//!
//! Logs are written to a file (default `/tmp/powersense.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, config layering, tracing setup, panic
//! hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use powersense_config::{Config, PriceStore, ThemeSetting};
use powersense_core::MetricsOrchestrator;

use crate::app::App;
use crate::event::Cadence;
use crate::screens::dashboard::DashboardSettings;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

/// Live energy telemetry dashboard
#[derive(Parser, Debug)]
#[command(name = "powersense", version, about)]
struct Cli {
    /// Telemetry service URL (e.g., https://backend.powersense.site)
    #[arg(short = 'H', long, env = "POWERSENSE_HOST")]
    host: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History window in hours
    #[arg(short, long)]
    window_hours: Option<u32>,

    /// Initial averaging period in minutes (1, 5, 10 or 30)
    #[arg(short, long)]
    period: Option<u32>,

    /// Polling cadence for both loops (e.g. "2s", "500ms")
    #[arg(short, long, value_parser = humantime::parse_duration)]
    interval: Option<Duration>,

    /// Per-request timeout (e.g. "10s")
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Starting color scheme
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Gauge supersampling factor (1-4)
    #[arg(long)]
    scale: Option<u8>,

    /// Log file path (defaults to /tmp/powersense.log)
    #[arg(long, default_value = "/tmp/powersense.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// terminal is in raw mode. The returned guard must be held until exit so
/// buffered logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("powersense={log_level}")));

    let log_dir = cli.log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("powersense.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Load the config file and apply CLI overrides on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => powersense_config::load_config_from(path),
        None => powersense_config::load_config(),
    }
    .wrap_err("failed to load configuration")?;

    if let Some(host) = &cli.host {
        cfg.telemetry.host.clone_from(host);
    }
    if let Some(timeout) = cli.timeout {
        cfg.telemetry.timeout_secs = timeout.as_secs().max(1);
    }
    if let Some(interval) = cli.interval {
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        cfg.polling.snapshot_interval_ms = ms;
        cfg.polling.period_interval_ms = ms;
    }
    if let Some(hours) = cli.window_hours {
        cfg.polling.window_hours = hours;
    }
    if let Some(minutes) = cli.period {
        cfg.polling.period_minutes = minutes;
    }
    if let Some(theme) = cli.theme {
        cfg.display.theme = match theme {
            ThemeArg::Dark => ThemeSetting::Dark,
            ThemeArg::Light => ThemeSetting::Light,
        };
    }
    if let Some(scale) = cli.scale {
        cfg.display.scale = scale;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let cfg = load_config(&cli)?;
    let orchestrator_config = cfg.to_orchestrator_config().wrap_err("invalid configuration")?;
    let orchestrator = MetricsOrchestrator::new(orchestrator_config.clone())?;

    let price_store = PriceStore::open_default();
    let price = price_store.load().unwrap_or(cfg.display.default_price);

    info!(
        host = %orchestrator_config.host,
        window_hours = orchestrator_config.window_hours,
        period = %orchestrator_config.period,
        price,
        "starting powersense"
    );

    let settings = DashboardSettings {
        window_hours: orchestrator_config.window_hours,
        period: orchestrator_config.period,
        price,
        currency: cfg.display.currency.clone(),
        theme: cfg.display.theme.into(),
        scale: cfg.display.scale,
    };

    let cadence = Cadence::new(cfg.display.tick_ms, cfg.display.fps);
    let mut app = App::new(orchestrator, price_store, cadence, settings);
    app.run().await
}

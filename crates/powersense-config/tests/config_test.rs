#![allow(clippy::unwrap_used)]
// File-backed config and price-store behavior.

use std::time::Duration;

use powersense_config::{
    Config, ConfigError, PRICE_KEY, PriceStore, ThemeSetting, load_config_from, save_config_to,
};
use powersense_core::AvgPeriod;

// ── Config loading ──────────────────────────────────────────────────

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn test_partial_file_merges_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[telemetry]
host = "http://10.0.0.5:8080"

[polling]
period_minutes = 30
snapshot_interval_ms = 5000

[display]
theme = "light"
currency = "$"
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.telemetry.host, "http://10.0.0.5:8080");
    assert_eq!(cfg.telemetry.timeout_secs, 10);
    assert_eq!(cfg.polling.window_hours, 24);
    assert_eq!(cfg.display.theme, ThemeSetting::Light);
    assert_eq!(cfg.display.currency, "$");
    assert_eq!(cfg.display.scale, 2);

    let orch = cfg.to_orchestrator_config().unwrap();
    assert_eq!(orch.period, AvgPeriod::Thirty);
    assert_eq!(orch.snapshot_interval, Duration::from_millis(5000));
    assert_eq!(orch.period_interval, Duration::from_millis(2000));
}

#[test]
fn test_malformed_file_is_a_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[polling]\nwindow_hours = \"many\"\n").unwrap();

    let result = load_config_from(&path);
    assert!(
        matches!(result, Err(ConfigError::Figment(_))),
        "expected Figment error, got: {result:?}"
    );
}

#[test]
fn test_save_then_load_preserves_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.polling.window_hours = 6;
    cfg.display.theme = ThemeSetting::Light;
    cfg.display.default_price = 12.5;
    save_config_to(&cfg, &path).unwrap();

    assert_eq!(load_config_from(&path).unwrap(), cfg);
}

// ── Price store ─────────────────────────────────────────────────────

#[test]
fn test_price_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = PriceStore::new(dir.path().join("state").join("state.toml"));

    assert_eq!(store.load(), None);

    store.save(12.75).unwrap();
    assert_eq!(store.load(), Some(12.75));

    store.save(0.0).unwrap();
    assert_eq!(store.load(), Some(0.0));

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains(&format!("{PRICE_KEY} = \"0\"")), "unexpected file: {raw}");
}

#[test]
fn test_price_store_keeps_unrelated_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");
    std::fs::write(&path, "lastTheme = \"light\"\npowerSensePricePerKWH = \"3\"\n").unwrap();

    let store = PriceStore::new(&path);
    assert_eq!(store.load(), Some(3.0));
    store.save(7.5).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("lastTheme = \"light\""), "unexpected file: {raw}");
    assert_eq!(store.load(), Some(7.5));
}

#[test]
fn test_price_store_ignores_unparsable_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");
    let store = PriceStore::new(&path);

    std::fs::write(&path, "powerSensePricePerKWH = \"cheap\"\n").unwrap();
    assert_eq!(store.load(), None);

    std::fs::write(&path, "powerSensePricePerKWH = \"-4\"\n").unwrap();
    assert_eq!(store.load(), None);

    std::fs::write(&path, "not = [valid").unwrap();
    assert_eq!(store.load(), None);
}

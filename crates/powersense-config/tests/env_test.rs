#![allow(clippy::unwrap_used)]
// Environment layering. Kept in its own test binary so the variables set
// here never leak into the file-only tests running in parallel.

use figment::Jail;
use powersense_config::load_config_from;

#[test]
fn test_environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[telemetry]
host = "http://10.0.0.5:8080"
timeout_secs = 3
"#,
        )?;
        jail.set_env("POWERSENSE_TELEMETRY__HOST", "http://192.168.1.20:9000");
        jail.set_env("POWERSENSE_POLLING__WINDOW_HOURS", "6");

        let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
        assert_eq!(cfg.telemetry.host, "http://192.168.1.20:9000");
        assert_eq!(cfg.telemetry.timeout_secs, 3);
        assert_eq!(cfg.polling.window_hours, 6);
        assert_eq!(cfg.polling.period_minutes, 5);
        Ok(())
    });
}

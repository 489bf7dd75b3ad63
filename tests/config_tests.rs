/// Configuration layering tests.
///
/// Env vars are process-global, so every env-dependent assertion lives in a
/// single test. `set_var` / `remove_var` are `unsafe` in edition 2024; the
/// calls are sound because nothing else in this test binary reads them.
use std::time::Duration;

use loginscope::config::{self, LoginscopeConfig};

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must not race with other threads reading the environment.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must not race with other threads reading the environment.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 5] = [
    "LOGINSCOPE_URL",
    "LOGINSCOPE_TIMEOUT_MS",
    "LOGINSCOPE_INTERVAL_MS",
    "LOGINSCOPE_COLOR",
    "LOGINSCOPE_LOGGING",
];

#[test]
fn env_overrides_take_precedence() {
    unsafe {
        set_env("LOGINSCOPE_URL", "http://detector.internal:8080");
        set_env("LOGINSCOPE_TIMEOUT_MS", "2500");
        set_env("LOGINSCOPE_INTERVAL_MS", "5000");
        set_env("LOGINSCOPE_COLOR", "off");
        set_env("LOGINSCOPE_LOGGING", "0");
    }

    let cfg = config::load();
    assert_eq!(cfg.backend.base_url, "http://detector.internal:8080");
    assert_eq!(cfg.backend.timeout_ms, 2500);
    assert_eq!(cfg.polling.interval(), Duration::from_millis(5000));
    assert!(!cfg.display.color);
    assert!(!cfg.logging.enabled);

    // Unparsable numbers are ignored
    unsafe { set_env("LOGINSCOPE_INTERVAL_MS", "soon") };
    let cfg = config::load();
    assert_ne!(cfg.polling.interval_ms, 0);

    unsafe {
        set_env("LOGINSCOPE_COLOR", "yes");
        set_env("LOGINSCOPE_LOGGING", "true");
    }
    let cfg = config::load();
    assert!(cfg.display.color);
    assert!(cfg.logging.enabled);

    for var in VARS {
        unsafe { remove_env(var) };
    }
}

#[test]
fn defaults_match_documented_values() {
    let cfg = LoginscopeConfig::default();
    assert_eq!(cfg.backend.base_url, "http://127.0.0.1:5000");
    assert_eq!(cfg.backend.timeout_ms, 10_000);
    assert_eq!(cfg.polling.interval(), Duration::from_secs(30));
    assert_eq!(cfg.polling.history_rows, 10);
    assert_eq!(cfg.polling.geo_top, 5);
    assert_eq!(cfg.display.chart_width, 40);
    assert_eq!(cfg.logging.path, "~/.loginscope/events.jsonl");
}

#[test]
fn default_toml_parses_back_to_defaults() {
    let parsed: LoginscopeConfig = toml::from_str(&LoginscopeConfig::default_toml()).unwrap();
    assert_eq!(parsed.backend.base_url, LoginscopeConfig::default().backend.base_url);
    assert_eq!(parsed.polling.interval_ms, 30_000);
}

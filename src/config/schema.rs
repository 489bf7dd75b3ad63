/// Configuration schema and defaults for loginscope.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[polling]`, `[display]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level loginscope configuration.
///
/// Maps directly to the `~/.loginscope/config.toml` and `.loginscope.toml`
/// file schemas. All sections and fields are optional — missing values fall
/// back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginscopeConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the anomaly-detection service lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// HTTP base URL of the detection service.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [polling]
// ---------------------------------------------------------------------------

/// Dashboard refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between poll cycles (milliseconds).
    pub interval_ms: u64,
    /// Number of recent predictions shown in the history table.
    pub history_rows: usize,
    /// Number of locations shown in the geographic ranking.
    pub geo_top: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            history_rows: 10,
            geo_top: 5,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Terminal rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Emit ANSI colors.
    pub color: bool,
    /// Width (cells) of proportional chart bars.
    pub chart_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            chart_width: 40,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Event log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether poll and prediction events are appended to the event log.
    pub enabled: bool,
    /// Path to the event log file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.loginscope/events.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl LoginscopeConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `loginscope config init` to write a self-documenting file.
    pub fn default_toml() -> String {
        r#"# loginscope Configuration
# Terminal dashboard for a login anomaly detection service
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (LOGINSCOPE_*)
#   2. Project config (.loginscope.toml in current directory)
#   3. User global config (~/.loginscope/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://127.0.0.1:5000"   # or LOGINSCOPE_URL
timeout_ms = 10000

[polling]
interval_ms = 30000                  # Dashboard refresh cadence
history_rows = 10                    # Rows in the recent predictions table
geo_top = 5                          # Locations in the geographic ranking

[display]
color = true                         # Set false or LOGINSCOPE_COLOR=0 for plain output
chart_width = 40

[logging]
enabled = true
path = "~/.loginscope/events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::FetchError;
use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Event entries (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the structured event log (`~/.loginscope/events.jsonl`).
///
/// One line per poll panel per cycle, and one per prediction submission.
/// Read back by the reporter for `loginscope log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    Poll {
        timestamp: String,
        cycle: u64,
        /// `"stats"` or `"history"`.
        panel: String,
        outcome: PollOutcome,
        latency_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_kind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Predict {
        timestamp: String,
        outcome: PredictOutcome,
        latency_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl LogEvent {
    pub fn timestamp(&self) -> &str {
        match self {
            Self::Poll { timestamp, .. } | Self::Predict { timestamp, .. } => timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    Applied,
    Stale,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictOutcome {
    Normal,
    Anomaly,
    Error,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Append-only JSONL event log.
///
/// All writes are best-effort. Failures are silently ignored so logging
/// never interrupts polling or a submission.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Resolve the log location from config; `None` path when disabled.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            path: expand_home(&config.path),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Log the outcome of one panel in one poll cycle.
    pub fn log_poll(
        &self,
        cycle: u64,
        panel: &str,
        outcome: PollOutcome,
        latency_ms: u64,
        error: Option<&FetchError>,
    ) {
        self.log(&LogEvent::Poll {
            timestamp: Utc::now().to_rfc3339(),
            cycle,
            panel: panel.to_string(),
            outcome,
            latency_ms,
            error_kind: error.map(|e| e.kind().to_string()),
            error: error.map(|e| e.message().to_string()),
        });
    }

    /// Log a prediction submission.
    pub fn log_predict(&self, outcome: PredictOutcome, latency_ms: u64, error: Option<&str>) {
        self.log(&LogEvent::Predict {
            timestamp: Utc::now().to_rfc3339(),
            outcome,
            latency_ms,
            error: error.map(str::to_owned),
        });
    }

    pub fn log(&self, event: &LogEvent) {
        let _ = self.append(event);
    }

    /// Read all events. Silently skips malformed lines; returns an empty vec
    /// if the log is disabled or the file cannot be read.
    pub fn read_all(&self) -> Vec<LogEvent> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<LogEvent>(&line).ok())
            .collect()
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> EventLog {
        let path = std::env::temp_dir().join(format!(
            "loginscope-{name}-{}-{}.jsonl",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        EventLog::at(path)
    }

    #[test]
    fn round_trips_poll_and_predict_events() {
        let log = temp_log("events");
        let err = FetchError::Transport("connection refused".to_string());

        log.log_poll(1, "stats", PollOutcome::Failed, 12, Some(&err));
        log.log_poll(1, "history", PollOutcome::Applied, 8, None);
        log.log_predict(PredictOutcome::Error, 30, Some("model unavailable"));

        let events = log.read_all();
        assert_eq!(events.len(), 3);
        match &events[0] {
            LogEvent::Poll {
                panel,
                outcome,
                error_kind,
                error,
                ..
            } => {
                assert_eq!(panel, "stats");
                assert_eq!(*outcome, PollOutcome::Failed);
                assert_eq!(error_kind.as_deref(), Some("transport"));
                assert_eq!(error.as_deref(), Some("connection refused"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(
            events[2],
            LogEvent::Predict {
                outcome: PredictOutcome::Error,
                ..
            }
        ));

        let _ = fs::remove_file(log.path().unwrap());
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = EventLog::disabled();
        log.log_predict(PredictOutcome::Normal, 1, None);
        assert!(log.read_all().is_empty());
        assert!(!log.is_enabled());
    }

    #[test]
    fn from_config_respects_enabled_flag() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(EventLog::from_config(&config).path().is_none());

        let config = LoggingConfig {
            enabled: true,
            path: "/tmp/x.jsonl".to_string(),
        };
        assert_eq!(
            EventLog::from_config(&config).path(),
            Some(Path::new("/tmp/x.jsonl"))
        );
    }

    #[test]
    fn serialized_shape_is_tagged() {
        let event = LogEvent::Predict {
            timestamp: "2025-01-15T10:00:00+00:00".to_string(),
            outcome: PredictOutcome::Anomaly,
            latency_ms: 40,
            error: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "predict");
        assert_eq!(json["outcome"], "anomaly");
        assert!(json.get("error").is_none());
    }
}

//! Event log reporter: summaries for `loginscope log`.
//!
//! Reads the JSONL event log and provides:
//! - **Summary**: poll success/failure counts per panel, prediction outcomes
//! - **Daily**: per-day activity, oldest first

use std::collections::BTreeMap;

use crate::analytics::logger::{EventLog, LogEvent, PollOutcome, PredictOutcome};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Poll counters for one panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelStats {
    pub applied: usize,
    pub stale: usize,
    pub failed: usize,
    pub total_latency_ms: u64,
}

impl PanelStats {
    pub fn total(&self) -> usize {
        self.applied + self.stale + self.failed
    }

    /// Failure percentage, returns 0.0 if there were no polls.
    pub fn failure_pct(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.failed as f64 / total as f64) * 100.0
        }
    }

    pub fn avg_latency_ms(&self) -> u64 {
        match self.total() {
            0 => 0,
            n => self.total_latency_ms / n as u64,
        }
    }
}

/// Prediction outcome counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionCounts {
    pub normal: usize,
    pub anomaly: usize,
    pub errors: usize,
}

impl PredictionCounts {
    pub fn total(&self) -> usize {
        self.normal + self.anomaly + self.errors
    }
}

/// The most recent failure seen in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct LastFailure {
    pub timestamp: String,
    pub source: String,
    pub message: String,
}

/// Aggregate view of the event log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSummary {
    pub stats: PanelStats,
    pub history: PanelStats,
    pub predictions: PredictionCounts,
    pub last_failure: Option<LastFailure>,
}

impl LogSummary {
    pub fn is_empty(&self) -> bool {
        self.stats.total() == 0 && self.history.total() == 0 && self.predictions.total() == 0
    }
}

/// A single day of activity.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub date: String,
    pub polls: usize,
    pub poll_failures: usize,
    pub predictions: usize,
    pub anomalies: usize,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Summarize everything in the given log.
pub fn compute_summary(log: &EventLog) -> LogSummary {
    summarize(&log.read_all())
}

/// Per-day activity from the given log.
pub fn compute_daily(log: &EventLog) -> Vec<DayEntry> {
    daily(&log.read_all())
}

pub fn summarize(events: &[LogEvent]) -> LogSummary {
    let mut summary = LogSummary::default();

    for event in events {
        match event {
            LogEvent::Poll {
                timestamp,
                panel,
                outcome,
                latency_ms,
                error,
                ..
            } => {
                let stats = if panel == "history" {
                    &mut summary.history
                } else {
                    &mut summary.stats
                };
                stats.total_latency_ms += latency_ms;
                match outcome {
                    PollOutcome::Applied => stats.applied += 1,
                    PollOutcome::Stale => stats.stale += 1,
                    PollOutcome::Failed => {
                        stats.failed += 1;
                        summary.last_failure = Some(LastFailure {
                            timestamp: timestamp.clone(),
                            source: panel.clone(),
                            message: error.clone().unwrap_or_default(),
                        });
                    }
                }
            }
            LogEvent::Predict {
                timestamp,
                outcome,
                error,
                ..
            } => match outcome {
                PredictOutcome::Normal => summary.predictions.normal += 1,
                PredictOutcome::Anomaly => summary.predictions.anomaly += 1,
                PredictOutcome::Error => {
                    summary.predictions.errors += 1;
                    summary.last_failure = Some(LastFailure {
                        timestamp: timestamp.clone(),
                        source: "predict".to_string(),
                        message: error.clone().unwrap_or_default(),
                    });
                }
            },
        }
    }

    summary
}

pub fn daily(events: &[LogEvent]) -> Vec<DayEntry> {
    let mut days: BTreeMap<String, DayEntry> = BTreeMap::new();

    for event in events {
        // RFC 3339: first 10 chars are YYYY-MM-DD
        let date = event.timestamp().get(..10).unwrap_or("unknown").to_string();
        let entry = days.entry(date.clone()).or_insert_with(|| DayEntry {
            date,
            polls: 0,
            poll_failures: 0,
            predictions: 0,
            anomalies: 0,
        });

        match event {
            LogEvent::Poll { outcome, .. } => {
                entry.polls += 1;
                if *outcome == PollOutcome::Failed {
                    entry.poll_failures += 1;
                }
            }
            LogEvent::Predict { outcome, .. } => {
                entry.predictions += 1;
                if *outcome == PredictOutcome::Anomaly {
                    entry.anomalies += 1;
                }
            }
        }
    }

    days.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(ts: &str, panel: &str, outcome: PollOutcome, error: Option<&str>) -> LogEvent {
        LogEvent::Poll {
            timestamp: ts.to_string(),
            cycle: 1,
            panel: panel.to_string(),
            outcome,
            latency_ms: 20,
            error_kind: error.map(|_| "transport".to_string()),
            error: error.map(str::to_owned),
        }
    }

    fn predict(ts: &str, outcome: PredictOutcome) -> LogEvent {
        LogEvent::Predict {
            timestamp: ts.to_string(),
            outcome,
            latency_ms: 50,
            error: (outcome == PredictOutcome::Error).then(|| "model unavailable".to_string()),
        }
    }

    fn sample_events() -> Vec<LogEvent> {
        vec![
            poll("2025-01-15T10:00:00+00:00", "stats", PollOutcome::Applied, None),
            poll("2025-01-15T10:00:00+00:00", "history", PollOutcome::Applied, None),
            poll("2025-01-15T10:00:30+00:00", "stats", PollOutcome::Failed, Some("refused")),
            poll("2025-01-15T10:00:30+00:00", "history", PollOutcome::Stale, None),
            predict("2025-01-16T09:00:00+00:00", PredictOutcome::Anomaly),
            predict("2025-01-16T09:05:00+00:00", PredictOutcome::Normal),
            predict("2025-01-16T09:06:00+00:00", PredictOutcome::Error),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = summarize(&sample_events());

        assert_eq!(summary.stats.applied, 1);
        assert_eq!(summary.stats.failed, 1);
        assert_eq!(summary.history.stale, 1);
        assert!((summary.stats.failure_pct() - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.stats.avg_latency_ms(), 20);
        assert_eq!(summary.predictions.total(), 3);
        assert_eq!(summary.predictions.anomaly, 1);
    }

    #[test]
    fn test_last_failure_is_most_recent() {
        let summary = summarize(&sample_events());
        let last = summary.last_failure.unwrap();
        assert_eq!(last.source, "predict");
        assert_eq!(last.message, "model unavailable");
    }

    #[test]
    fn test_empty_events() {
        let summary = summarize(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.stats.failure_pct(), 0.0);
        assert_eq!(summary.history.avg_latency_ms(), 0);
        assert!(daily(&[]).is_empty());
    }

    #[test]
    fn test_daily_grouping() {
        let days = daily(&sample_events());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2025-01-15");
        assert_eq!(days[0].polls, 4);
        assert_eq!(days[0].poll_failures, 1);
        assert_eq!(days[1].date, "2025-01-16");
        assert_eq!(days[1].predictions, 3);
        assert_eq!(days[1].anomalies, 1);
    }
}

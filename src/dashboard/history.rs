//! Recent-predictions table.
//!
//! The backend delivers history oldest-first; the table shows the newest
//! `limit` records newest-first. Each refresh rebuilds the table from
//! scratch.

use chrono::{DateTime, Local, NaiveDateTime};
use colored::Colorize;
use serde_json::Value;

use super::charts::truncate;
use crate::api::PredictionRecord;

pub const DEFAULT_HISTORY_ROWS: usize = 10;

/// Placeholder for absent input fields.
pub const UNKNOWN: &str = "Unknown";

/// Display format for row timestamps (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive layouts the backend is known to emit (Python `isoformat()` and
/// the form's `datetime-local` value).
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Normal,
    Anomaly,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Anomaly => "Anomaly",
        }
    }

    /// Style tag attached to the status cell.
    pub fn style_tag(&self) -> &'static str {
        match self {
            Self::Normal => "status-normal",
            Self::Anomaly => "status-anomaly",
        }
    }
}

/// One display row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub timestamp: String,
    pub user: String,
    pub location: String,
    pub device: String,
    pub status: Status,
}

impl HistoryRow {
    pub fn from_record(record: &PredictionRecord) -> Self {
        Self {
            timestamp: match record.timestamp.trim() {
                "" => UNKNOWN.to_string(),
                raw => format_local_timestamp(raw),
            },
            user: display_field(record.input("user_id")),
            location: display_field(record.input("geo_location")),
            device: display_field(record.input("device_id")),
            status: if record.is_anomaly() {
                Status::Anomaly
            } else {
                Status::Normal
            },
        }
    }
}

/// View-model for the recent-predictions table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    rows: Vec<HistoryRow>,
}

impl HistoryTable {
    /// Clear the table and repopulate it from `records`.
    pub fn replace(&mut self, records: &[PredictionRecord], limit: usize) {
        self.rows.clear();
        self.rows.extend(build_rows(records, limit));
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Table lines without a heading; long cells are cut to their column.
    pub fn render(&self, color: bool) -> Vec<String> {
        if self.rows.is_empty() {
            let empty = "  No predictions yet.";
            return vec![if color {
                empty.dimmed().to_string()
            } else {
                empty.to_string()
            }];
        }

        let mut lines = vec![
            format!(
                "  {:<20} {:<12} {:<20} {:<12} Status",
                "Time", "User", "Location", "Device"
            ),
            format!("  {}", "-".repeat(74)),
        ];

        for row in &self.rows {
            let status = match (row.status, color) {
                (Status::Anomaly, true) => row.status.label().red().bold().to_string(),
                (Status::Normal, true) => row.status.label().green().to_string(),
                (_, false) => row.status.label().to_string(),
            };
            lines.push(format!(
                "  {:<20} {:<12} {:<20} {:<12} {}",
                row.timestamp,
                truncate(&row.user, 12),
                truncate(&row.location, 20),
                truncate(&row.device, 12),
                status,
            ));
        }

        lines
    }
}

/// The last `limit` records, newest first.
pub fn build_rows(records: &[PredictionRecord], limit: usize) -> Vec<HistoryRow> {
    records
        .iter()
        .rev()
        .take(limit)
        .map(HistoryRow::from_record)
        .collect()
}

/// Render an input field, falling back to [`UNKNOWN`] for absent, null,
/// empty, zero or `false` values.
fn display_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Format an ISO-8601 timestamp in local time.
///
/// Offset-carrying timestamps are converted to the local zone, naive ones
/// are already local. Anything unparsable is returned unchanged.
pub fn format_local_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return naive.format(TIMESTAMP_FORMAT).to_string();
        }
    }
    raw.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

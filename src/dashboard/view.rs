//! Dashboard view-model.
//!
//! [`DashboardView`] is the single owner of everything on screen: summary
//! numbers, the chart renderer, and the history table. Poll results are
//! applied to it with the id of the cycle that fetched them; results older
//! than what a panel already shows are dropped. [`DashboardView::render`]
//! is a one-way projection of this state to terminal text.

use chrono::{DateTime, Local};
use colored::Colorize;

use super::aggregate::{Aggregate, Summary, aggregate};
use super::charts::{
    ANOMALY_COLOR, ChartData, ChartKind, ChartRenderer, GEO_PALETTE, HOURLY_COLOR, NORMAL_COLOR,
    Region, StyleConfig,
};
use super::history::HistoryTable;
use super::poller::CycleId;
use crate::api::{PredictionRecord, StatsSnapshot};
use crate::config::LoginscopeConfig;

/// Result of applying a payload to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rendered,
    /// A newer cycle already updated this panel.
    Stale,
}

/// Layout and presentation knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub geo_top: usize,
    pub history_rows: usize,
    pub chart_width: usize,
    pub color: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            geo_top: super::aggregate::DEFAULT_GEO_LIMIT,
            history_rows: super::history::DEFAULT_HISTORY_ROWS,
            chart_width: 40,
            color: true,
        }
    }
}

impl ViewSettings {
    pub fn from_config(config: &LoginscopeConfig) -> Self {
        Self {
            geo_top: config.polling.geo_top,
            history_rows: config.polling.history_rows,
            chart_width: config.display.chart_width,
            color: config.display.color,
        }
    }
}

/// Per-panel bookkeeping: which cycle last updated it and when.
#[derive(Debug, Clone, Copy, Default)]
struct PanelMark {
    cycle: Option<CycleId>,
    updated_at: Option<DateTime<Local>>,
}

impl PanelMark {
    fn is_stale(&self, cycle: CycleId) -> bool {
        self.cycle.is_some_and(|last| cycle < last)
    }

    fn mark(&mut self, cycle: CycleId) {
        self.cycle = Some(cycle);
        self.updated_at = Some(Local::now());
    }
}

#[derive(Debug, Default)]
pub struct DashboardView {
    settings: ViewSettings,
    aggregate: Option<Aggregate>,
    charts: ChartRenderer,
    history: HistoryTable,
    stats_mark: PanelMark,
    history_mark: PanelMark,
}

impl DashboardView {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Aggregate the snapshot and redraw the three charts.
    pub fn apply_stats(&mut self, cycle: CycleId, snapshot: &StatsSnapshot) -> Applied {
        if self.stats_mark.is_stale(cycle) {
            return Applied::Stale;
        }

        let agg = aggregate(snapshot, self.settings.geo_top);
        let width = self.settings.chart_width;
        let color = self.settings.color;

        self.charts.render(
            Region::AnomalyDistribution,
            ChartKind::Proportional,
            ChartData::distribution(&agg.distribution),
            &StyleConfig::new(&[NORMAL_COLOR, ANOMALY_COLOR], width, color),
        );
        self.charts.render(
            Region::HourlyActivity,
            ChartKind::Histogram,
            ChartData::hourly(&agg.hourly),
            &StyleConfig::new(&[HOURLY_COLOR], width, color),
        );
        self.charts.render(
            Region::GeoDistribution,
            ChartKind::Proportional,
            ChartData::ranking(&agg.geo_top),
            &StyleConfig::new(&GEO_PALETTE, width, color),
        );

        self.aggregate = Some(agg);
        self.stats_mark.mark(cycle);
        Applied::Rendered
    }

    /// Rebuild the history table.
    pub fn apply_history(&mut self, cycle: CycleId, records: &[PredictionRecord]) -> Applied {
        if self.history_mark.is_stale(cycle) {
            return Applied::Stale;
        }

        self.history.replace(records, self.settings.history_rows);
        self.history_mark.mark(cycle);
        Applied::Rendered
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        self.aggregate.as_ref()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.aggregate.as_ref().map(|agg| &agg.summary)
    }

    pub fn charts(&self) -> &ChartRenderer {
        &self.charts
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    pub fn stats_cycle(&self) -> Option<CycleId> {
        self.stats_mark.cycle
    }

    pub fn history_cycle(&self) -> Option<CycleId> {
        self.history_mark.cycle
    }

    // -- Projection --

    /// Render the whole dashboard as terminal text.
    pub fn render(&self) -> String {
        let mut out = Vec::new();

        out.push(self.heading("Login Anomaly Dashboard"));
        out.push("=".repeat(60));
        out.push(String::new());

        match self.summary() {
            Some(summary) => {
                out.push(format!(
                    "  {} {}   {} {}   {} {}",
                    self.bold("Predictions:"),
                    summary.total_predictions,
                    self.bold("Anomalies:"),
                    summary.anomaly_count,
                    self.bold("Accuracy:"),
                    summary.accuracy_display(),
                ));
            }
            None => out.push(self.dim("  Waiting for statistics...")),
        }
        out.push(String::new());

        for region in Region::ALL {
            out.push(self.heading(region.title()));
            let lines = self.charts.draw(region);
            if lines.is_empty() {
                out.push(self.dim("  no data yet"));
            } else {
                out.extend(lines);
            }
            out.push(String::new());
        }

        out.push(self.heading("Recent Predictions"));
        out.extend(self.render_history());
        out.push(String::new());

        out.push(self.dim(&format!(
            "  stats updated {}  ·  history updated {}",
            format_mark(&self.stats_mark),
            format_mark(&self.history_mark),
        )));

        out.join("\n")
    }

    /// The history table lines, without a heading.
    pub fn render_history(&self) -> Vec<String> {
        self.history.render(self.settings.color)
    }

    fn heading(&self, text: &str) -> String {
        if self.settings.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.settings.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.settings.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

fn format_mark(mark: &PanelMark) -> String {
    match (mark.cycle, mark.updated_at) {
        (Some(cycle), Some(at)) => format!("{} (cycle {cycle})", at.format("%H:%M:%S")),
        _ => "never".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain_view() -> DashboardView {
        DashboardView::new(ViewSettings {
            color: false,
            ..ViewSettings::default()
        })
    }

    fn snapshot(anomalies: u64) -> StatsSnapshot {
        serde_json::from_value(json!({
            "total_predictions": 10,
            "anomaly_count": anomalies,
            "normal_count": 10 - anomalies,
            "accuracy": 0.9,
            "hourly_distribution": { "14": 10 },
            "geographic_distribution": { "Canada": 6, "Peru": 4 }
        }))
        .unwrap()
    }

    #[test]
    fn apply_stats_renders_three_charts() {
        let mut view = plain_view();
        assert_eq!(view.apply_stats(CycleId(1), &snapshot(1)), Applied::Rendered);

        assert_eq!(view.charts().live_count(), 3);
        assert_eq!(view.summary().unwrap().accuracy_display(), "90.0%");
        assert_eq!(view.stats_cycle(), Some(CycleId(1)));
    }

    #[test]
    fn stale_stats_are_discarded() {
        let mut view = plain_view();
        view.apply_stats(CycleId(5), &snapshot(2));
        let ids: Vec<u64> = Region::ALL
            .iter()
            .map(|r| view.charts().handle(*r).unwrap().id())
            .collect();

        assert_eq!(view.apply_stats(CycleId(4), &snapshot(9)), Applied::Stale);

        assert_eq!(view.summary().unwrap().anomaly_count, 2);
        let after: Vec<u64> = Region::ALL
            .iter()
            .map(|r| view.charts().handle(*r).unwrap().id())
            .collect();
        assert_eq!(ids, after);
    }

    #[test]
    fn stale_history_is_discarded() {
        let mut view = plain_view();
        let record: PredictionRecord = serde_json::from_value(json!({
            "timestamp": "2025-06-15T14:30:00",
            "input_data": { "user_id": "U1" },
            "prediction": { "anomaly": 0 }
        }))
        .unwrap();

        view.apply_history(CycleId(3), &[record.clone(), record.clone()]);
        assert_eq!(view.apply_history(CycleId(2), &[record]), Applied::Stale);
        assert_eq!(view.history().rows().len(), 2);
    }

    #[test]
    fn render_before_data_shows_placeholders() {
        let text = plain_view().render();
        assert!(text.contains("Waiting for statistics"));
        assert!(text.contains("No predictions yet."));
        assert!(text.contains("never"));
    }

    #[test]
    fn render_includes_summary_and_rows() {
        let mut view = plain_view();
        view.apply_stats(CycleId(1), &snapshot(3));
        let record: PredictionRecord = serde_json::from_value(json!({
            "timestamp": "2025-06-15T14:30:00",
            "input_data": { "user_id": "U1234", "geo_location": "Canada" },
            "prediction": { "anomaly": 1 }
        }))
        .unwrap();
        view.apply_history(CycleId(1), &[record]);

        let text = view.render();
        assert!(text.contains("Predictions: 10"));
        assert!(text.contains("Anomalies: 3"));
        assert!(text.contains("U1234"));
        assert!(text.contains("Anomaly"));
        assert!(text.contains("Top Locations"));
        assert!(text.contains("cycle 1"));
    }
}

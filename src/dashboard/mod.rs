//! Live dashboard: polling, aggregation, charts, and the history table.
//!
//! Data flows one way:
//!
//! ```text
//! Poller ──fetch──▶ StatsSnapshot ──aggregate──▶ ChartRenderer ─┐
//!        └─fetch──▶ [PredictionRecord] ──build_rows──▶ HistoryTable ─┴─▶ DashboardView::render
//! ```

pub mod aggregate;
pub mod charts;
pub mod history;
pub mod poller;
pub mod view;

pub use aggregate::{Aggregate, aggregate};
pub use charts::{ChartRenderer, Region};
pub use history::{HistoryRow, HistoryTable};
pub use poller::{CycleId, CycleReport, PanelOutcome, Poller};
pub use view::{Applied, DashboardView, ViewSettings};

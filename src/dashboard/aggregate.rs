//! Stats aggregation — turns a [`StatsSnapshot`] into chart inputs.
//!
//! Pure functions only: the same snapshot always yields the same
//! [`Aggregate`].

use crate::api::StatsSnapshot;

/// Number of hourly buckets.
pub const HOURS: usize = 24;

/// Default number of locations in the geographic ranking.
pub const DEFAULT_GEO_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Aggregate model
// ---------------------------------------------------------------------------

/// Normal vs. anomalous prediction counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Distribution {
    pub normal: u64,
    pub anomaly: u64,
}

impl Distribution {
    pub fn total(&self) -> u64 {
        self.normal + self.anomaly
    }

    /// Percentage for a given count, returns 0.0 if total is zero.
    pub fn pct(&self, count: u64) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total_predictions: u64,
    pub anomaly_count: u64,
    pub accuracy: f64,
}

impl Summary {
    /// Accuracy as a percentage with one decimal, e.g. `"87.5%"`.
    pub fn accuracy_display(&self) -> String {
        format!("{:.1}%", self.accuracy * 100.0)
    }
}

/// Everything the dashboard charts need from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub summary: Summary,
    pub distribution: Distribution,
    /// Login counts for hours 0..24, ascending.
    pub hourly: [u64; HOURS],
    /// Busiest locations, highest count first.
    pub geo_top: Vec<(String, u64)>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate a snapshot, keeping at most `geo_limit` locations.
pub fn aggregate(snapshot: &StatsSnapshot, geo_limit: usize) -> Aggregate {
    Aggregate {
        summary: Summary {
            total_predictions: snapshot.total_predictions,
            anomaly_count: snapshot.anomaly_count,
            accuracy: snapshot.accuracy,
        },
        distribution: Distribution {
            normal: snapshot.normal_count,
            anomaly: snapshot.anomaly_count,
        },
        hourly: hourly_counts(snapshot),
        geo_top: top_locations(snapshot, geo_limit),
    }
}

fn hourly_counts(snapshot: &StatsSnapshot) -> [u64; HOURS] {
    std::array::from_fn(|hour| snapshot.hour_count(hour))
}

/// Rank locations by count descending; equal counts keep label order.
fn top_locations(snapshot: &StatsSnapshot, limit: usize) -> Vec<(String, u64)> {
    let mut locations: Vec<(String, u64)> = snapshot
        .location_counts()
        .map(|(label, count)| (label.to_string(), count))
        .collect();

    // Stable sort over label-ordered input
    locations.sort_by(|a, b| b.1.cmp(&a.1));
    locations.truncate(limit);
    locations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

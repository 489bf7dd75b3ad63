//! Chart lifecycle and terminal drawing.
//!
//! [`ChartRenderer`] owns at most one [`ChartHandle`] per [`Region`].
//! Rendering into an occupied region tears the old handle down before the
//! new one is built, so a region never hosts two live charts.

use std::collections::BTreeMap;

use colored::Colorize;

use super::aggregate::{Distribution, HOURS};

/// Height of the hourly histogram in terminal rows.
const HISTOGRAM_ROWS: u64 = 8;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// 24-bit terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

pub const NORMAL_COLOR: Rgb = Rgb(0, 255, 157);
pub const ANOMALY_COLOR: Rgb = Rgb(255, 77, 77);
pub const HOURLY_COLOR: Rgb = Rgb(0, 243, 255);

/// Fixed palette for the location ranking, cycled by index.
pub const GEO_PALETTE: [Rgb; 5] = [
    Rgb(0, 243, 255),
    Rgb(255, 0, 200),
    Rgb(0, 255, 157),
    Rgb(255, 204, 0),
    Rgb(102, 51, 153),
];

const FALLBACK_COLOR: Rgb = Rgb(224, 224, 255);

pub(crate) fn paint(text: &str, rgb: Rgb, enabled: bool) -> String {
    if enabled {
        text.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Regions, kinds, data
// ---------------------------------------------------------------------------

/// A named display area hosting at most one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    AnomalyDistribution,
    HourlyActivity,
    GeoDistribution,
}

impl Region {
    pub const ALL: [Region; 3] = [
        Region::AnomalyDistribution,
        Region::HourlyActivity,
        Region::GeoDistribution,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::AnomalyDistribution => "anomaly-distribution",
            Self::HourlyActivity => "hourly-activity",
            Self::GeoDistribution => "geo-distribution",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::AnomalyDistribution => "Anomaly Distribution",
            Self::HourlyActivity => "Hourly Login Activity",
            Self::GeoDistribution => "Top Locations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Shares of a whole (stacked bar plus legend).
    Proportional,
    /// Ordered buckets drawn as vertical bars.
    Histogram,
}

/// Labelled series handed to [`ChartRenderer::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartData {
    /// Normal/anomaly split.
    pub fn distribution(dist: &Distribution) -> Self {
        Self {
            labels: vec!["Normal".to_string(), "Anomaly".to_string()],
            values: vec![dist.normal, dist.anomaly],
        }
    }

    /// 24 hourly buckets labelled `0`..`23`.
    pub fn hourly(counts: &[u64; HOURS]) -> Self {
        Self {
            labels: (0..HOURS).map(|h| h.to_string()).collect(),
            values: counts.to_vec(),
        }
    }

    /// Ranked (label, count) pairs.
    pub fn ranking(entries: &[(String, u64)]) -> Self {
        Self {
            labels: entries.iter().map(|(label, _)| label.clone()).collect(),
            values: entries.iter().map(|(_, count)| *count).collect(),
        }
    }
}

/// Presentation knobs for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Series colors, assigned by index and cycled.
    pub palette: Vec<Rgb>,
    /// Bar width in cells for proportional charts.
    pub width: usize,
    /// Emit ANSI colors when drawing.
    pub color: bool,
}

impl StyleConfig {
    pub fn new(palette: &[Rgb], width: usize, color: bool) -> Self {
        Self {
            palette: palette.to_vec(),
            width: width.max(1),
            color,
        }
    }

    fn color_at(&self, index: usize) -> Rgb {
        if self.palette.is_empty() {
            FALLBACK_COLOR
        } else {
            self.palette[index % self.palette.len()]
        }
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// One live chart. Created and destroyed only by [`ChartRenderer`].
#[derive(Debug)]
pub struct ChartHandle {
    id: u64,
    kind: ChartKind,
    labels: Vec<String>,
    values: Vec<u64>,
    colors: Vec<Rgb>,
    width: usize,
    color: bool,
}

impl ChartHandle {
    /// Instance id, unique for the lifetime of the renderer.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    fn draw(&self) -> Vec<String> {
        match self.kind {
            ChartKind::Proportional => self.draw_proportional(),
            ChartKind::Histogram => self.draw_histogram(),
        }
    }

    fn draw_proportional(&self) -> Vec<String> {
        let total = self.total();
        let mut lines = Vec::new();

        let bar = if total == 0 {
            "░".repeat(self.width)
        } else {
            segment_widths(&self.values, self.width)
                .into_iter()
                .zip(&self.colors)
                .map(|(cells, &rgb)| paint(&"█".repeat(cells), rgb, self.color))
                .collect()
        };
        lines.push(format!("  [{bar}]"));

        if self.labels.is_empty() {
            lines.push("  (no data)".to_string());
            return lines;
        }

        for ((label, &value), &rgb) in self.labels.iter().zip(&self.values).zip(&self.colors) {
            let pct = if total == 0 {
                0.0
            } else {
                value as f64 / total as f64 * 100.0
            };
            lines.push(format!(
                "  {} {:<20} {:>8} {:>6.1}%",
                paint("●", rgb, self.color),
                truncate(label, 20),
                value,
                pct,
            ));
        }

        lines
    }

    fn draw_histogram(&self) -> Vec<String> {
        let max = self.values.iter().copied().max().unwrap_or(0);
        let rgb = self.colors.first().copied().unwrap_or(FALLBACK_COLOR);
        let mut lines = Vec::new();

        for row in (1..=HISTOGRAM_ROWS).rev() {
            let mut line = String::from("  ");
            for &value in &self.values {
                if scaled_height(value, max, HISTOGRAM_ROWS) >= row {
                    line.push_str(&paint("██", rgb, self.color));
                } else {
                    line.push_str("  ");
                }
                line.push(' ');
            }
            lines.push(line.trim_end().to_string());
        }

        lines.push(format!("  {}", "───".repeat(self.values.len())));
        let axis: String = self
            .labels
            .iter()
            .map(|label| format!("{:>2} ", truncate(label, 2)))
            .collect();
        lines.push(format!("  {}", axis.trim_end()));

        if max == 0 {
            lines.push("  no login attempts recorded".to_string());
        } else if let Some(peak) = self.values.iter().position(|&v| v == max) {
            let label = self.labels.get(peak).map(String::as_str).unwrap_or("?");
            lines.push(format!("  peak: {max} at {label}:00"));
        }

        lines
    }
}

/// Split `width` cells across `values` in proportion, summing exactly to
/// `width` when any value is non-zero (largest remainder first).
fn segment_widths(values: &[u64], width: usize) -> Vec<usize> {
    let total: u64 = values.iter().sum();
    if total == 0 {
        return vec![0; values.len()];
    }

    let exact: Vec<f64> = values
        .iter()
        .map(|&v| v as f64 / total as f64 * width as f64)
        .collect();
    let mut cells: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut remaining = width.saturating_sub(cells.iter().sum());
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = exact[a] - exact[a].floor();
        let frac_b = exact[b] - exact[b].floor();
        frac_b.total_cmp(&frac_a)
    });
    for index in order {
        if remaining == 0 {
            break;
        }
        if values[index] > 0 {
            cells[index] += 1;
            remaining -= 1;
        }
    }

    cells
}

/// Bar height in rows; any non-zero value gets at least one row.
fn scaled_height(value: u64, max: u64, rows: u64) -> u64 {
    if value == 0 || max == 0 {
        0
    } else {
        (value.saturating_mul(rows)).div_ceil(max).min(rows)
    }
}

/// Shorten `s` to `max_chars` characters, marking the cut with `…`.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Owner of every chart handle, keyed by region.
#[derive(Debug, Default)]
pub struct ChartRenderer {
    handles: BTreeMap<Region, ChartHandle>,
    next_id: u64,
    live: usize,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chart in `region` and return the new handle's id.
    ///
    /// Any existing handle is destroyed first. Colors are mapped by series
    /// index from `style.palette`.
    pub fn render(
        &mut self,
        region: Region,
        kind: ChartKind,
        data: ChartData,
        style: &StyleConfig,
    ) -> u64 {
        self.destroy(region);

        let ChartData { labels, mut values } = data;
        values.resize(labels.len(), 0);
        let colors = (0..labels.len()).map(|i| style.color_at(i)).collect();

        self.next_id += 1;
        let handle = ChartHandle {
            id: self.next_id,
            kind,
            labels,
            values,
            colors,
            width: style.width,
            color: style.color,
        };
        self.handles.insert(region, handle);
        self.live += 1;

        self.next_id
    }

    /// Tear down the chart in `region`. Returns `false` if it was empty.
    pub fn destroy(&mut self, region: Region) -> bool {
        match self.handles.remove(&region) {
            Some(_) => {
                self.live -= 1;
                true
            }
            None => false,
        }
    }

    pub fn handle(&self, region: Region) -> Option<&ChartHandle> {
        self.handles.get(&region)
    }

    /// Number of live chart instances across all regions.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Terminal lines for the chart in `region`, or an empty vec.
    pub fn draw(&self, region: Region) -> Vec<String> {
        self.handles
            .get(&region)
            .map(ChartHandle::draw)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

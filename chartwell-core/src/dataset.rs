//! Render-ready chart datasets.
//!
//! Nothing here depends on a chart library: the renderer receives plain label
//! strings, nullable numbers and color strings.

use chartwell_types::TimeRange;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One symbol projected onto the shared axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    /// Ticker symbol.
    pub symbol: String,
    /// Watchlist position, used for color assignment.
    pub position: usize,
    /// One value per axis slot; `None` marks a gap.
    pub values: Vec<Option<f64>>,
}

/// Selected symbols aligned on one axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignedDataset {
    /// Strictly increasing bucket instants.
    pub axis: Vec<DateTime<Utc>>,
    /// Aligned series in watchlist order.
    pub series: Vec<AlignedSeries>,
}

impl AlignedDataset {
    /// Raw axis instants for tooltip display (identical to `axis`).
    #[must_use]
    pub fn raw_axis(&self) -> &[DateTime<Utc>] {
        &self.axis
    }
}

/// One line of the chart as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDataset {
    /// Ticker symbol.
    pub symbol: String,
    /// `values[i]` belongs to `labels[i]`; `null` means no data.
    pub values: Vec<Option<f64>>,
    /// Stable `#rrggbb` color.
    pub color: String,
}

/// Output contract with the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    /// Axis labels formatted for the range.
    pub labels: Vec<String>,
    /// One dataset per selected symbol.
    pub datasets: Vec<SeriesDataset>,
    /// Unformatted axis instants for tooltips.
    #[serde(rename = "rawAxis")]
    pub raw_axis: Vec<DateTime<Utc>>,
}

impl ChartData {
    /// `true` for the "nothing to show" state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.datasets.is_empty()
    }
}

const fn label_format(range: TimeRange) -> &'static str {
    match range {
        TimeRange::D1 => "%H:%M",
        TimeRange::D7 => "%a %H:00",
        TimeRange::D30 | TimeRange::Y1 => "%b %-d",
        TimeRange::Y5 => "%b %Y",
    }
}

/// Format an axis instant for `range` in the display timezone.
///
/// ```
/// use chartwell_core::dataset::format_label;
/// use chartwell_core::TimeRange;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
/// let tz = chrono_tz::UTC;
/// assert_eq!(format_label(ts, TimeRange::D1, tz), "14:30");
/// assert_eq!(format_label(ts, TimeRange::D7, tz), "Tue 14:00");
/// assert_eq!(format_label(ts, TimeRange::D30, tz), "Mar 5");
/// assert_eq!(format_label(ts, TimeRange::Y5, tz), "Mar 2024");
/// ```
#[must_use]
pub fn format_label(ts: DateTime<Utc>, range: TimeRange, tz: Tz) -> String {
    ts.with_timezone(&tz)
        .format(label_format(range))
        .to_string()
}

fn hsv_to_hex(hue: f64, saturation: f64, value: f64) -> String {
    let c = value * saturation;
    let h = (hue.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h {
        h if h < 1.0 => (c, x, 0.0),
        h if h < 2.0 => (x, c, 0.0),
        h if h < 3.0 => (0.0, c, x),
        h if h < 4.0 => (0.0, x, c),
        h if h < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let channel = |v: f64| -> u8 {
        // Bounded to [0, 255] before the cast.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        byte
    };
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Color for a watchlist position.
///
/// Positions inside `palette` take its entry; later positions get hues spaced by
/// the golden angle.
#[must_use]
pub fn color_for_position(position: usize, palette: &[String]) -> String {
    if let Some(c) = palette.get(position) {
        return c.clone();
    }
    const GOLDEN_ANGLE: f64 = 137.507_764;
    let k = position - palette.len();
    #[allow(clippy::cast_precision_loss)]
    let hue = (k as f64).mul_add(GOLDEN_ANGLE, 17.0);
    hsv_to_hex(hue, 0.65, 0.88)
}

/// Turn an aligned dataset into the renderer contract.
#[must_use]
pub fn build_chart_data(
    aligned: &AlignedDataset,
    range: TimeRange,
    tz: Tz,
    palette: &[String],
) -> ChartData {
    ChartData {
        labels: aligned
            .axis
            .iter()
            .map(|ts| format_label(*ts, range, tz))
            .collect(),
        datasets: aligned
            .series
            .iter()
            .map(|s| SeriesDataset {
                symbol: s.symbol.clone(),
                values: s.values.clone(),
                color: color_for_position(s.position, palette),
            })
            .collect(),
        raw_axis: aligned.raw_axis().to_vec(),
    }
}

//! Point and series model consumed by the alignment engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a price point is an intraday tick or an end-of-day close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// End-of-day close.
    Daily,
    /// Intraday tick.
    Intraday,
}

/// A single observed price. Immutable once fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Observation instant.
    pub ts: DateTime<Utc>,
    /// Observed price.
    pub price: f64,
    /// Granularity tag attached at ingestion.
    pub granularity: Granularity,
}

impl Point {
    /// Build a daily close.
    #[must_use]
    pub const fn daily(ts: DateTime<Utc>, price: f64) -> Self {
        Self {
            ts,
            price,
            granularity: Granularity::Daily,
        }
    }

    /// Build an intraday tick.
    #[must_use]
    pub const fn intraday(ts: DateTime<Utc>, price: f64) -> Self {
        Self {
            ts,
            price,
            granularity: Granularity::Intraday,
        }
    }

    /// `true` when the price can be charted (finite).
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.price.is_finite()
    }
}

/// Price history of one symbol. Replaced wholesale on refresh.
///
/// Points are not required to be sorted; the engine sorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    /// Ticker symbol.
    pub symbol: String,
    /// Observed points in arbitrary order.
    pub points: Vec<Point>,
}

impl SymbolSeries {
    /// Build a series from a symbol and its points.
    pub fn new(symbol: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// A symbol with no history at all.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }
}

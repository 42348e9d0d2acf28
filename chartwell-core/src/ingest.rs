//! Conversion of fetched history records into tagged points.
//!
//! Granularity is decided here, once. Downstream stages read the tag and never
//! look at the original date string again.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::model::{Granularity, Point, SymbolSeries};
use crate::timeseries::util::local_to_utc;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M%:z"];

/// One history record as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// ISO date, optionally with a time component.
    pub date: String,
    /// Price; `None` when the backend sent `null` or omitted it.
    #[serde(default)]
    pub price: Option<f64>,
    /// Explicit granularity flag; overrides inference from `date` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_intraday: Option<bool>,
}

impl RawRecord {
    /// Build a record without an explicit granularity flag.
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self {
            date: date.into(),
            price: Some(price),
            is_intraday: None,
        }
    }
}

/// Result of ingesting one symbol's records.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    /// Parsed, tagged series in input order.
    pub series: SymbolSeries,
    /// Records dropped for an unparsable date or a missing/non-finite price.
    pub dropped: usize,
}

/// Parse a record date. Returns the instant and whether a time component was present.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS[.f]]` (space or `T` separator) and
/// RFC 3339 with an offset. Values without an offset are read as wall-clock time
/// in `tz`; date-only values map to local midnight.
#[must_use]
pub fn parse_record_date(date: &str, tz: Tz) -> Option<(DateTime<Utc>, bool)> {
    let s = date.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some((dt.with_timezone(&Utc), true));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some((dt.with_timezone(&Utc), true));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some((local_to_utc(naive, tz), true));
        }
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some((local_to_utc(day.and_hms_opt(0, 0, 0)?, tz), false))
}

/// Convert one record to a point, or `None` if it is malformed.
#[must_use]
pub fn point_from_record(record: &RawRecord, tz: Tz) -> Option<Point> {
    let price = record.price.filter(|p| p.is_finite())?;
    let (ts, has_time) = parse_record_date(&record.date, tz)?;
    let granularity = if record.is_intraday.unwrap_or(has_time) {
        Granularity::Intraday
    } else {
        Granularity::Daily
    };
    Some(Point {
        ts,
        price,
        granularity,
    })
}

/// Ingest a symbol's fetched records, dropping and counting malformed ones.
#[must_use]
pub fn ingest_records(symbol: &str, records: &[RawRecord], tz: Tz) -> Ingested {
    let mut points = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for r in records {
        if let Some(p) = point_from_record(r, tz) {
            points.push(p);
        } else {
            dropped += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(symbol, date = %r.date, "dropping malformed history record");
        }
    }
    Ingested {
        series: SymbolSeries::new(symbol, points),
        dropped,
    }
}

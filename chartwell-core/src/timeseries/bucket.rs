use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::model::{Granularity, Point};
use crate::policy::{BucketUnit, GranularityPreference, RangePolicy};
use crate::timeseries::util::{local_to_utc, truncated_local_to_utc};

/// A point retained as the representative of its bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketedPoint {
    /// Start instant of the bucket; this is the point's position on the chart axis.
    pub slot: DateTime<Utc>,
    /// The representative point.
    pub point: Point,
}

/// Result of bucketing one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketOutcome {
    /// One point per distinct bucket, ascending by slot.
    pub points: Vec<BucketedPoint>,
    /// `true` when a 1D chart had too few intraday points and fell back to all
    /// cutoff-surviving points.
    pub intraday_fallback: bool,
}

fn floor_utc(ts: DateTime<Utc>, step: i64) -> Option<DateTime<Utc>> {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(step), 0)
}

/// Start instant of the calendar bucket containing `ts`, in wall-clock time of `tz`.
#[must_use]
pub fn bucket_start(ts: DateTime<Utc>, unit: BucketUnit, tz: Tz) -> Option<DateTime<Utc>> {
    let local = ts.with_timezone(&tz).naive_local();
    match unit {
        BucketUnit::Day => {
            let midnight = local.date().and_time(NaiveTime::MIN);
            Some(local_to_utc(midnight, tz))
        }
        BucketUnit::Hour => {
            let truncated = local.date().and_hms_opt(local.hour(), 0, 0)?;
            truncated_local_to_utc(truncated, ts, tz).or_else(|| floor_utc(ts, 3_600))
        }
        BucketUnit::Minute => {
            let truncated = local.date().and_hms_opt(local.hour(), local.minute(), 0)?;
            truncated_local_to_utc(truncated, ts, tz).or_else(|| floor_utc(ts, 60))
        }
    }
}

/// Whether `candidate` should replace `current` as a bucket's representative.
///
/// Input is sorted ascending, so a later candidate is never older than `current`;
/// equal timestamps resolve to the later point.
const fn replaces(current: &Point, candidate: &Point, preference: GranularityPreference) -> bool {
    match preference {
        GranularityPreference::IntradayOnly | GranularityPreference::MostRecent => true,
        GranularityPreference::Daily => !matches!(
            (current.granularity, candidate.granularity),
            (Granularity::Daily, Granularity::Intraday)
        ),
    }
}

/// Group sorted, cutoff-filtered points into buckets and keep one point per bucket.
///
/// `intraday_threshold` only matters for [`GranularityPreference::IntradayOnly`]:
/// when fewer intraday points than this survive, every input point is used.
#[must_use]
pub fn bucketize(
    points: &[Point],
    policy: &RangePolicy,
    tz: Tz,
    intraday_threshold: usize,
) -> BucketOutcome {
    let mut intraday_fallback = false;
    let intraday_only: Vec<Point>;
    let source: &[Point] = if policy.preference == GranularityPreference::IntradayOnly {
        intraday_only = points
            .iter()
            .filter(|p| p.granularity == Granularity::Intraday)
            .copied()
            .collect();
        if intraday_only.len() < intraday_threshold && intraday_only.len() < points.len() {
            intraday_fallback = true;
            points
        } else {
            &intraday_only
        }
    } else {
        points
    };

    let mut buckets: BTreeMap<DateTime<Utc>, Point> = BTreeMap::new();
    for p in source {
        let Some(slot) = bucket_start(p.ts, policy.bucket, tz) else {
            continue;
        };
        match buckets.entry(slot) {
            Entry::Vacant(v) => {
                v.insert(*p);
            }
            Entry::Occupied(mut o) => {
                if replaces(o.get(), p, policy.preference) {
                    o.insert(*p);
                }
            }
        }
    }

    BucketOutcome {
        points: buckets
            .into_iter()
            .map(|(slot, point)| BucketedPoint { slot, point })
            .collect(),
        intraday_fallback,
    }
}

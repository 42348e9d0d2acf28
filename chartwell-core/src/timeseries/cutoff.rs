use chrono::{DateTime, TimeDelta, Utc};

use crate::model::Point;

/// Points surviving the cutoff, plus how many malformed points were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CutoffOutcome {
    /// Well-formed points with `ts >= now - cutoff`, ascending by timestamp.
    pub points: Vec<Point>,
    /// Points dropped for a non-finite price.
    pub malformed: usize,
}

/// Earliest instant a point may carry and still be retained.
///
/// Saturates at the earliest representable instant when `cutoff` reaches past it.
#[must_use]
pub fn cutoff_threshold(now: DateTime<Utc>, cutoff: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(cutoff)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Sort points ascending (stable) and drop those older than `now - cutoff`.
///
/// Malformed points are counted and removed first. Empty input, or input that is
/// entirely excluded, yields an empty result.
#[must_use]
pub fn apply_cutoff(points: &[Point], cutoff: TimeDelta, now: DateTime<Utc>) -> CutoffOutcome {
    let threshold = cutoff_threshold(now, cutoff);
    let mut kept: Vec<Point> = Vec::with_capacity(points.len());
    let mut malformed = 0usize;
    for p in points {
        if p.is_well_formed() {
            kept.push(*p);
        } else {
            malformed += 1;
        }
    }
    kept.sort_by_key(|p| p.ts);
    let start = kept.partition_point(|p| p.ts < threshold);
    kept.drain(..start);
    CutoffOutcome {
        points: kept,
        malformed,
    }
}

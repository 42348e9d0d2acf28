//! Timezone helpers shared by ingestion and bucketing.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve a wall-clock time in `tz` to a UTC instant.
///
/// Ambiguous times (DST fall-back) take the earlier mapping. Times inside a
/// DST gap are moved forward by one hour; if that still fails the wall-clock
/// value is read as UTC.
#[must_use]
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive
                .checked_add_signed(TimeDelta::hours(1))
                .map(|n| tz.from_local_datetime(&n));
            match shifted {
                Some(LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _)) => {
                    dt.with_timezone(&Utc)
                }
                _ => naive.and_utc(),
            }
        }
    }
}

/// Resolve a truncated wall-clock time back to UTC, choosing the ambiguous
/// mapping whose offset matches `original`.
///
/// Keeps the two occurrences of a repeated hour in distinct buckets.
pub(crate) fn truncated_local_to_utc(
    truncated: NaiveDateTime,
    original: DateTime<Utc>,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    use chrono::Offset;

    match tz.from_local_datetime(&truncated) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt1, dt2) => {
            let local_offset = original
                .with_timezone(&tz)
                .offset()
                .fix()
                .local_minus_utc();
            if dt1.offset().fix().local_minus_utc() == local_offset {
                Some(dt1.with_timezone(&Utc))
            } else {
                Some(dt2.with_timezone(&Utc))
            }
        }
        LocalResult::None => None,
    }
}

use chrono::{DateTime, Utc};

use crate::timeseries::bucket::BucketedPoint;

/// Map one symbol's bucketed points onto the shared axis.
///
/// Emits the point's price where the symbol has a point in that slot and `None`
/// (no data) elsewhere. The result always has `axis.len()` entries. Both inputs
/// must be ascending; slots missing from the axis are skipped.
#[must_use]
pub fn align_to_axis(axis: &[DateTime<Utc>], points: &[BucketedPoint]) -> Vec<Option<f64>> {
    let mut out: Vec<Option<f64>> = Vec::with_capacity(axis.len());
    let mut cursor = points.iter().peekable();
    for slot in axis {
        while cursor.next_if(|bp| bp.slot < *slot).is_some() {}
        match cursor.peek() {
            Some(bp) if bp.slot == *slot => {
                out.push(Some(bp.point.price));
                cursor.next();
            }
            _ => out.push(None),
        }
    }
    out
}

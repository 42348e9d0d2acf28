use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::timeseries::bucket::BucketedPoint;

/// Shared chart axis: the union of every series' bucket slots, ascending and unique.
///
/// Symbols with sparser coverage still share this axis; gaps are filled by the
/// aligner. No series (or only empty ones) gives an empty axis.
pub fn build_axis<'a, I>(series: I) -> Vec<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a [BucketedPoint]>,
{
    let mut slots: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    for s in series {
        slots.extend(s.iter().map(|bp| bp.slot));
    }
    slots.into_iter().collect()
}

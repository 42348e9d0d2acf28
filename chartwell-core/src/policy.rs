//! Per-range policy table.

use chartwell_types::{PolicyOverride, TimeRange};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Calendar unit points are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketUnit {
    /// Wall-clock minute.
    Minute,
    /// Wall-clock hour.
    Hour,
    /// Calendar day.
    Day,
}

/// Which point represents a bucket when several collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GranularityPreference {
    /// Only intraday points, unless too few survive (then everything).
    /// Collisions keep the most recent point.
    IntradayOnly,
    /// The most recent point wins regardless of its tag.
    MostRecent,
    /// A daily close wins; otherwise the most recent intraday point.
    Daily,
}

/// Static policy applied to every symbol for one `TimeRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePolicy {
    /// Maximum age of a retained point relative to "now".
    pub cutoff: TimeDelta,
    /// Tie-break rule inside a bucket.
    pub preference: GranularityPreference,
    /// Grouping unit.
    pub bucket: BucketUnit,
    /// Maximum number of points per symbol after downsampling.
    pub point_budget: usize,
}

impl RangePolicy {
    /// The built-in policy row for `range`.
    ///
    /// 1D keeps every intraday tick apart from same-minute duplicates: points
    /// are grouped by clock minute and the most recent one in a minute wins.
    ///
    /// 7D and 30D budgets are one above the nominal count: a rolling window
    /// can touch 169 clock hours or 31 calendar days.
    #[must_use]
    pub fn for_range(range: TimeRange) -> Self {
        match range {
            TimeRange::D1 => Self {
                cutoff: TimeDelta::hours(24),
                preference: GranularityPreference::IntradayOnly,
                bucket: BucketUnit::Minute,
                point_budget: 390,
            },
            TimeRange::D7 => Self {
                cutoff: TimeDelta::days(7),
                preference: GranularityPreference::MostRecent,
                bucket: BucketUnit::Hour,
                point_budget: 169,
            },
            TimeRange::D30 => Self {
                cutoff: TimeDelta::days(30),
                preference: GranularityPreference::Daily,
                bucket: BucketUnit::Day,
                point_budget: 31,
            },
            TimeRange::Y1 => Self {
                cutoff: TimeDelta::days(365),
                preference: GranularityPreference::Daily,
                bucket: BucketUnit::Day,
                point_budget: 260,
            },
            TimeRange::Y5 => Self {
                cutoff: TimeDelta::days(5 * 365),
                preference: GranularityPreference::Daily,
                bucket: BucketUnit::Day,
                point_budget: 260,
            },
        }
    }

    /// The policy row for `range` with the first matching override applied.
    #[must_use]
    pub fn with_overrides(range: TimeRange, overrides: &[PolicyOverride]) -> Self {
        let mut policy = Self::for_range(range);
        if let Some(o) = overrides.iter().find(|o| o.range == range) {
            if let Some(secs) = o.cutoff_secs {
                policy.cutoff = i64::try_from(secs)
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .unwrap_or(TimeDelta::MAX);
            }
            if let Some(budget) = o.point_budget {
                policy.point_budget = budget;
            }
        }
        policy
    }
}

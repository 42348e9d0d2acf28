//! The chart time range selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChartwellError;

/// Time range selectable on a price chart. Drives every downstream policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    /// Last 24 hours, intraday ticks.
    #[serde(rename = "1D")]
    D1,
    /// Last 7 days, hourly buckets.
    #[serde(rename = "7D")]
    D7,
    /// Last 30 days, daily buckets.
    #[serde(rename = "30D")]
    D30,
    /// Last year, daily buckets.
    #[serde(rename = "1Y")]
    Y1,
    /// Last five years, daily buckets stride-sampled to the budget.
    #[serde(rename = "5Y")]
    Y5,
}

impl TimeRange {
    /// Every range in ascending span order.
    pub const ALL: [Self; 5] = [Self::D1, Self::D7, Self::D30, Self::Y1, Self::Y5];

    /// Short wire name (`"1D"`, `"7D"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::D1 => "1D",
            Self::D7 => "7D",
            Self::D30 => "30D",
            Self::Y1 => "1Y",
            Self::Y5 => "5Y",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ChartwellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChartwellError::InvalidArg(format!("unknown time range '{s}'")))
    }
}

//! Configuration types shared by the engine and the supply layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ChartwellError, TimeRange};

/// Colors handed out to watchlist positions before the generated hues take over.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

/// Adjustment of one row of the range policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverride {
    /// Range whose policy row is adjusted.
    pub range: TimeRange,
    /// Replacement cutoff age in seconds.
    #[serde(default)]
    pub cutoff_secs: Option<u64>,
    /// Replacement maximum number of points per symbol.
    #[serde(default)]
    pub point_budget: Option<usize>,
}

/// Settings of the alignment engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA timezone used for calendar buckets and axis labels.
    pub timezone: String,
    /// Minimum number of intraday points a 1D chart needs before it stops
    /// falling back to every cutoff-surviving point.
    pub intraday_fallback_threshold: usize,
    /// Colors assigned by watchlist position.
    pub palette: Vec<String>,
    /// Per-range adjustments of the policy table.
    pub policy_overrides: Vec<PolicyOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            intraday_fallback_threshold: 10,
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            policy_overrides: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Check that the configuration is internally consistent.
    ///
    /// # Errors
    /// Returns `InvalidArg` if a range is overridden twice or an override sets a
    /// zero cutoff.
    pub fn validate(&self) -> Result<(), ChartwellError> {
        let mut seen: Vec<TimeRange> = Vec::new();
        for o in &self.policy_overrides {
            if seen.contains(&o.range) {
                return Err(ChartwellError::InvalidArg(format!(
                    "duplicate policy override for {}",
                    o.range
                )));
            }
            if o.cutoff_secs == Some(0) {
                return Err(ChartwellError::InvalidArg(format!(
                    "zero cutoff for {}",
                    o.range
                )));
            }
            seen.push(o.range);
        }
        Ok(())
    }
}

/// Recurring refresh of watchlist history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Base delay between refresh cycles.
    pub interval: Duration,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
    /// Timeout for a single symbol's history fetch.
    pub fetch_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            jitter_percent: 10,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

/// Bounds of the memoized chart cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of memoized chart results.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 64 }
    }
}

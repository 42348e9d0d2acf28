//! The alignment engine: a pure function from watchlist history, range and
//! selection to a render-ready chart.

use std::collections::HashSet;

use chartwell_types::{ChartwellError, EngineConfig, PolicyOverride, TimeRange};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dataset::{AlignedDataset, AlignedSeries, ChartData, build_chart_data};
use crate::model::SymbolSeries;
use crate::policy::RangePolicy;
use crate::timeseries::align::align_to_axis;
use crate::timeseries::axis::build_axis;
use crate::timeseries::bucket::{BucketedPoint, bucketize};
use crate::timeseries::cutoff::apply_cutoff;
use crate::timeseries::downsample::downsample_stride;

/// Per-symbol counts through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolDiagnostics {
    /// Ticker symbol.
    pub symbol: String,
    /// Points handed to the engine.
    pub input_points: usize,
    /// Points dropped for a non-finite price.
    pub malformed: usize,
    /// Points left after the cutoff filter.
    pub after_cutoff: usize,
    /// Points left after bucketing.
    pub after_bucketing: usize,
    /// Points left after downsampling.
    pub after_downsampling: usize,
    /// Whether a 1D chart fell back to non-intraday points.
    pub intraday_fallback: bool,
}

/// Diagnostics of one engine run, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// One entry per selected symbol.
    pub symbols: Vec<SymbolDiagnostics>,
}

impl Diagnostics {
    /// Total malformed points dropped across all symbols.
    #[must_use]
    pub fn total_malformed(&self) -> usize {
        self.symbols.iter().map(|s| s.malformed).sum()
    }
}

/// A symbol after cutoff, bucketing and downsampling.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// Ticker symbol.
    pub symbol: String,
    /// At most `point_budget` bucketed points, ascending.
    pub points: Vec<BucketedPoint>,
    /// Counts through the pipeline.
    pub diagnostics: SymbolDiagnostics,
}

/// Full engine result: render contract plus diagnostics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartOutput {
    /// Data for the renderer.
    pub data: ChartData,
    /// Per-symbol pipeline counts.
    pub diagnostics: Diagnostics,
}

/// Time-series alignment and resampling engine.
///
/// Holds only immutable settings; every method is a pure function of its
/// arguments, so callers may memoize on `(series, range, selection, now)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    tz: Tz,
    intraday_threshold: usize,
    palette: Vec<String>,
    overrides: Vec<PolicyOverride>,
}

impl Default for Engine {
    fn default() -> Self {
        let cfg = EngineConfig::default();
        Self {
            tz: Tz::UTC,
            intraday_threshold: cfg.intraday_fallback_threshold,
            palette: cfg.palette,
            overrides: cfg.policy_overrides,
        }
    }
}

impl Engine {
    /// Build an engine from configuration.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the timezone is not a known IANA name or the
    /// policy overrides are inconsistent.
    pub fn new(cfg: &EngineConfig) -> Result<Self, ChartwellError> {
        cfg.validate()?;
        let tz: Tz = cfg.timezone.parse().map_err(|_| {
            ChartwellError::InvalidArg(format!("unknown timezone '{}'", cfg.timezone))
        })?;
        Ok(Self {
            tz,
            intraday_threshold: cfg.intraday_fallback_threshold,
            palette: cfg.palette.clone(),
            overrides: cfg.policy_overrides.clone(),
        })
    }

    /// Display timezone used for buckets and labels.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Effective policy for `range`, overrides applied.
    #[must_use]
    pub fn policy(&self, range: TimeRange) -> RangePolicy {
        RangePolicy::with_overrides(range, &self.overrides)
    }

    /// Run cutoff, bucketing and downsampling for one symbol.
    #[must_use]
    pub fn prepare(
        &self,
        series: &SymbolSeries,
        policy: &RangePolicy,
        now: DateTime<Utc>,
    ) -> PreparedSeries {
        let cut = apply_cutoff(&series.points, policy.cutoff, now);
        let bucketed = bucketize(&cut.points, policy, self.tz, self.intraday_threshold);
        let points = downsample_stride(&bucketed.points, policy.point_budget);

        #[cfg(feature = "tracing")]
        {
            if cut.malformed > 0 {
                tracing::warn!(symbol = %series.symbol, malformed = cut.malformed, "dropped malformed points");
            }
            if bucketed.intraday_fallback {
                tracing::debug!(symbol = %series.symbol, "too few intraday points; using all granularities");
            }
        }

        PreparedSeries {
            symbol: series.symbol.clone(),
            diagnostics: SymbolDiagnostics {
                symbol: series.symbol.clone(),
                input_points: series.points.len(),
                malformed: cut.malformed,
                after_cutoff: cut.points.len(),
                after_bucketing: bucketed.points.len(),
                after_downsampling: points.len(),
                intraday_fallback: bucketed.intraday_fallback,
            },
            points,
        }
    }

    /// Align the selected symbols on a shared axis.
    ///
    /// Datasets follow watchlist order. Selected symbols missing from the
    /// watchlist are treated as empty series placed after it, in selection order.
    /// An empty selection yields an empty dataset.
    #[must_use]
    pub fn align<S: AsRef<str>>(
        &self,
        watchlist: &[SymbolSeries],
        range: TimeRange,
        selected: &[S],
        now: DateTime<Utc>,
    ) -> (AlignedDataset, Diagnostics) {
        let policy = self.policy(range);
        let chosen = order_selection(watchlist, selected);

        let prepared: Vec<(usize, PreparedSeries)> = chosen
            .into_iter()
            .map(|(position, entry)| {
                let prepared = match entry {
                    Selected::Known(s) => self.prepare(s, &policy, now),
                    Selected::Unknown(symbol) => {
                        self.prepare(&SymbolSeries::empty(symbol), &policy, now)
                    }
                };
                (position, prepared)
            })
            .collect();

        let axis = build_axis(prepared.iter().map(|(_, p)| p.points.as_slice()));
        let mut series = Vec::with_capacity(prepared.len());
        let mut diagnostics = Diagnostics::default();
        for (position, p) in prepared {
            series.push(AlignedSeries {
                values: align_to_axis(&axis, &p.points),
                symbol: p.symbol,
                position,
            });
            diagnostics.symbols.push(p.diagnostics);
        }

        (AlignedDataset { axis, series }, diagnostics)
    }

    /// Compute the render-ready chart for the selected symbols.
    ///
    /// Total: malformed points are dropped and counted, empty series become
    /// all-`None` columns, and an empty selection gives an empty chart.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "chartwell_core::engine::compute",
            skip_all,
            fields(range = %range, watchlist = watchlist.len(), selected = selected.len()),
        )
    )]
    #[must_use]
    pub fn compute<S: AsRef<str>>(
        &self,
        watchlist: &[SymbolSeries],
        range: TimeRange,
        selected: &[S],
        now: DateTime<Utc>,
    ) -> ChartOutput {
        let (aligned, diagnostics) = self.align(watchlist, range, selected, now);
        ChartOutput {
            data: build_chart_data(&aligned, range, self.tz, &self.palette),
            diagnostics,
        }
    }
}

enum Selected<'a> {
    Known(&'a SymbolSeries),
    Unknown(&'a str),
}

fn order_selection<'a, S: AsRef<str>>(
    watchlist: &'a [SymbolSeries],
    selected: &'a [S],
) -> Vec<(usize, Selected<'a>)> {
    let wanted: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<(usize, Selected<'a>)> = Vec::new();

    for (position, s) in watchlist.iter().enumerate() {
        let sym = s.symbol.as_str();
        if wanted.contains(sym) && seen.insert(sym) {
            out.push((position, Selected::Known(s)));
        }
    }

    let mut next = watchlist.len();
    for sym in selected.iter().map(AsRef::as_ref) {
        if seen.insert(sym) {
            out.push((next, Selected::Unknown(sym)));
            next += 1;
        }
    }
    out
}

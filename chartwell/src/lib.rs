//! chartwell
//!
//! Multi-symbol price charts for a watchlist: history supply, periodic refresh,
//! and memoized chart data built by [`chartwell_core::Engine`].
//!
//! - [`HistorySource`]: pluggable backend returning raw history records.
//! - [`SeriesStore`]: latest good series per symbol, fetch de-duplication,
//!   generation counter.
//! - [`spawn_refresh`]: jittered background refresh with a stoppable handle.
//! - [`Dashboard`]: selection plus a chart memo keyed on
//!   `(generation, range, selection)`.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chartwell::{Dashboard, TimeRange};
//!
//! let dash = Dashboard::builder(Arc::new(my_source))
//!     .watchlist(["AAPL", "MSFT"])
//!     .build()?;
//! dash.refresh().await?;
//! let chart = dash.chart(TimeRange::D30).await;
//! println!("{} labels", chart.data.labels.len());
//! ```
#![warn(missing_docs)]

mod dashboard;
mod refresh;
mod source;
mod store;

pub use chartwell_core::{
    ChartData, ChartOutput, ChartwellError, Diagnostics, Engine, EngineConfig, Granularity,
    HistorySource, Point, PolicyOverride, RawRecord, SeriesDataset, SymbolDiagnostics,
    SymbolSeries, TimeRange,
};
pub use chartwell_types::{CacheConfig, RefreshConfig};
pub use dashboard::{Dashboard, DashboardBuilder};
pub use refresh::{RefreshHandle, jittered_delay, spawn_refresh};
pub use store::{Clock, FetchOutcome, RefreshReport, SeriesStore, Snapshot, normalize_symbol};

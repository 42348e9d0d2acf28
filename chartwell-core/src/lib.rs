//! chartwell-core
//!
//! Time-series alignment and resampling for multi-symbol price charts.
//!
//! - `model`: tagged price points and per-symbol series.
//! - `ingest`: conversion of fetched records into tagged points.
//! - `policy`: the per-range policy table.
//! - `timeseries`: cutoff, bucketing, downsampling, axis and alignment stages.
//! - `dataset`: labels, colors and the renderer contract.
//! - `source`: the history backend trait.
//! - `engine`: the pure entry point tying the stages together.
//!
//! ```
//! use chartwell_core::{Engine, Point, SymbolSeries, TimeRange};
//! use chrono::{TimeZone, Utc};
//!
//! let day = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
//! let aapl = SymbolSeries::new("AAPL", vec![Point::daily(day(1), 10.0), Point::daily(day(2), 11.0)]);
//! let msft = SymbolSeries::new("MSFT", vec![Point::daily(day(2), 20.0)]);
//!
//! let out = Engine::default().compute(&[aapl, msft], TimeRange::D30, &["AAPL", "MSFT"], day(10));
//! assert_eq!(out.data.labels, vec!["Jan 1", "Jan 2"]);
//! assert_eq!(out.data.datasets[1].values, vec![None, Some(20.0)]);
//! ```
#![warn(missing_docs)]

/// Render-ready datasets and label/color helpers.
pub mod dataset;
/// The alignment engine.
pub mod engine;
/// Record ingestion and granularity tagging.
pub mod ingest;
/// Point and series model.
pub mod model;
/// Per-range policy table.
pub mod policy;
/// History backend trait.
pub mod source;
/// Time-series pipeline stages.
pub mod timeseries;

pub use chartwell_types::{ChartwellError, EngineConfig, PolicyOverride, TimeRange};
pub use dataset::{AlignedDataset, AlignedSeries, ChartData, SeriesDataset};
pub use engine::{ChartOutput, Diagnostics, Engine, PreparedSeries, SymbolDiagnostics};
pub use ingest::{Ingested, RawRecord, ingest_records};
pub use model::{Granularity, Point, SymbolSeries};
pub use policy::{BucketUnit, GranularityPreference, RangePolicy};
pub use source::HistorySource;
pub use timeseries::bucket::BucketedPoint;

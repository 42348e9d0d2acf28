use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use chartwell_core::{ChartwellError, HistorySource, Ingested, SymbolSeries, ingest_records};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::source::history_with_timeout;

/// Wall clock used to stamp snapshots.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

type InflightFetch = Shared<BoxFuture<'static, Result<Ingested, ChartwellError>>>;
type InflightMap = std::sync::Mutex<HashMap<String, InflightFetch>>;

/// Releases a symbol's shared fetch when its caller finishes or is cancelled,
/// so the next fetch after a cancellation starts a fresh request.
struct InflightGuard<'a> {
    inflight: &'a InflightMap,
    symbol: &'a str,
    fut: InflightFetch,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        let mut map = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(self.symbol).is_some_and(|f| f.ptr_eq(&self.fut)) {
            map.remove(self.symbol);
        }
    }
}

/// Immutable view of the watchlist history at one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bumped on every series replacement and watchlist change.
    pub generation: u64,
    /// Time of the last series update; used as "now" for charts.
    pub as_of: DateTime<Utc>,
    /// One series per watchlist symbol, in watchlist order. Symbols that were
    /// never fetched successfully carry an empty series.
    pub series: Vec<SymbolSeries>,
}

impl Snapshot {
    /// Look up one symbol's series.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SymbolSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }
}

/// Result of refreshing every watchlist symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Store generation after the refresh.
    pub generation: u64,
    /// Symbols whose series was replaced.
    pub refreshed: Vec<String>,
    /// Failures; the affected symbols kept their last good series.
    pub warnings: Vec<ChartwellError>,
    /// Records dropped during ingestion across all refreshed symbols.
    pub dropped_records: usize,
}

impl RefreshReport {
    /// `true` when every fetch succeeded without dropping records.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.dropped_records == 0
    }
}

/// Outcome of one successful symbol fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Points now held for the symbol.
    pub points: usize,
    /// Records dropped during ingestion.
    pub dropped_records: usize,
    /// Store generation after the replacement.
    pub generation: u64,
}

struct StoreState {
    watchlist: Vec<String>,
    series: HashMap<String, SymbolSeries>,
    generation: u64,
    as_of: DateTime<Utc>,
}

impl StoreState {
    fn bump(&mut self, now: DateTime<Utc>) -> u64 {
        self.generation += 1;
        self.as_of = now;
        self.generation
    }
}

/// Watchlist history with fetch de-duplication and last-good retention.
///
/// Concurrent fetches of one symbol share a single backend request. A failed
/// fetch never clears what the store already holds.
pub struct SeriesStore {
    source: Arc<dyn HistorySource>,
    tz: Tz,
    fetch_timeout: Duration,
    clock: Clock,
    state: Mutex<StoreState>,
    inflight: InflightMap,
}

/// Normalize a ticker: trimmed and upper-cased.
///
/// # Errors
/// Returns `InvalidArg` for an empty symbol.
pub fn normalize_symbol(symbol: &str) -> Result<String, ChartwellError> {
    let s = symbol.trim();
    if s.is_empty() {
        return Err(ChartwellError::InvalidArg(
            "symbol cannot be empty".to_string(),
        ));
    }
    Ok(s.to_ascii_uppercase())
}

impl SeriesStore {
    /// Create an empty store reading from `source`.
    ///
    /// `tz` is the wall-clock zone used to read record dates without an offset.
    #[must_use]
    pub fn new(source: Arc<dyn HistorySource>, tz: Tz, fetch_timeout: Duration) -> Self {
        let clock: Clock = Arc::new(Utc::now);
        let as_of = clock();
        Self {
            source,
            tz,
            fetch_timeout,
            clock,
            state: Mutex::new(StoreState {
                watchlist: Vec::new(),
                series: HashMap::new(),
                generation: 0,
                as_of,
            }),
            inflight: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Replace the wall clock (fixed clocks make charts reproducible).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.state.get_mut().as_of = clock();
        self.clock = clock;
        self
    }

    /// Seed the watchlist.
    ///
    /// # Errors
    /// Returns `InvalidArg` for empty or duplicate symbols.
    pub fn with_watchlist<I, S>(mut self, symbols: I) -> Result<Self, ChartwellError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = self.state.get_mut();
        for s in symbols {
            let sym = normalize_symbol(s.as_ref())?;
            if state.watchlist.contains(&sym) {
                return Err(ChartwellError::InvalidArg(format!(
                    "duplicate watchlist symbol: {sym}"
                )));
            }
            state.watchlist.push(sym);
        }
        Ok(self)
    }

    /// Name of the underlying history source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Current watchlist, in order.
    pub async fn watchlist(&self) -> Vec<String> {
        self.state.lock().await.watchlist.clone()
    }

    /// Current generation.
    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    /// Generation and watchlist read under one lock.
    pub(crate) async fn versioned_watchlist(&self) -> (u64, Vec<String>) {
        let state = self.state.lock().await;
        (state.generation, state.watchlist.clone())
    }

    /// Append a symbol to the watchlist. Its history is empty until fetched.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the symbol is empty or already listed.
    pub async fn add_symbol(&self, symbol: &str) -> Result<String, ChartwellError> {
        let sym = normalize_symbol(symbol)?;
        let now = (self.clock)();
        let mut state = self.state.lock().await;
        if state.watchlist.contains(&sym) {
            return Err(ChartwellError::InvalidArg(format!(
                "{sym} is already on the watchlist"
            )));
        }
        state.watchlist.push(sym.clone());
        state.bump(now);
        Ok(sym)
    }

    /// Remove a symbol and its history.
    ///
    /// # Errors
    /// Returns `NotFound` if the symbol is not listed.
    pub async fn remove_symbol(&self, symbol: &str) -> Result<(), ChartwellError> {
        let sym = normalize_symbol(symbol)?;
        let now = (self.clock)();
        let mut state = self.state.lock().await;
        let Some(idx) = state.watchlist.iter().position(|s| *s == sym) else {
            return Err(ChartwellError::not_found(format!("watchlist symbol {sym}")));
        };
        state.watchlist.remove(idx);
        state.series.remove(&sym);
        state.bump(now);
        Ok(())
    }

    /// Immutable copy of the current state.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        let series = state
            .watchlist
            .iter()
            .map(|sym| {
                state
                    .series
                    .get(sym)
                    .cloned()
                    .unwrap_or_else(|| SymbolSeries::empty(sym.as_str()))
            })
            .collect();
        Snapshot {
            generation: state.generation,
            as_of: state.as_of,
            series,
        }
    }

    async fn join_fetch(&self, symbol: &str) -> Result<Ingested, ChartwellError> {
        let fut = {
            let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = inflight.get(symbol) {
                existing.clone()
            } else {
                let source = Arc::clone(&self.source);
                let sym = symbol.to_string();
                let tz = self.tz;
                let timeout = self.fetch_timeout;
                let fresh: InflightFetch = async move {
                    let records = history_with_timeout(source.as_ref(), &sym, timeout).await?;
                    Ok(ingest_records(&sym, &records, tz))
                }
                .boxed()
                .shared();
                inflight.insert(symbol.to_string(), fresh.clone());
                fresh
            }
        };

        let guard = InflightGuard {
            inflight: &self.inflight,
            symbol,
            fut,
        };
        guard.fut.clone().await
    }

    /// Fetch one watchlist symbol and replace its series on success.
    ///
    /// # Errors
    /// `NotFound` if the symbol is not on the watchlist; otherwise the source
    /// error or `FetchTimeout`. On error the previous series is kept.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "chartwell::store::fetch", skip(self))
    )]
    pub async fn fetch(&self, symbol: &str) -> Result<FetchOutcome, ChartwellError> {
        let sym = normalize_symbol(symbol)?;
        if !self.state.lock().await.watchlist.contains(&sym) {
            return Err(ChartwellError::not_found(format!("watchlist symbol {sym}")));
        }

        let ingested = match self.join_fetch(&sym).await {
            Ok(v) => v,
            Err(e) => {
                #[cfg(feature = "tracing")]
                {
                    let kept = self.state.lock().await.series.contains_key(&sym);
                    tracing::warn!(symbol = %sym, error = %e, kept_last_good = kept, "history fetch failed");
                }
                return Err(e);
            }
        };

        #[cfg(feature = "tracing")]
        {
            if ingested.dropped > 0 {
                tracing::warn!(symbol = %sym, dropped = ingested.dropped, "dropped malformed history records");
            }
        }

        let now = (self.clock)();
        let mut state = self.state.lock().await;
        // Removed while the fetch was in flight.
        if !state.watchlist.contains(&sym) {
            return Err(ChartwellError::not_found(format!("watchlist symbol {sym}")));
        }
        let points = ingested.series.points.len();
        state.series.insert(sym, ingested.series);
        let generation = state.bump(now);
        Ok(FetchOutcome {
            points,
            dropped_records: ingested.dropped,
            generation,
        })
    }

    /// Fetch every watchlist symbol concurrently.
    ///
    /// Symbols that fail keep their last good series and are reported as warnings.
    ///
    /// # Errors
    /// Returns `AllFetchesFailed` when the watchlist is non-empty and no fetch succeeded.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "chartwell::store::refresh_all", skip(self))
    )]
    pub async fn refresh_all(&self) -> Result<RefreshReport, ChartwellError> {
        let symbols = self.watchlist().await;
        let tasks = symbols.iter().map(|sym| async move {
            let res = self.fetch(sym).await;
            (sym.clone(), res)
        });
        let results = futures::future::join_all(tasks).await;

        let mut report = RefreshReport::default();
        for (sym, res) in results {
            match res {
                Ok(outcome) => {
                    report.refreshed.push(sym);
                    report.dropped_records += outcome.dropped_records;
                }
                Err(e) => report.warnings.push(e),
            }
        }

        if report.refreshed.is_empty() && !report.warnings.is_empty() {
            return Err(ChartwellError::AllFetchesFailed(report.warnings));
        }
        report.generation = self.generation().await;
        Ok(report)
    }
}

use std::sync::Arc;

use chartwell_core::{
    ChartOutput, ChartwellError, Engine, EngineConfig, HistorySource, TimeRange,
};
use chartwell_types::{CacheConfig, RefreshConfig};
use moka::sync::Cache;
use tokio::sync::Mutex;

use crate::refresh::{RefreshHandle, spawn_refresh};
use crate::store::{Clock, RefreshReport, SeriesStore, Snapshot, normalize_symbol};

/// Memo key. Watchlist symbols are kept in watchlist order, so reordering
/// them in the selection hits the same entry; symbols off the watchlist keep
/// selection order because it decides their placement and colors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChartKey {
    generation: u64,
    range: TimeRange,
    listed: Vec<String>,
    unlisted: Vec<String>,
}

impl ChartKey {
    fn new<W: AsRef<str>>(
        generation: u64,
        range: TimeRange,
        watchlist: &[W],
        selection: &[String],
    ) -> Self {
        let listed: Vec<String> = watchlist
            .iter()
            .map(AsRef::as_ref)
            .filter(|w| selection.iter().any(|s| s == w))
            .map(str::to_string)
            .collect();
        let unlisted = selection
            .iter()
            .filter(|s| !listed.contains(s))
            .cloned()
            .collect();
        Self {
            generation,
            range,
            listed,
            unlisted,
        }
    }
}

fn normalize_selection<I, S>(symbols: I) -> Result<Vec<String>, ChartwellError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for s in symbols {
        let sym = normalize_symbol(s.as_ref())?;
        if !out.contains(&sym) {
            out.push(sym);
        }
    }
    Ok(out)
}

/// Watchlist chart state: history store, selection and memoized chart output.
///
/// Charts are computed against the store snapshot time, so a chart only
/// changes when the data or the selection does.
pub struct Dashboard {
    store: Arc<SeriesStore>,
    engine: Engine,
    refresh_cfg: RefreshConfig,
    selection: Mutex<Vec<String>>,
    memo: Cache<ChartKey, Arc<ChartOutput>>,
}

impl Dashboard {
    /// Start building a dashboard over `source`.
    pub fn builder(source: Arc<dyn HistorySource>) -> DashboardBuilder {
        DashboardBuilder::new(source)
    }

    /// The underlying history store.
    #[must_use]
    pub const fn store(&self) -> &Arc<SeriesStore> {
        &self.store
    }

    /// The alignment engine.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Currently selected symbols, in the order they were selected.
    pub async fn selection(&self) -> Vec<String> {
        self.selection.lock().await.clone()
    }

    /// Replace the selection. Symbols need not be on the watchlist; unknown
    /// ones chart as empty columns.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty symbol.
    pub async fn select<I, S>(&self, symbols: I) -> Result<(), ChartwellError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = normalize_selection(symbols)?;
        *self.selection.lock().await = next;
        Ok(())
    }

    /// Flip one symbol's selection. Returns whether it is selected afterwards.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty symbol.
    pub async fn toggle(&self, symbol: &str) -> Result<bool, ChartwellError> {
        let sym = normalize_symbol(symbol)?;
        let mut sel = self.selection.lock().await;
        if let Some(idx) = sel.iter().position(|s| *s == sym) {
            sel.remove(idx);
            Ok(false)
        } else {
            sel.push(sym);
            Ok(true)
        }
    }

    /// Add a symbol to the watchlist, select it and fetch its history.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the symbol is empty or already listed. A failed
    /// fetch is returned too, but the symbol stays listed with an empty series.
    pub async fn add_symbol(&self, symbol: &str) -> Result<(), ChartwellError> {
        let sym = self.store.add_symbol(symbol).await?;
        {
            let mut sel = self.selection.lock().await;
            if !sel.contains(&sym) {
                sel.push(sym.clone());
            }
        }
        self.store.fetch(&sym).await.map(|_| ())
    }

    /// Remove a symbol from the watchlist and the selection.
    ///
    /// # Errors
    /// Returns `NotFound` if the symbol is not listed.
    pub async fn remove_symbol(&self, symbol: &str) -> Result<(), ChartwellError> {
        let sym = normalize_symbol(symbol)?;
        self.store.remove_symbol(&sym).await?;
        self.selection.lock().await.retain(|s| *s != sym);
        Ok(())
    }

    /// Refresh every watchlist symbol now.
    ///
    /// # Errors
    /// See [`SeriesStore::refresh_all`].
    pub async fn refresh(&self) -> Result<RefreshReport, ChartwellError> {
        self.store.refresh_all().await
    }

    /// Start the background refresh loop with the configured interval.
    #[must_use = "dropping the handle stops the refresh loop"]
    pub fn start_refresh(&self) -> RefreshHandle {
        spawn_refresh(Arc::clone(&self.store), &self.refresh_cfg)
    }

    /// Current store snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.store.snapshot().await
    }

    /// Chart for `range` over the current selection.
    ///
    /// Memoized on `(generation, range, selection)`; repeated calls without a
    /// data or selection change return the same `Arc`. Reordering watchlist
    /// symbols in the selection reuses the entry.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "chartwell::dashboard::chart", skip_all, fields(range = %range))
    )]
    pub async fn chart(&self, range: TimeRange) -> Arc<ChartOutput> {
        let selection = self.selection().await;
        let (generation, watchlist) = self.store.versioned_watchlist().await;
        let probe = ChartKey::new(generation, range, &watchlist, &selection);
        if let Some(hit) = self.memo.get(&probe) {
            return hit;
        }

        let snapshot = self.store.snapshot().await;
        let out = Arc::new(self.engine.compute(
            &snapshot.series,
            range,
            &selection,
            snapshot.as_of,
        ));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            generation = snapshot.generation,
            labels = out.data.labels.len(),
            malformed = out.diagnostics.total_malformed(),
            "computed chart"
        );

        let listed: Vec<&str> = snapshot.series.iter().map(|s| s.symbol.as_str()).collect();
        let key = ChartKey::new(snapshot.generation, range, &listed, &selection);
        self.memo.insert(key, Arc::clone(&out));
        out
    }

    /// Number of memoized charts currently held.
    #[must_use]
    pub fn cached_charts(&self) -> u64 {
        self.memo.run_pending_tasks();
        self.memo.entry_count()
    }
}

/// Builder for [`Dashboard`].
pub struct DashboardBuilder {
    source: Arc<dyn HistorySource>,
    engine_cfg: EngineConfig,
    refresh_cfg: RefreshConfig,
    cache_cfg: CacheConfig,
    watchlist: Vec<String>,
    selection: Option<Vec<String>>,
    clock: Option<Clock>,
}

impl DashboardBuilder {
    /// Defaults: UTC, built-in policy table, 30s refresh, 64 memoized charts,
    /// empty watchlist, everything selected.
    #[must_use]
    pub fn new(source: Arc<dyn HistorySource>) -> Self {
        Self {
            source,
            engine_cfg: EngineConfig::default(),
            refresh_cfg: RefreshConfig::default(),
            cache_cfg: CacheConfig::default(),
            watchlist: Vec::new(),
            selection: None,
            clock: None,
        }
    }

    /// Engine settings (timezone, palette, policy overrides).
    #[must_use]
    pub fn engine_config(mut self, cfg: EngineConfig) -> Self {
        self.engine_cfg = cfg;
        self
    }

    /// Refresh interval, jitter and fetch timeout.
    #[must_use]
    pub fn refresh_config(mut self, cfg: RefreshConfig) -> Self {
        self.refresh_cfg = cfg;
        self
    }

    /// Chart memo bounds.
    #[must_use]
    pub fn cache_config(mut self, cfg: CacheConfig) -> Self {
        self.cache_cfg = cfg;
        self
    }

    /// Initial watchlist, in display order.
    #[must_use]
    pub fn watchlist<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watchlist = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Initial selection. Defaults to the whole watchlist.
    #[must_use]
    pub fn select<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Wall clock used to stamp snapshots.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the settings and build the dashboard.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unknown timezone, inconsistent policy
    /// overrides, a zero refresh interval or fetch timeout, a jitter above
    /// 100%, or an empty or duplicate watchlist symbol.
    pub fn build(self) -> Result<Dashboard, ChartwellError> {
        let engine = Engine::new(&self.engine_cfg)?;

        if self.refresh_cfg.interval.is_zero() {
            return Err(ChartwellError::InvalidArg(
                "refresh interval must be non-zero".to_string(),
            ));
        }
        if self.refresh_cfg.fetch_timeout.is_zero() {
            return Err(ChartwellError::InvalidArg(
                "fetch timeout must be non-zero".to_string(),
            ));
        }
        if self.refresh_cfg.jitter_percent > 100 {
            return Err(ChartwellError::InvalidArg(format!(
                "jitter_percent must be within 0..=100, got {}",
                self.refresh_cfg.jitter_percent
            )));
        }

        let mut store = SeriesStore::new(
            self.source,
            engine.timezone(),
            self.refresh_cfg.fetch_timeout,
        );
        if let Some(clock) = self.clock {
            store = store.with_clock(clock);
        }
        let store = store.with_watchlist(&self.watchlist)?;

        let selection = match self.selection {
            Some(sel) => normalize_selection(&sel)?,
            None => normalize_selection(&self.watchlist)?,
        };

        Ok(Dashboard {
            store: Arc::new(store),
            engine,
            refresh_cfg: self.refresh_cfg,
            selection: Mutex::new(selection),
            memo: Cache::new(self.cache_cfg.max_entries),
        })
    }
}

use std::sync::Arc;
use std::time::Duration;

use chartwell_types::RefreshConfig;
use rand::Rng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::store::SeriesStore;

/// Base delay plus a random extra of up to `jitter_percent` of it.
#[must_use]
pub fn jittered_delay(base: Duration, jitter_percent: u8) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(
            1,
            base_ms.saturating_mul(u64::from(jitter_percent.min(100))) / 100,
        )
    };
    let mut rng = rand::rng();
    Duration::from_millis(base_ms.saturating_add(rng.random_range(0..jitter_range)))
}

/// Handle to a running refresh loop.
///
/// Dropping the handle signals the loop to stop and aborts it if it is still running.
pub struct RefreshHandle {
    join: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl RefreshHandle {
    /// Ask the loop to stop and wait for it to finish.
    ///
    /// A refresh already in progress completes first.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }

    /// `true` once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take()
            && !join.is_finished()
        {
            join.abort();
        }
    }
}

/// Refresh every watchlist symbol on a jittered interval until stopped.
///
/// The first cycle runs after one interval; callers wanting data immediately
/// call [`SeriesStore::refresh_all`] first. Failed cycles are logged and the
/// loop carries on.
#[must_use = "dropping the handle stops the refresh loop"]
pub fn spawn_refresh(store: Arc<SeriesStore>, cfg: &RefreshConfig) -> RefreshHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let interval = cfg.interval;
    let jitter_percent = cfg.jitter_percent;

    let join = tokio::spawn(async move {
        loop {
            let wait = jittered_delay(interval, jitter_percent);
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                () = tokio::time::sleep(wait) => {}
            }

            match store.refresh_all().await {
                Ok(_report) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        generation = _report.generation,
                        refreshed = _report.refreshed.len(),
                        warnings = _report.warnings.len(),
                        "refresh cycle finished"
                    );
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "refresh cycle failed; keeping last good data");
                }
            }
        }
    });

    RefreshHandle {
        join: Some(join),
        stop_tx: Some(stop_tx),
    }
}

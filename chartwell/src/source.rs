use std::time::Duration;

use chartwell_core::{ChartwellError, HistorySource, RawRecord};

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "chartwell::source::history_with_timeout",
        skip(source),
        fields(
            source_name = source.name(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )
)]
pub(crate) async fn history_with_timeout(
    source: &dyn HistorySource,
    symbol: &str,
    timeout: Duration,
) -> Result<Vec<RawRecord>, ChartwellError> {
    (tokio::time::timeout(timeout, source.history(symbol)).await)
        .unwrap_or_else(|_| Err(ChartwellError::fetch_timeout(source.name(), symbol)))
}

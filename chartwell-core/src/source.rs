use async_trait::async_trait;

use crate::ChartwellError;
use crate::ingest::RawRecord;

/// Backend that serves the price history of one symbol.
///
/// Implementations return every record they have; ingestion and range
/// cutoffs happen downstream.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Stable identifier used in errors and logs.
    fn name(&self) -> &'static str;

    /// Fetch the full history of `symbol`.
    ///
    /// # Errors
    /// `NotFound` for an unknown symbol; `Source` for backend failures.
    async fn history(&self, symbol: &str) -> Result<Vec<RawRecord>, ChartwellError>;
}

//! Deterministic history sources for tests and demos.
//!
//! [`MockSource`] serves generated fixtures for `AAPL`, `MSFT`, `GOOG` and
//! `TSLA`, ending on [`FIXTURE_AS_OF`]. `FAIL` always errors and `SLOW`
//! answers after a short delay. [`DynamicMockSource`] is driven per symbol from
//! a controller.
use std::time::Duration;

use async_trait::async_trait;
use chartwell_core::{ChartwellError, HistorySource, RawRecord};
use chrono::{DateTime, NaiveDate, Utc};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};

/// Instant the fixtures end at; use it as the clock for reproducible charts.
pub const FIXTURE_AS_OF: DateTime<Utc> = {
    let date = NaiveDate::from_ymd_opt(2024, 3, 28).expect("invalid date");
    let naive = date.and_hms_opt(20, 5, 0).expect("invalid time components");
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
};

/// Symbols with fixture history.
pub const FIXTURE_SYMBOLS: [&str; 4] = ["AAPL", "MSFT", "GOOG", "TSLA"];

/// Delay applied to the `SLOW` symbol.
pub const SLOW_DELAY: Duration = Duration::from_millis(200);

/// Mock history source with deterministic fixture data.
///
/// - `AAPL`: five years of weekday closes, hourly ticks over the prior four
///   sessions and five-minute ticks through the last one.
/// - `MSFT`: like `AAPL`, without Monday closes.
/// - `GOOG`: daily closes only.
/// - `TSLA`: like `AAPL`, plus three malformed records.
pub struct MockSource;

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn maybe_fail_or_slow(symbol: &str) -> Result<(), ChartwellError> {
        match symbol {
            "FAIL" => Err(ChartwellError::source(
                "chartwell-mock",
                "forced failure: history",
            )),
            "SLOW" => {
                tokio::time::sleep(SLOW_DELAY).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl HistorySource for MockSource {
    fn name(&self) -> &'static str {
        "chartwell-mock"
    }

    async fn history(&self, symbol: &str) -> Result<Vec<RawRecord>, ChartwellError> {
        Self::maybe_fail_or_slow(symbol).await?;
        let fixture = if symbol == "SLOW" { "AAPL" } else { symbol };
        fixtures::history::by_symbol(fixture)
            .ok_or_else(|| ChartwellError::not_found(format!("history for {symbol}")))
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chartwell_core::{ChartwellError, HistorySource, RawRecord};

/// Instruction for how `history` should behave for a given symbol.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return the provided records immediately.
    Return(Vec<RawRecord>),
    /// Return the provided records after a delay.
    Delay(Duration, Vec<RawRecord>),
    /// Fail immediately with the provided error.
    Fail(ChartwellError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<String, MockBehavior>,
    calls: HashMap<String, usize>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for `history` calls for a specific symbol.
    pub async fn set_behavior(&self, symbol: &str, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(symbol.to_string(), behavior);
    }

    /// Number of `history` calls seen for `symbol`.
    pub async fn calls(&self, symbol: &str) -> usize {
        let guard = self.state.lock().await;
        guard.calls.get(symbol).copied().unwrap_or_default()
    }

    /// Number of `history` calls across all symbols.
    pub async fn total_calls(&self) -> usize {
        let guard = self.state.lock().await;
        guard.calls.values().sum()
    }

    /// Clear all configured behaviors and call counts.
    pub async fn clear_all(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.calls.clear();
    }
}

/// A history source that defers all behavior to an external controller.
///
/// Symbols without a configured behavior fail with `NotFound`.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn HistorySource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn HistorySource>, controller)
    }
}

#[async_trait]
impl HistorySource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn history(&self, symbol: &str) -> Result<Vec<RawRecord>, ChartwellError> {
        // Snapshot the behavior without holding the lock across await points.
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(symbol.to_string()).or_default() += 1;
            guard.rules.get(symbol).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(records)) => Ok(records),
            Some(MockBehavior::Delay(wait, records)) => {
                tokio::time::sleep(wait).await;
                Ok(records)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(ChartwellError::not_found(format!("history for {symbol}"))),
        }
    }
}

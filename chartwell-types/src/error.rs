use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the chartwell workspace.
///
/// The alignment engine itself never fails; these errors come from the data
/// supply layer (fetching, watchlist management) and from configuration
/// validation.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChartwellError {
    /// Issues with the returned or expected data (missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A history source returned an error.
    #[error("{source_name} failed: {msg}")]
    Source {
        /// Name of the history source that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A symbol or resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "history for AAPL".
        what: String,
    },

    /// A single history fetch exceeded the configured timeout.
    #[error("fetch timed out: {symbol} via {source_name}")]
    FetchTimeout {
        /// Name of the history source that timed out.
        source_name: String,
        /// Symbol whose history was requested.
        symbol: String,
    },

    /// Every fetch of a refresh cycle failed; contains the individual failures.
    #[error("all fetches failed: {0:?}")]
    AllFetchesFailed(Vec<ChartwellError>),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl ChartwellError {
    /// Helper: build a `Source` error with the source name and message.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `FetchTimeout` error.
    pub fn fetch_timeout(source_name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::FetchTimeout {
            source_name: source_name.into(),
            symbol: symbol.into(),
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// A missing symbol is benign; aggregates are classified by their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::AllFetchesFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllFetchesFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllFetchesFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

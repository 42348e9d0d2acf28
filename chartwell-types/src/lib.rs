//! Chartwell error and configuration primitives shared across the workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod range;

pub use config::{CacheConfig, DEFAULT_PALETTE, EngineConfig, PolicyOverride, RefreshConfig};
pub use error::ChartwellError;
pub use range::TimeRange;

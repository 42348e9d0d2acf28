//! Time-series pipeline stages, applied in order.
//!
//! - `cutoff`: sort and drop points older than the range cutoff
//! - `bucket`: group into calendar buckets, one representative per bucket
//! - `downsample`: cap each series at the range's point budget
//! - `axis`: union of bucket slots across selected symbols
//! - `align`: project each symbol onto the shared axis
/// Shared axis construction.
pub mod axis;
/// Axis alignment with explicit gaps.
pub mod align;
/// Calendar bucketing and tie-break rules.
pub mod bucket;
/// Cutoff filtering.
pub mod cutoff;
/// Uniform-stride downsampling.
pub mod downsample;
/// Timezone helpers.
pub mod util;

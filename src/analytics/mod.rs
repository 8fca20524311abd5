//! Revenue time-series aggregation.
//!
//! Groups enriched trips into a daily revenue series, smooths it with a
//! trailing moving average, and selects the peak/trough days for annotation.

pub mod aggregate;
pub mod types;

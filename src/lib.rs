//! `trip_trends` library crate.
//!
//! The binary is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the store and chart backends stay swappable behind traits

pub mod analytics;
pub mod error;
pub mod features;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod trip;

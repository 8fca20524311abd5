//! Durable storage for trip records.
//!
//! The pipeline talks to the store through the [`TripStore`] trait so tests
//! can substitute a double; the production implementation is SQLite.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::PipelineError;
use crate::trip::{EnrichedTripRecord, TripRecord};

/// Sink/source contract for the destination table.
pub trait TripStore {
    /// Creates the raw trip schema. Idempotent: safe to call when the table
    /// already exists.
    fn create_schema(&mut self) -> Result<(), PipelineError>;

    /// Appends raw rows; never deletes prior content.
    fn bulk_insert(&mut self, trips: &[TripRecord]) -> Result<(), PipelineError>;

    /// Substitutes the destination's full content with the enriched rows.
    ///
    /// All-or-nothing: a failure partway through must leave the previous
    /// content fully intact for any reader.
    fn replace_table(&mut self, trips: &[EnrichedTripRecord]) -> Result<(), PipelineError>;
}

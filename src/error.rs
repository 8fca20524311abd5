//! Pipeline error kinds.

/// Errors that can abort a pipeline stage.
///
/// Per-field parse failures are deliberately *not* represented here: they are
/// coerced to null values in the loaded records and counted in the
/// [`LoadOutcome`](crate::loader::LoadOutcome) instead of aborting the batch.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required input column is missing from the source header, or the
    /// destination schema could not be created. Fatal before any data is
    /// written.
    #[error("schema error: {0}")]
    Schema(String),

    /// Persistence failed. The atomic replace guarantees the destination is
    /// never observable half-written.
    #[error("store write error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The source file could not be read as delimited text.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying I/O failure reading input or writing exports.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The rendering sink failed to produce the chart.
    #[error("render error: {0}")]
    Render(String),

    /// Report serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

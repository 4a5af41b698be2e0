//! Output sink trait and error types
//!
//! A sink accepts the sequence of extracted-page records produced by a
//! crawl and persists them. The coordinator is the only writer, so sinks
//! are written from one task at a time.

use crate::crawler::PageRecord;
use crate::output::stats::CrawlStats;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open output destination {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write record: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for extracted-page records
///
/// Opening the destination(s) happens at construction and is the only
/// run-fatal output failure; per-record write errors are surfaced to the
/// caller, which logs and counts them without stopping the crawl.
pub trait RecordSink: Send {
    /// Persists one record
    fn write(&mut self, record: &PageRecord) -> OutputResult<()>;

    /// Writes closing summaries and flushes all destinations
    fn finalize(&mut self, stats: &CrawlStats) -> OutputResult<()>;
}

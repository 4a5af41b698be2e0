//! Output module for persisting extracted-page records
//!
//! This module handles:
//! - The record sink trait the crawl core writes through
//! - Plain-text destinations reproducing the scrape-results file format
//! - Region-based routing to multiple destinations
//! - Crawl run statistics

mod router;
pub mod stats;
mod text;
mod traits;

pub use router::RegionRouter;
pub use stats::CrawlStats;
pub use text::TextSink;
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::{OutputConfig, OutputMode};
use std::path::Path;

/// Opens the configured sink for a run
///
/// Single mode opens one text destination; regions mode opens one per
/// region plus the unknown bucket. Open failures are run-fatal.
pub fn build_sink(config: &OutputConfig) -> OutputResult<Box<dyn RecordSink>> {
    match config.mode {
        OutputMode::Single => Ok(Box::new(TextSink::create(Path::new(&config.path))?)),
        OutputMode::Regions => Ok(Box::new(RegionRouter::create(config)?)),
    }
}

//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - URL de-duplication and frontier admission
//! - Request pacing and identity rotation
//! - HTTP fetching with retry logic
//! - HTML content extraction and link discovery
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fingerprint;
mod frontier;
mod pacing;

pub mod fetcher;

pub use coordinator::Coordinator;
pub use extractor::{extract_page, ExtractedPage};
pub use fetcher::{build_http_client, fetch_page, FetchPolicy, FetchResult};
pub use fingerprint::FingerprintStore;
pub use frontier::{Frontier, Rejection, WorkItem};
pub use pacing::{Identity, PaceController};

use crate::config::Config;
use crate::output::{build_sink, CrawlStats};
use crate::LoomError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One extracted page, as handed to the output sink
///
/// Immutable once produced; emitted exactly once per successfully parsed
/// page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Absolute, normalized URL of the page
    pub url: String,

    /// Page title, if the document had one
    pub title: Option<String>,

    /// Space-joined extracted text (title, h1s, h2s, paragraphs)
    pub content: String,

    /// Distance from the seed
    pub depth: u32,

    /// HTTP status of the fetch that produced this record
    pub status: u16,
}

/// Runs a complete crawl operation
///
/// Opens the configured sink, seeds the frontier, installs a Ctrl-C
/// handler, and drives the crawl to completion. The only run-fatal
/// conditions are an unusable sink destination and an invalid seed.
pub async fn crawl(config: Config) -> Result<CrawlStats, LoomError> {
    let sink = build_sink(&config.output)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Shutdown requested, draining in-flight fetches");
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    let coordinator = Coordinator::new(config, sink, shutdown)?;
    coordinator.run().await
}

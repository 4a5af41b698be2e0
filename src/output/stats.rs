//! Crawl run counters and the end-of-run summary

use std::collections::HashMap;
use std::time::Duration;

/// Counters accumulated over one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Work items that reached a terminal outcome (fetched or failed)
    pub pages_visited: u64,

    /// Records handed to the sink successfully
    pub records_emitted: u64,

    /// Items dropped after a tolerated status or exhausted retries
    pub pages_failed: u64,

    /// Records lost to sink write failures
    pub records_dropped: u64,

    /// Responses seen per HTTP status
    pub status_counts: HashMap<u16, u64>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_status(&mut self, status: u16) {
        *self.status_counts.entry(status).or_insert(0) += 1;
    }

    /// Logs the end-of-run summary
    pub fn log_summary(&self, elapsed: Duration) {
        tracing::info!(
            "Crawl finished: {} pages visited, {} records emitted, {} failed, {} dropped in {:.1}s",
            self.pages_visited,
            self.records_emitted,
            self.pages_failed,
            self.records_dropped,
            elapsed.as_secs_f64()
        );

        let mut statuses: Vec<_> = self.status_counts.iter().collect();
        statuses.sort_by_key(|(status, _)| **status);
        for (status, count) in statuses {
            tracing::info!("  HTTP {}: {} responses", status, count);
        }
    }
}

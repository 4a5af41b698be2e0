//! Crawl coordination - main crawl orchestration logic
//!
//! This module drives the whole crawl:
//! - Seeding and draining the frontier
//! - Dispatching fetch workers under the global and per-host ceilings
//! - Per-host pacing between dispatches
//! - Turning fetch results into records, new work items, or warnings
//! - Emitting records to the sink and reporting final statistics

use crate::config::Config;
use crate::crawler::extractor::extract_page;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchPolicy, FetchResult};
use crate::crawler::fingerprint::FingerprintStore;
use crate::crawler::frontier::{Frontier, WorkItem};
use crate::crawler::pacing::PaceController;
use crate::crawler::PageRecord;
use crate::output::{CrawlStats, RecordSink};
use crate::url::{extract_host, CrawlScope};
use crate::LoomError;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Per-host dispatch controls shared with fetch workers
///
/// The semaphore caps in-flight fetches against the host; `next_slot` is
/// the reserve-slot pacing cursor: a dispatcher takes the later of now and
/// the cursor as its start time and pushes the cursor forward by its delay.
#[derive(Clone)]
struct HostLane {
    semaphore: Arc<Semaphore>,
    next_slot: Arc<Mutex<Instant>>,
}

/// What a fetch worker hands back to the coordinator
struct WorkerOutput {
    item: WorkItem,
    result: FetchResult,
}

/// Main crawl coordinator
pub struct Coordinator {
    config: Config,
    frontier: Frontier,
    client: Client,
    policy: FetchPolicy,
    pace: PaceController,
    sink: Box<dyn RecordSink>,
    lanes: HashMap<String, HostLane>,
    stats: CrawlStats,
    shutdown: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a coordinator and admits the seed URLs
    ///
    /// A seed that fails to parse or falls outside the allowed hosts is
    /// run-fatal; a duplicate seed is simply skipped.
    pub fn new(
        config: Config,
        sink: Box<dyn RecordSink>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, LoomError> {
        let scope = CrawlScope::new(
            config.scope.allowed_hosts.iter().cloned(),
            config.crawler.max_depth,
        );
        let mut frontier = Frontier::new(scope, Arc::new(FingerprintStore::new()));

        for seed in &config.scope.seeds {
            use crate::crawler::frontier::Rejection;
            match frontier.admit(seed, 0, None) {
                Ok(_) => {}
                Err(Rejection::Duplicate) => {
                    tracing::debug!("Duplicate seed skipped: {}", seed);
                }
                Err(rejection) => {
                    return Err(LoomError::SeedRejected {
                        url: seed.clone(),
                        reason: format!("{:?}", rejection),
                    });
                }
            }
        }

        let client = build_http_client(&config.crawler)?;
        let policy = FetchPolicy::from_config(&config.crawler);
        let pace = PaceController::new(&config.crawler, &config.identity);

        Ok(Self {
            config,
            frontier,
            client,
            policy,
            pace,
            sink,
            lanes: HashMap::new(),
            stats: CrawlStats::new(),
            shutdown,
        })
    }

    /// Runs the crawl to completion and returns the run statistics
    ///
    /// The loop keeps up to `max-concurrent-fetches` workers in flight and
    /// terminates when the frontier is empty and no worker remains. On
    /// shutdown, dispatch stops and in-flight workers are drained; no
    /// partial record is emitted.
    pub async fn run(mut self) -> Result<CrawlStats, LoomError> {
        let start = std::time::Instant::now();
        let ceiling = self.config.crawler.max_concurrent_fetches as usize;
        let mut workers: JoinSet<WorkerOutput> = JoinSet::new();

        tracing::info!(
            "Starting crawl: {} seeds, max depth {}",
            self.frontier.len(),
            self.config.crawler.max_depth
        );

        loop {
            let stopping = self.shutdown.load(Ordering::Relaxed);

            while !stopping && workers.len() < ceiling {
                match self.frontier.next_item() {
                    Some(item) => self.dispatch(item, &mut workers),
                    None => break,
                }
            }

            if workers.is_empty() {
                if stopping || self.frontier.is_empty() {
                    break;
                }
                continue;
            }

            match workers.join_next().await {
                Some(Ok(output)) => self.handle_output(output),
                Some(Err(e)) => tracing::warn!("Fetch worker panicked: {}", e),
                None => {}
            }
        }

        if self.shutdown.load(Ordering::Relaxed) {
            tracing::warn!(
                "Crawl aborted with {} items still in the frontier",
                self.frontier.len()
            );
        }

        self.sink.finalize(&self.stats)?;
        self.stats.log_summary(start.elapsed());
        tracing::info!(
            "{} unique URLs admitted over the run",
            self.frontier.total_admitted()
        );

        Ok(self.stats)
    }

    /// Spawns one fetch worker for a work item
    ///
    /// Identity and delay are chosen here, on the coordinator task, so a
    /// seeded RNG yields a reproducible selection sequence regardless of
    /// worker interleaving.
    fn dispatch(&mut self, item: WorkItem, workers: &mut JoinSet<WorkerOutput>) {
        let delay = self.pace.next_delay();
        let identity = self.pace.pick_identity(item.discovered_by.as_deref());
        let lane = self.lane_for(&item.url);
        let client = self.client.clone();
        let policy = self.policy.clone();

        tracing::debug!("Dispatching {} at depth {}", item.url, item.depth);

        workers.spawn(async move {
            let _permit = lane
                .semaphore
                .acquire_owned()
                .await
                .expect("host semaphore closed");

            let slot = {
                let mut cursor = lane.next_slot.lock().expect("pacing cursor poisoned");
                let now = Instant::now();
                let slot = (*cursor).max(now);
                *cursor = slot + delay;
                slot
            };
            tokio::time::sleep_until(slot).await;

            let result = fetch_page(&client, &item.url, &identity, &policy).await;
            WorkerOutput { item, result }
        });
    }

    fn lane_for(&mut self, url: &url::Url) -> HostLane {
        let host = extract_host(url).unwrap_or_default();
        let per_host = self.config.crawler.per_host_fetches as usize;

        self.lanes
            .entry(host)
            .or_insert_with(|| HostLane {
                semaphore: Arc::new(Semaphore::new(per_host)),
                // First dispatch to a host starts immediately
                next_slot: Arc::new(Mutex::new(Instant::now())),
            })
            .clone()
    }

    /// Classifies one finished fetch and feeds its links back in
    fn handle_output(&mut self, output: WorkerOutput) {
        let WorkerOutput { item, result } = output;
        self.stats.pages_visited += 1;
        if let Some(status) = result.status {
            self.stats.record_status(status);
        }

        // Capture the reason before the match moves the body out
        let reason = result.failure_reason();
        let (status, body) = match (result.status, result.body) {
            (Some(status), Some(body)) => (status, body),
            (status, _) => {
                if status.is_some_and(|s| self.policy.is_tolerated(s)) {
                    tracing::debug!("Skipping {}: {}", item.url, reason);
                } else {
                    tracing::warn!("Skipping {}: {}", item.url, reason);
                }
                self.stats.pages_failed += 1;
                return;
            }
        };

        tracing::info!("Fetched {} ({})", item.url, status);

        let extracted = extract_page(&body, &item.url);
        let record = PageRecord {
            url: item.url.to_string(),
            title: extracted.title,
            content: extracted.content,
            depth: item.depth,
            status,
        };

        match self.sink.write(&record) {
            Ok(()) => self.stats.records_emitted += 1,
            Err(e) => {
                tracing::warn!("Failed to write record for {}: {}", item.url, e);
                self.stats.records_dropped += 1;
            }
        }

        // Links on a max-depth page can never be admitted; skip the walk
        if item.depth >= self.config.crawler.max_depth {
            return;
        }

        let parent = item.url.as_str();
        for link in &extracted.links {
            if let Err(rejection) = self.frontier.admit_url(link, item.depth + 1, parent) {
                tracing::trace!("Rejected {}: {:?}", link, rejection);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CrawlerConfig, IdentityConfig, OutputConfig, OutputMode, ScopeConfig,
    };
    use crate::output::TextSink;
    use std::path::Path;

    fn create_test_config(seed: &str, host: &str, db_dir: &Path) -> Config {
        Config {
            crawler: CrawlerConfig {
                max_depth: 2,
                max_concurrent_fetches: 2,
                per_host_fetches: 2,
                delay_ms: 1,
                jitter: false,
                retry_limit: 0,
                retryable_statuses: vec![500, 502, 503, 504],
                tolerated_statuses: vec![403, 404],
                timeout_secs: 5,
                rng_seed: Some(1),
            },
            identity: IdentityConfig {
                user_agents: vec!["TestAgent/1.0".to_string()],
                bootstrap_referer: "https://www.google.com/".to_string(),
            },
            scope: ScopeConfig {
                seeds: vec![seed.to_string()],
                allowed_hosts: vec![host.to_string()],
            },
            output: OutputConfig {
                mode: OutputMode::Single,
                path: db_dir.join("out.txt").display().to_string(),
                unknown_path: db_dir.join("unknown.txt").display().to_string(),
                regions: vec![],
            },
        }
    }

    fn create_sink(dir: &Path) -> Box<dyn RecordSink> {
        Box::new(TextSink::create(&dir.join("out.txt")).unwrap())
    }

    #[test]
    fn test_seed_outside_scope_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config("https://other.com/", "example.com", dir.path());
        let sink = create_sink(dir.path());

        let result = Coordinator::new(config, sink, Arc::new(AtomicBool::new(false)));
        assert!(matches!(result, Err(LoomError::SeedRejected { .. })));
    }

    #[test]
    fn test_unparsable_seed_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config("not a url", "example.com", dir.path());
        let sink = create_sink(dir.path());

        let result = Coordinator::new(config, sink, Arc::new(AtomicBool::new(false)));
        assert!(matches!(result, Err(LoomError::SeedRejected { .. })));
    }

    #[test]
    fn test_failed_fetch_counted_without_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config("https://example.com/", "example.com", dir.path());
        let sink = create_sink(dir.path());

        let mut coordinator =
            Coordinator::new(config, sink, Arc::new(AtomicBool::new(false))).unwrap();
        let item = coordinator.frontier.next_item().unwrap();
        let result = FetchResult {
            url: item.url.to_string(),
            status: Some(403),
            body: None,
            error: None,
        };

        coordinator.handle_output(WorkerOutput { item, result });

        assert_eq!(coordinator.stats.pages_failed, 1);
        assert_eq!(coordinator.stats.records_emitted, 0);
        assert_eq!(coordinator.stats.status_counts.get(&403), Some(&1));
    }

    #[test]
    fn test_valid_seed_admitted() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config("https://example.com/", "example.com", dir.path());
        let sink = create_sink(dir.path());

        let coordinator =
            Coordinator::new(config, sink, Arc::new(AtomicBool::new(false))).unwrap();
        assert_eq!(coordinator.frontier.len(), 1);
    }
}

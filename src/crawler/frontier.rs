//! Frontier queue and admission
//!
//! Holds the discovered-but-not-yet-fetched work items and applies the
//! admission checks (depth, scope, de-duplication) that decide whether a
//! discovered link becomes a work item at all.

use crate::crawler::fingerprint::FingerprintStore;
use crate::url::{normalize_url, CrawlScope};
use std::collections::VecDeque;
use std::sync::Arc;
use url::Url;

/// One unit of crawl work: a normalized URL at a known depth
///
/// Created only by frontier admission, consumed exactly once.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Absolute, normalized URL
    pub url: Url,

    /// Distance from the seed; the seed itself is depth 0
    pub depth: u32,

    /// The page this URL was discovered on; None for seeds
    pub discovered_by: Option<String>,
}

/// Why a discovered link was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Link depth would exceed the configured limit
    DepthExceeded,
    /// Host is not in the allowed set
    OutOfScope,
    /// URL was already claimed by an earlier discovery
    Duplicate,
    /// URL did not normalize (malformed, unsupported scheme)
    Unparsable,
}

/// FIFO frontier with scope/depth/fingerprint admission
///
/// Admission and mark-seen are one atomic step relative to concurrent
/// discoveries of the same URL; the fingerprint store carries the lock.
pub struct Frontier {
    queue: VecDeque<WorkItem>,
    fingerprints: Arc<FingerprintStore>,
    scope: CrawlScope,
}

impl Frontier {
    pub fn new(scope: CrawlScope, fingerprints: Arc<FingerprintStore>) -> Self {
        Self {
            queue: VecDeque::new(),
            fingerprints,
            scope,
        }
    }

    /// Runs a discovered link through admission
    ///
    /// On success the URL is fingerprinted and enqueued in one step and the
    /// admitted item is returned. Rejections are silent by design; the
    /// caller may log them at trace level if it cares.
    pub fn admit(
        &mut self,
        raw_url: &str,
        depth: u32,
        discovered_by: Option<&str>,
    ) -> Result<&WorkItem, Rejection> {
        // Depth is checked before an item is ever constructed, so links on
        // max-depth pages never materialize
        if !self.scope.within_depth(depth) {
            return Err(Rejection::DepthExceeded);
        }

        let url = normalize_url(raw_url).map_err(|_| Rejection::Unparsable)?;

        if !self.scope.admits_host(&url) {
            return Err(Rejection::OutOfScope);
        }

        if !self.fingerprints.admit(&url) {
            return Err(Rejection::Duplicate);
        }

        self.queue.push_back(WorkItem {
            url,
            depth,
            discovered_by: discovered_by.map(|s| s.to_string()),
        });

        Ok(self.queue.back().expect("item just pushed"))
    }

    /// Admits an already-resolved link URL (extractor output)
    pub fn admit_url(
        &mut self,
        url: &Url,
        depth: u32,
        discovered_by: &str,
    ) -> Result<&WorkItem, Rejection> {
        self.admit(url.as_str(), depth, Some(discovered_by))
    }

    /// Takes the next work item, FIFO order
    pub fn next_item(&mut self) -> Option<WorkItem> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total URLs fingerprinted so far (admitted over the whole run)
    pub fn total_admitted(&self) -> usize {
        self.fingerprints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_frontier(max_depth: u32) -> Frontier {
        let scope = CrawlScope::new(vec!["example.com".to_string()], max_depth);
        Frontier::new(scope, Arc::new(FingerprintStore::new()))
    }

    #[test]
    fn test_admit_seed() {
        let mut frontier = create_frontier(2);

        let item = frontier.admit("https://example.com/", 0, None).unwrap();
        assert_eq!(item.depth, 0);
        assert!(item.discovered_by.is_none());
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_depth_exceeded_rejected() {
        let mut frontier = create_frontier(1);

        let result = frontier.admit("https://example.com/deep", 2, None);
        assert_eq!(result.unwrap_err(), Rejection::DepthExceeded);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_depth_at_limit_admitted() {
        let mut frontier = create_frontier(1);
        assert!(frontier.admit("https://example.com/edge", 1, None).is_ok());
    }

    #[test]
    fn test_out_of_scope_rejected() {
        let mut frontier = create_frontier(2);

        let result = frontier.admit("https://other.com/b", 1, None);
        assert_eq!(result.unwrap_err(), Rejection::OutOfScope);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut frontier = create_frontier(2);

        assert!(frontier.admit("https://example.com/a", 0, None).is_ok());
        let result = frontier.admit("https://example.com/a", 1, Some("https://example.com/"));
        assert_eq!(result.unwrap_err(), Rejection::Duplicate);
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_trivial_variants_are_duplicates() {
        let mut frontier = create_frontier(2);

        assert!(frontier.admit("https://example.com/a", 0, None).is_ok());
        let result = frontier.admit("https://EXAMPLE.com/a/#frag", 1, None);
        assert_eq!(result.unwrap_err(), Rejection::Duplicate);
    }

    #[test]
    fn test_unparsable_rejected() {
        let mut frontier = create_frontier(2);

        let result = frontier.admit("::::", 0, None);
        assert_eq!(result.unwrap_err(), Rejection::Unparsable);
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = create_frontier(2);

        frontier.admit("https://example.com/a", 0, None).unwrap();
        frontier.admit("https://example.com/b", 0, None).unwrap();

        assert_eq!(
            frontier.next_item().unwrap().url.as_str(),
            "https://example.com/a"
        );
        assert_eq!(
            frontier.next_item().unwrap().url.as_str(),
            "https://example.com/b"
        );
        assert!(frontier.next_item().is_none());
    }

    #[test]
    fn test_mixed_scope_scenario() {
        // Seed page links to /a (same host) and https://other.com/b
        let mut frontier = create_frontier(1);
        frontier.admit("https://example.com/", 0, None).unwrap();
        let _seed = frontier.next_item().unwrap();

        let same = frontier.admit("https://example.com/a", 1, Some("https://example.com/"));
        assert!(same.is_ok());

        let other = frontier.admit("https://other.com/b", 1, Some("https://example.com/"));
        assert_eq!(other.unwrap_err(), Rejection::OutOfScope);
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_total_admitted_survives_draining() {
        let mut frontier = create_frontier(2);

        frontier.admit("https://example.com/a", 0, None).unwrap();
        frontier.admit("https://example.com/b", 0, None).unwrap();
        frontier.next_item().unwrap();
        frontier.next_item().unwrap();

        assert!(frontier.is_empty());
        assert_eq!(frontier.total_admitted(), 2);
    }
}

use crate::url::domain::extract_host;
use std::collections::HashSet;
use url::Url;

/// The admission boundary for one crawl run
///
/// Immutable for the run; the frontier consults it to admit or reject
/// discovered links.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    allowed_hosts: HashSet<String>,
    max_depth: u32,
}

impl CrawlScope {
    /// Creates a scope from a set of allowed hostnames and a depth limit
    pub fn new(allowed_hosts: impl IntoIterator<Item = String>, max_depth: u32) -> Self {
        Self {
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.to_lowercase())
                .collect(),
            max_depth,
        }
    }

    /// Returns true if the URL's host is in the allowed set
    pub fn admits_host(&self, url: &Url) -> bool {
        match extract_host(url) {
            Some(host) => self.allowed_hosts.contains(&host),
            None => false,
        }
    }

    /// Returns true if a page at this depth may be fetched
    pub fn within_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }

    /// The configured depth limit
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

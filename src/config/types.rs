use serde::Deserialize;

/// Main configuration structure for siteloom
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub identity: IdentityConfig,
    pub scope: ScopeConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from seed URLs
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches across all hosts
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Maximum number of in-flight fetches against a single host
    #[serde(rename = "per-host-fetches", default = "default_concurrency")]
    pub per_host_fetches: u32,

    /// Base delay between requests to the same host (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Randomize the delay uniformly in [delay, 2 * delay]
    #[serde(default)]
    pub jitter: bool,

    /// Number of retries after the first attempt for transient failures
    #[serde(rename = "retry-limit", default = "default_retry_limit")]
    pub retry_limit: u32,

    /// HTTP statuses retried like transport errors
    #[serde(rename = "retryable-statuses", default = "default_retryable")]
    pub retryable_statuses: Vec<u16>,

    /// HTTP statuses returned after a single attempt, never retried
    #[serde(rename = "tolerated-statuses", default = "default_tolerated")]
    pub tolerated_statuses: Vec<u16>,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional RNG seed for deterministic identity/jitter selection
    #[serde(rename = "rng-seed")]
    pub rng_seed: Option<u64>,
}

/// Outbound identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Pool of user-agent strings, one picked at random per request
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Referer sent with seed requests, before any page has been visited
    #[serde(rename = "bootstrap-referer", default = "default_referer")]
    pub bootstrap_referer: String,
}

/// Crawl scope configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Seed URLs to start crawling from
    pub seeds: Vec<String>,

    /// Hostnames the crawl is allowed to visit
    #[serde(rename = "allowed-hosts")]
    pub allowed_hosts: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// "single" writes every record to `path`; "regions" routes records
    /// to per-region destinations
    #[serde(default = "default_mode")]
    pub mode: OutputMode,

    /// Destination file in single mode
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Destination for records that match no region in regions mode
    #[serde(rename = "unknown-path", default = "default_unknown_path")]
    pub unknown_path: String,

    /// Region routing rules, checked in order
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionEntry>,
}

/// Output routing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Single,
    Regions,
}

/// A region label with the URL rules that select it and its destination
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    /// Region label
    pub name: String,

    /// Hostnames routed to this region
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Path prefixes routed to this region
    #[serde(default, rename = "path-prefixes")]
    pub path_prefixes: Vec<String>,

    /// Destination file for this region
    pub path: String,
}

fn default_concurrency() -> u32 {
    2
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_retry_limit() -> u32 {
    3
}

fn default_retryable() -> Vec<u16> {
    vec![408, 429, 500, 502, 503, 504]
}

fn default_tolerated() -> Vec<u16> {
    vec![403, 404]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .to_string(),
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
    ]
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}

fn default_mode() -> OutputMode {
    OutputMode::Single
}

fn default_output_path() -> String {
    "./harvest.txt".to_string()
}

fn default_unknown_path() -> String {
    "./harvest-unknown.txt".to_string()
}

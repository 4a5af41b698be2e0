//! HTTP fetcher implementation
//!
//! This module performs the actual page requests, including:
//! - Building an HTTP client with the crawl's default headers
//! - Per-request identity headers (user-agent, referer)
//! - Retry logic for transient statuses and transport errors
//! - Classifying terminal statuses without raising

use crate::config::CrawlerConfig;
use crate::crawler::pacing::Identity;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Result of fetching one URL, after retries are exhausted or a terminal
/// response is seen
///
/// Never an error at the type level: the caller classifies the outcome from
/// the status/error fields.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL that was requested
    pub url: String,

    /// Last-seen HTTP status, if any response was received
    pub status: Option<u16>,

    /// Response body, present only for content-bearing (2xx) responses
    pub body: Option<String>,

    /// Transport-level failure description, if the last attempt never got
    /// a response
    pub error: Option<String>,
}

impl FetchResult {
    /// A short description of the failure for logging
    pub fn failure_reason(&self) -> String {
        match (self.status, &self.error) {
            (Some(status), _) => format!("HTTP {}", status),
            (None, Some(error)) => error.clone(),
            (None, None) => "no response".to_string(),
        }
    }
}

/// Retry and status-classification policy for the fetcher
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Retries after the first attempt for transient failures
    pub retry_limit: u32,

    /// Statuses retried like transport errors
    pub retryable: HashSet<u16>,

    /// Statuses expected to fail without retry; an expected miss, not a
    /// fault worth alarming on
    pub tolerated: HashSet<u16>,

    /// Delay between retry attempts; the standing pacing delay, no extra
    /// backoff on top
    pub retry_delay: Duration,
}

impl FetchPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            retry_limit: config.retry_limit,
            retryable: config.retryable_statuses.iter().copied().collect(),
            tolerated: config.tolerated_statuses.iter().copied().collect(),
            retry_delay: Duration::from_millis(config.delay_ms),
        }
    }

    /// True if the status is in the tolerated set
    pub fn is_tolerated(&self, status: u16) -> bool {
        self.tolerated.contains(&status)
    }
}

/// Builds the HTTP client shared by all fetch workers
///
/// Default headers apply to every request; per-request identity headers
/// override them on conflict (reqwest merge semantics).
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying transient failures
///
/// Statuses in the retryable set and transport errors (timeout, connection
/// refused) are retried up to `retry_limit` times, with the standing pacing
/// delay between attempts. Any other status is terminal after a single
/// attempt: 2xx responses return their body, tolerated and other non-success
/// statuses return status-only results and the frontier decides disposition.
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    identity: &Identity,
    policy: &FetchPolicy,
) -> FetchResult {
    let mut attempt: u32 = 0;
    let mut last = FetchResult {
        url: url.to_string(),
        status: None,
        body: None,
        error: None,
    };

    loop {
        attempt += 1;

        let response = client
            .get(url.clone())
            .header(USER_AGENT, &identity.user_agent)
            .header(REFERER, &identity.referer)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                last.status = Some(status);
                last.error = None;

                if response.status().is_success() {
                    match response.text().await {
                        Ok(body) => {
                            last.body = Some(body);
                            return last;
                        }
                        Err(e) => {
                            // Body read failures are transport errors
                            last.status = None;
                            last.error = Some(format!("body read failed: {}", e));
                        }
                    }
                } else if !policy.retryable.contains(&status) {
                    // Tolerated or otherwise terminal status, single attempt
                    return last;
                }
            }
            Err(e) => {
                last.status = None;
                last.error = Some(classify_transport_error(&e));
            }
        }

        if attempt > policy.retry_limit {
            return last;
        }

        tracing::debug!(
            "Retrying {} (attempt {}/{}): {}",
            url,
            attempt,
            policy.retry_limit + 1,
            last.failure_reason()
        );
        tokio::time::sleep(policy.retry_delay).await;
    }
}

fn classify_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}

//! Request pacing and outbound identity selection
//!
//! Decides how long to wait between requests to the same host and which
//! user-agent/referer pair each request goes out with. The RNG is injected
//! so a configured seed makes both decisions reproducible.

use crate::config::{CrawlerConfig, IdentityConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Outbound identity for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
    pub referer: String,
}

/// Picks inter-request delays and per-request identities
#[derive(Debug)]
pub struct PaceController {
    base_delay: Duration,
    jitter: bool,
    user_agents: Vec<String>,
    bootstrap_referer: String,
    rng: StdRng,
}

impl PaceController {
    pub fn new(crawler: &CrawlerConfig, identity: &IdentityConfig) -> Self {
        let rng = match crawler.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            base_delay: Duration::from_millis(crawler.delay_ms),
            jitter: crawler.jitter,
            user_agents: identity.user_agents.clone(),
            bootstrap_referer: identity.bootstrap_referer.clone(),
            rng,
        }
    }

    /// The delay to respect before the next request to a host
    ///
    /// With jitter enabled the delay is uniform in [base, 2 * base].
    pub fn next_delay(&mut self) -> Duration {
        if !self.jitter || self.base_delay.is_zero() {
            return self.base_delay;
        }

        let base = self.base_delay.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(base..=base * 2))
    }

    /// Picks the identity for one request
    ///
    /// The user agent is a uniform-random choice from the pool. The referer
    /// is the discovering page when one exists, otherwise the configured
    /// bootstrap value (seed requests).
    pub fn pick_identity(&mut self, discovered_by: Option<&str>) -> Identity {
        let user_agent = self
            .user_agents
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();

        let referer = match discovered_by {
            Some(page) => page.to_string(),
            None => self.bootstrap_referer.clone(),
        };

        Identity {
            user_agent,
            referer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;

    fn create_configs(delay_ms: u64, jitter: bool, seed: u64) -> (CrawlerConfig, IdentityConfig) {
        let crawler = CrawlerConfig {
            max_depth: 2,
            max_concurrent_fetches: 2,
            per_host_fetches: 2,
            delay_ms,
            jitter,
            retry_limit: 3,
            retryable_statuses: vec![500],
            tolerated_statuses: vec![404],
            timeout_secs: 30,
            rng_seed: Some(seed),
        };
        let identity = IdentityConfig {
            user_agents: vec![
                "AgentA/1.0".to_string(),
                "AgentB/1.0".to_string(),
                "AgentC/1.0".to_string(),
            ],
            bootstrap_referer: "https://www.google.com/".to_string(),
        };
        (crawler, identity)
    }

    #[test]
    fn test_fixed_delay_without_jitter() {
        let (crawler, identity) = create_configs(1000, false, 7);
        let mut pace = PaceController::new(&crawler, &identity);

        for _ in 0..5 {
            assert_eq!(pace.next_delay(), Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_jittered_delay_within_range() {
        let (crawler, identity) = create_configs(1000, true, 7);
        let mut pace = PaceController::new(&crawler, &identity);

        for _ in 0..50 {
            let delay = pace.next_delay();
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(2000));
        }
    }

    #[test]
    fn test_zero_delay_stays_zero() {
        let (crawler, identity) = create_configs(0, true, 7);
        let mut pace = PaceController::new(&crawler, &identity);
        assert_eq!(pace.next_delay(), Duration::ZERO);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let (crawler, identity) = create_configs(500, true, 42);
        let mut a = PaceController::new(&crawler, &identity);
        let mut b = PaceController::new(&crawler, &identity);

        for _ in 0..10 {
            assert_eq!(a.next_delay(), b.next_delay());
            assert_eq!(a.pick_identity(None), b.pick_identity(None));
        }
    }

    #[test]
    fn test_user_agent_from_pool() {
        let (crawler, identity) = create_configs(100, false, 3);
        let mut pace = PaceController::new(&crawler, &identity);

        for _ in 0..20 {
            let picked = pace.pick_identity(None);
            assert!(identity.user_agents.contains(&picked.user_agent));
        }
    }

    #[test]
    fn test_bootstrap_referer_for_seed() {
        let (crawler, identity) = create_configs(100, false, 3);
        let mut pace = PaceController::new(&crawler, &identity);

        let picked = pace.pick_identity(None);
        assert_eq!(picked.referer, "https://www.google.com/");
    }

    #[test]
    fn test_discovering_page_as_referer() {
        let (crawler, identity) = create_configs(100, false, 3);
        let mut pace = PaceController::new(&crawler, &identity);

        let picked = pace.pick_identity(Some("https://example.com/team"));
        assert_eq!(picked.referer, "https://example.com/team");
    }
}

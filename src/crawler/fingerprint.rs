//! URL de-duplication for one crawl run
//!
//! Every URL that passes admission is fingerprinted here before it is
//! fetched, so a URL is fetched at most once per run no matter how many
//! pages link to it.

use std::collections::HashSet;
use std::sync::Mutex;
use url::Url;

/// Tracks which normalized URLs have already been claimed for fetching
///
/// The store grows monotonically for the lifetime of a run and is safe to
/// share between concurrently dispatching workers. Marking happens at the
/// moment a URL is admitted, not after its fetch succeeds, so two workers
/// discovering the same URL can never both enqueue it.
#[derive(Debug, Default)]
pub struct FingerprintStore {
    seen: Mutex<HashSet<String>>,
}

impl FingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL has already been claimed
    pub fn seen(&self, url: &Url) -> bool {
        self.seen
            .lock()
            .expect("fingerprint store poisoned")
            .contains(url.as_str())
    }

    /// Marks a URL as seen; idempotent
    pub fn mark_seen(&self, url: &Url) {
        self.seen
            .lock()
            .expect("fingerprint store poisoned")
            .insert(url.to_string());
    }

    /// Claims a URL in a single atomic step
    ///
    /// Returns true if this call was the first to claim it, false if it was
    /// already in the store. This is the membership-check-plus-mark the
    /// frontier uses during admission.
    pub fn admit(&self, url: &Url) -> bool {
        self.seen
            .lock()
            .expect("fingerprint store poisoned")
            .insert(url.to_string())
    }

    /// Number of fingerprints stored
    pub fn len(&self) -> usize {
        self.seen.lock().expect("fingerprint store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

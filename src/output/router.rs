//! Region-based record routing
//!
//! In regions mode each record is routed to a destination by matching its
//! URL against configured host and path-prefix rules, first match wins.
//! Records that match no region land in the unknown bucket with a warning.

use crate::config::{OutputConfig, RegionEntry};
use crate::crawler::PageRecord;
use crate::output::stats::CrawlStats;
use crate::output::text::TextSink;
use crate::output::traits::{OutputResult, RecordSink};
use std::path::Path;
use url::Url;

struct Region {
    name: String,
    hosts: Vec<String>,
    path_prefixes: Vec<String>,
    sink: TextSink,
}

impl Region {
    fn matches(&self, url: &Url) -> bool {
        if let Some(host) = url.host_str() {
            let host = host.to_lowercase();
            if self.hosts.iter().any(|h| h.to_lowercase() == host) {
                return true;
            }
        }

        self.path_prefixes
            .iter()
            .any(|prefix| url.path().starts_with(prefix.as_str()))
    }
}

/// Routes records to per-region text destinations
pub struct RegionRouter {
    regions: Vec<Region>,
    unknown: TextSink,
}

impl RegionRouter {
    /// Opens every region destination plus the unknown bucket
    ///
    /// Any open failure is run-fatal, same as the single-file sink.
    pub fn create(config: &OutputConfig) -> OutputResult<Self> {
        let mut regions = Vec::with_capacity(config.regions.len());
        for entry in &config.regions {
            regions.push(Region {
                name: entry.name.clone(),
                hosts: entry.hosts.clone(),
                path_prefixes: entry.path_prefixes.clone(),
                sink: TextSink::create(Path::new(&entry.path))?,
            });
        }

        let unknown = TextSink::create(Path::new(&config.unknown_path))?;

        Ok(Self { regions, unknown })
    }

    /// Creates a router from region entries and an unknown-bucket path
    pub fn from_entries(entries: &[RegionEntry], unknown_path: &Path) -> OutputResult<Self> {
        let mut regions = Vec::with_capacity(entries.len());
        for entry in entries {
            regions.push(Region {
                name: entry.name.clone(),
                hosts: entry.hosts.clone(),
                path_prefixes: entry.path_prefixes.clone(),
                sink: TextSink::create(Path::new(&entry.path))?,
            });
        }

        Ok(Self {
            regions,
            unknown: TextSink::create(unknown_path)?,
        })
    }

    /// The region label a record would be routed to, if any
    pub fn region_for(&self, record: &PageRecord) -> Option<&str> {
        let url = Url::parse(&record.url).ok()?;
        self.regions
            .iter()
            .find(|region| region.matches(&url))
            .map(|region| region.name.as_str())
    }
}

impl RecordSink for RegionRouter {
    fn write(&mut self, record: &PageRecord) -> OutputResult<()> {
        let url = Url::parse(&record.url).ok();

        if let Some(url) = url {
            for region in &mut self.regions {
                if region.matches(&url) {
                    return region.sink.write(record);
                }
            }
        }

        tracing::warn!(
            "No region matched {}, routing to unknown bucket",
            record.url
        );
        self.unknown.write(record)
    }

    fn finalize(&mut self, stats: &CrawlStats) -> OutputResult<()> {
        for region in &mut self.regions {
            region.sink.finalize(stats)?;
            tracing::info!(
                "Region {}: {} records -> {}",
                region.name,
                region.sink.pages_written(),
                region.sink.path()
            );
        }
        self.unknown.finalize(stats)?;
        Ok(())
    }
}

//! URL handling module for siteloom
//!
//! This module provides URL fingerprint normalization, host extraction,
//! and the crawl scope admission checks.

mod domain;
mod normalize;
mod scope;

pub use domain::extract_host;
pub use normalize::normalize_url;
pub use scope::CrawlScope;

//! HTML extraction for fetched pages
//!
//! Pulls the fields a PageRecord is built from (title, heading and
//! paragraph text) and the outbound links to feed back into the frontier.
//! Malformed HTML degrades to empty fields; extraction never fails a page.

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from one HTML page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// First <title> element text, if present and non-empty
    pub title: Option<String>,

    /// Space-joined concatenation of title, h1, h2, and paragraph text
    pub content: String,

    /// All anchor hrefs resolved to absolute URLs
    pub links: Vec<Url>,
}

/// Extracts content fields and outbound links from an HTML document
///
/// Content is the ordered groups [title, h1 texts, h2 texts, p texts], each
/// group joined by single spaces; empty groups contribute nothing and the
/// final string is trimmed. Extraction on the same input always yields the
/// same output.
pub fn extract_page(html: &str, base_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let content = build_content(&document, title.as_deref());
    let links = extract_links(&document, base_url);

    ExtractedPage {
        title,
        content,
        links,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects the trimmed text of every element matching the selector
fn collect_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn build_content(document: &Html, title: Option<&str>) -> String {
    let mut groups: Vec<String> = Vec::new();

    if let Some(title) = title {
        groups.push(title.to_string());
    }

    for css in ["h1", "h2", "p"] {
        if let Ok(selector) = Selector::parse(css) {
            let texts = collect_texts(document, &selector);
            if !texts.is_empty() {
                groups.push(texts.join(" "));
            }
        }
    }

    groups.join(" ").trim().to_string()
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None for hrefs that should be excluded:
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - fragment-only links (same page anchors)
/// - URLs that fail to resolve against the base
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) => {
            if absolute.scheme() == "http" || absolute.scheme() == "https" {
                Some(absolute)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

//! Plain-text record destination
//!
//! One file per destination: a header block, one entry per record, and a
//! closing line with the page count.

use crate::crawler::PageRecord;
use crate::output::stats::CrawlStats;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const SEPARATOR: &str = "--------------------------------------------------------------------------------";

/// Writes records to a single text file
pub struct TextSink {
    path: String,
    writer: BufWriter<File>,
    pages_written: u64,
}

impl TextSink {
    /// Opens the destination and writes the header
    ///
    /// Failure here is run-fatal; the crawl refuses to start without a
    /// usable destination.
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path).map_err(|source| OutputError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "SITE SCRAPE RESULTS")?;
        writeln!(writer, "===================")?;
        writeln!(writer)?;

        Ok(Self {
            path: path.display().to_string(),
            writer,
            pages_written: 0,
        })
    }

    /// Number of records written to this destination
    pub fn pages_written(&self) -> u64 {
        self.pages_written
    }

    /// The destination path, for logging
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl RecordSink for TextSink {
    fn write(&mut self, record: &PageRecord) -> OutputResult<()> {
        writeln!(self.writer, "URL: {}", record.url)?;
        writeln!(
            self.writer,
            "TITLE: {}",
            record.title.as_deref().unwrap_or("")
        )?;
        writeln!(self.writer, "DEPTH: {}", record.depth)?;
        writeln!(self.writer, "CONTENT:")?;
        writeln!(self.writer, "{}", record.content)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", SEPARATOR)?;
        writeln!(self.writer)?;

        self.pages_written += 1;
        Ok(())
    }

    fn finalize(&mut self, _stats: &CrawlStats) -> OutputResult<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "Total pages scraped: {}", self.pages_written)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(url: &str, title: Option<&str>, depth: u32) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: title.map(|s| s.to_string()),
            content: "Some extracted text.".to_string(),
            depth,
            status: 200,
        }
    }

    #[test]
    fn test_header_and_record_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut sink = TextSink::create(&path).unwrap();
        sink.write(&record("https://example.com/", Some("Home"), 0))
            .unwrap();
        sink.finalize(&CrawlStats::new()).unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("SITE SCRAPE RESULTS\n"));
        assert!(contents.contains("URL: https://example.com/\n"));
        assert!(contents.contains("TITLE: Home\n"));
        assert!(contents.contains("DEPTH: 0\n"));
        assert!(contents.contains("CONTENT:\nSome extracted text.\n"));
        assert!(contents.contains("Total pages scraped: 1\n"));
    }

    #[test]
    fn test_missing_title_written_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut sink = TextSink::create(&path).unwrap();
        sink.write(&record("https://example.com/x", None, 1)).unwrap();
        sink.finalize(&CrawlStats::new()).unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("TITLE: \n"));
    }

    #[test]
    fn test_page_count_in_footer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut sink = TextSink::create(&path).unwrap();
        for i in 0..3 {
            sink.write(&record(&format!("https://example.com/{}", i), None, 1))
                .unwrap();
        }
        assert_eq!(sink.pages_written(), 3);
        sink.finalize(&CrawlStats::new()).unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Total pages scraped: 3\n"));
    }

    #[test]
    fn test_create_fails_on_bad_path() {
        let result = TextSink::create(Path::new("/nonexistent-dir/out.txt"));
        assert!(matches!(result, Err(OutputError::Open { .. })));
    }
}

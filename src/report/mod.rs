//! Crawl report aggregation
//!
//! This module reads the three crawl logs back through a [`LogSource`] and
//! produces the summary report:
//! - Fetch counts (attempted, succeeded, failed)
//! - Extracted URL counts (total, unique, in-domain, external)
//! - Status code histogram and file size buckets
//! - Distinct content types
//!
//! The report is written as plain text, or as markdown when the target path
//! ends in `.md`.

mod markdown;
mod text;

pub use markdown::format_markdown_report;
pub use text::format_text_report;

use crate::config::Config;
use crate::sink::{open_source, FetchStatus, LogSource, RunRecord, SinkError};
use crate::url::LinkClass;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building or writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read crawl logs: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Upper bound (exclusive) of the smallest size bucket
const ONE_KB: u64 = 1024;

/// Upper bound (exclusive) of the middle size bucket
const ONE_MB: u64 = 1024 * 1024;

/// Visit counts grouped by body size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeBuckets {
    /// 0 to 1023 bytes
    pub under_1kb: usize,
    /// 1024 to 1048575 bytes
    pub kb_to_mb: usize,
    /// 1048576 bytes and above
    pub over_1mb: usize,
}

impl SizeBuckets {
    pub fn add(&mut self, size_bytes: u64) {
        if size_bytes < ONE_KB {
            self.under_1kb += 1;
        } else if size_bytes < ONE_MB {
            self.kb_to_mb += 1;
        } else {
            self.over_1mb += 1;
        }
    }

    /// Bucket labels paired with their counts, smallest first
    pub fn labelled(&self) -> [(&'static str, usize); 3] {
        [
            ("< 1KB", self.under_1kb),
            ("1KB - 1MB", self.kb_to_mb),
            ("> 1MB", self.over_1mb),
        ]
    }
}

/// Aggregated statistics over one crawl's logs
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Site label the logs belong to
    pub site: String,

    /// Run metadata, when the logs came from a run-tracking sink
    pub run: Option<RunRecord>,

    pub fetches_attempted: usize,
    pub fetches_succeeded: usize,
    pub fetches_failed: usize,

    /// Rows in the outlink log
    pub total_urls: usize,
    pub unique_urls: usize,
    /// Distinct URLs classified `OK`
    pub unique_internal: usize,
    /// Distinct URLs classified `N_OK`
    pub unique_external: usize,

    pub status_codes: BTreeMap<FetchStatus, usize>,
    pub file_sizes: SizeBuckets,
    pub content_types: BTreeSet<String>,
}

impl CrawlReport {
    /// Builds the report by scanning all three logs of `source`
    pub fn from_source(site: &str, source: &dyn LogSource) -> ReportResult<Self> {
        let mut report = Self {
            site: site.to_string(),
            run: source.run_info()?,
            ..Self::default()
        };

        for fetch in source.fetch_records()? {
            report.fetches_attempted += 1;
            if fetch.status.is_success() {
                report.fetches_succeeded += 1;
            } else {
                report.fetches_failed += 1;
            }
            *report.status_codes.entry(fetch.status).or_insert(0) += 1;
        }

        let mut unique = HashSet::new();
        let mut internal = HashSet::new();
        let mut external = HashSet::new();
        for outlink in source.outlink_records()? {
            report.total_urls += 1;
            match outlink.class {
                LinkClass::Ok => internal.insert(outlink.url.clone()),
                LinkClass::NotOk => external.insert(outlink.url.clone()),
            };
            unique.insert(outlink.url);
        }
        report.unique_urls = unique.len();
        report.unique_internal = internal.len();
        report.unique_external = external.len();

        for visit in source.visit_records()? {
            report.file_sizes.add(visit.size_bytes);
            report.content_types.insert(visit.content_type);
        }

        Ok(report)
    }

    /// Percentage of attempted fetches that returned 2xx
    pub fn success_rate(&self) -> f64 {
        if self.fetches_attempted == 0 {
            0.0
        } else {
            (self.fetches_succeeded as f64 / self.fetches_attempted as f64) * 100.0
        }
    }

    /// Renders the report in the given format
    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => format_text_report(self),
            ReportFormat::Markdown => format_markdown_report(self),
        }
    }

    /// Writes the report to `path`, choosing the format from its extension
    pub fn write_to(&self, path: &Path) -> ReportResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render(ReportFormat::for_path(path)))?;
        Ok(())
    }
}

/// Output format of a report file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
}

impl ReportFormat {
    /// Markdown for `.md` paths, plain text for anything else
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") => Self::Markdown,
            _ => Self::Text,
        }
    }
}

/// Aggregates the logs of `config`'s output and writes the report
///
/// # Returns
///
/// * `Ok((CrawlReport, PathBuf))` - The report and where it was written
/// * `Err(ReportError)` - The logs could not be read or the file written
pub fn generate_report(config: &Config) -> ReportResult<(CrawlReport, PathBuf)> {
    let source = open_source(config)?;
    let report = CrawlReport::from_source(&config.site_name(), source.as_ref())?;

    let path = config.report_path();
    report.write_to(&path)?;
    tracing::info!("Wrote crawl report to {}", path.display());

    Ok((report, path))
}

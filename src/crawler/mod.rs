//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The dedup set and frontier of pending work
//! - Page and failure caps
//! - HTTP fetching and link extraction
//! - The bounded worker pool driving a crawl session

mod dedup;
mod fetcher;
mod frontier;
mod limits;
mod parser;
mod scheduler;
mod session;
mod task;

pub use dedup::DedupSet;
pub use fetcher::{build_http_client, fetch_url, ContentKind, FetchOutcome};
pub use frontier::{Frontier, WorkItem};
pub use limits::{LimitController, LimitSnapshot, StopReason};
pub use parser::{extract_hrefs, extract_hrefs_from_bytes};
pub use session::{CrawlSession, CrawlStats};

use crate::config::Config;
use crate::sink::open_sink;
use crate::RippleError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the configured log sink (CSV files or SQLite run)
/// 2. Build the crawl session and admit the seed
/// 3. Run the worker pool until the frontier is exhausted or a cap is hit
/// 4. Finish the sink
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, stored with SQLite runs
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed
/// * `Err(RippleError)` - Setup failed before any page was fetched
pub async fn crawl(config: &Config, config_hash: &str) -> Result<CrawlStats, RippleError> {
    let sink = open_sink(config, config_hash)?;
    let session = CrawlSession::new(config, sink.clone())?;

    let stats = session.run().await;

    sink.finish()?;
    Ok(stats)
}

//! One crawl run and everything it owns

use crate::config::Config;
use crate::crawler::dedup::DedupSet;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::{Frontier, WorkItem};
use crate::crawler::limits::{LimitController, StopReason};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::task::CrawlContext;
use crate::sink::LogSink;
use crate::url::{extract_domain, normalize_url};
use crate::{RippleError, UrlError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    /// Fetches attempted, including transport failures
    pub fetched: usize,
    /// Fetches without a 2xx response
    pub non_success: usize,
    /// Pages recorded in the visit log
    pub visited: usize,
    /// Rows written to the outlink log
    pub outlinks: usize,
    /// URLs admitted to the dedup set, the seed included
    pub admitted: usize,
    /// Pending URLs dropped once the crawl stopped
    pub discarded: usize,
    /// Fetch tasks that panicked
    pub panicked: usize,
    /// Why admission stopped, if a cap was reached
    pub stop_reason: Option<StopReason>,
    pub elapsed: Duration,
}

/// A single crawl of one site
///
/// The session owns the dedup set, frontier, counters, HTTP client and sink
/// handle of one run. Two sessions never share state, so independent crawls
/// can run side by side in one process.
///
/// # Example
///
/// ```no_run
/// use site_ripple::config::Config;
/// use site_ripple::crawler::CrawlSession;
/// use site_ripple::sink::MemorySink;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), site_ripple::RippleError> {
/// let config = Config::for_seed("https://www.example.com/");
/// let sink = Arc::new(MemorySink::new());
/// let stats = CrawlSession::new(&config, sink.clone())?.run().await;
/// println!("{} pages fetched", stats.fetched);
/// # Ok(())
/// # }
/// ```
pub struct CrawlSession {
    ctx: Arc<CrawlContext>,
    frontier: Frontier,
    seed: Url,
    concurrency: usize,
}

impl CrawlSession {
    /// Creates a session and admits the seed at depth 1
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `sink` - Destination for fetch, visit and outlink rows
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - Ready to run
    /// * `Err(RippleError)` - The seed is unusable or the HTTP client could not be built
    pub fn new(config: &Config, sink: Arc<dyn LogSink>) -> Result<Self, RippleError> {
        let seed = normalize_url(Url::parse(&config.crawler.seed_url)?);
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(UrlError::InvalidScheme(seed.scheme().to_string()).into());
        }
        let seed_domain = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;

        let client = build_http_client(&config.user_agent, config.crawler.request_timeout_secs)?;

        let ctx = CrawlContext {
            client,
            seed_domain,
            max_depth: config.crawler.max_depth,
            dedup: DedupSet::new(),
            limits: LimitController::new(config.crawler.max_pages, config.crawler.max_failures),
            sink,
            visited: AtomicUsize::new(0),
            outlinks: AtomicUsize::new(0),
        };

        let frontier = Frontier::new();
        ctx.dedup.admit(seed.as_str());
        frontier.push(WorkItem::seed(seed.clone()));

        Ok(Self {
            ctx: Arc::new(ctx),
            frontier,
            seed,
            concurrency: config.crawler.concurrency,
        })
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Host every crawled URL must share with the seed
    pub fn seed_domain(&self) -> &str {
        &self.ctx.seed_domain
    }

    /// Runs the crawl to completion
    pub async fn run(self) -> CrawlStats {
        tracing::info!(
            "Starting crawl of {} (domain {}, concurrency {})",
            self.seed,
            self.ctx.seed_domain,
            self.concurrency
        );
        let start_time = Instant::now();

        let scheduler = Scheduler::new(Arc::clone(&self.ctx), &self.frontier, self.concurrency);
        let pool = scheduler.run().await;

        let snapshot = self.ctx.limits.snapshot();
        let stats = CrawlStats {
            fetched: snapshot.fetched,
            non_success: snapshot.non_success,
            visited: self.ctx.visited.load(Ordering::Relaxed),
            outlinks: self.ctx.outlinks.load(Ordering::Relaxed),
            admitted: self.ctx.dedup.len(),
            discarded: pool.discarded,
            panicked: pool.panicked,
            stop_reason: snapshot.stop_reason,
            elapsed: start_time.elapsed(),
        };

        match stats.stop_reason {
            Some(reason) => tracing::info!(
                "Crawl stopped ({}): {} fetched, {} visited in {:.1}s",
                reason,
                stats.fetched,
                stats.visited,
                stats.elapsed.as_secs_f64()
            ),
            None => tracing::info!(
                "Crawl complete: {} fetched, {} visited in {:.1}s",
                stats.fetched,
                stats.visited,
                stats.elapsed.as_secs_f64()
            ),
        }

        stats
    }
}

//! The fetch-and-expand task run for every work item

use crate::crawler::dedup::DedupSet;
use crate::crawler::fetcher::{fetch_url, ContentKind, FetchOutcome};
use crate::crawler::frontier::WorkItem;
use crate::crawler::limits::LimitController;
use crate::crawler::parser::extract_hrefs_from_bytes;
use crate::sink::{FetchRecord, FetchStatus, LogSink, OutlinkRecord, SinkResult, VisitRecord};
use crate::url::{classify_link, resolve_href};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// State shared by every task of one crawl
pub(crate) struct CrawlContext {
    pub client: Client,
    pub seed_domain: String,
    pub max_depth: u32,
    pub dedup: DedupSet,
    pub limits: LimitController,
    pub sink: Arc<dyn LogSink>,
    pub visited: AtomicUsize,
    pub outlinks: AtomicUsize,
}

/// Why a work item was dropped without a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    TooDeep,
    Stopped,
    NoFetchSlot,
}

/// What happened to a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Abandoned(AbandonReason),
    TransportError,
    NonSuccess(u16),
    Unsupported,
    Visited { outlinks: usize },
}

/// Result of running one task
#[derive(Debug)]
pub struct TaskOutcome {
    /// Newly admitted items for the frontier
    pub discovered: Vec<WorkItem>,
    pub disposition: Disposition,
}

impl TaskOutcome {
    fn done(disposition: Disposition) -> Self {
        Self {
            discovered: Vec::new(),
            disposition,
        }
    }
}

/// Fetches one admitted item and expands its links
///
/// Every attempted fetch produces exactly one fetch row. Visit and outlink
/// rows follow only for successful responses with an accepted content type.
pub(crate) async fn fetch_and_expand(ctx: Arc<CrawlContext>, item: WorkItem) -> TaskOutcome {
    if let Some(reason) = gate(&ctx, &item) {
        tracing::debug!("Abandoning {} at depth {}: {:?}", item.url, item.depth, reason);
        return TaskOutcome::done(Disposition::Abandoned(reason));
    }

    tracing::debug!("Fetching {} at depth {}", item.url, item.depth);

    let (status, content_type, body) = match fetch_url(&ctx.client, &item.url).await {
        FetchOutcome::Transport { kind, error } => {
            tracing::warn!("Fetch failed for {}: {}", item.url, error);
            log_write(
                &item.url,
                ctx.sink.record_fetch(&FetchRecord {
                    url: item.url.to_string(),
                    status: FetchStatus::Transport(kind),
                }),
            );
            ctx.limits.finish_fetch(false);
            return TaskOutcome::done(Disposition::TransportError);
        }
        FetchOutcome::Response {
            status,
            content_type,
            body,
        } => (status, content_type, body),
    };

    let fetch_status = FetchStatus::Code(status);
    log_write(
        &item.url,
        ctx.sink.record_fetch(&FetchRecord {
            url: item.url.to_string(),
            status: fetch_status,
        }),
    );
    ctx.limits.finish_fetch(fetch_status.is_success());

    if !fetch_status.is_success() {
        tracing::debug!("{} returned {}", item.url, status);
        return TaskOutcome::done(Disposition::NonSuccess(status));
    }

    let kind = ContentKind::from_content_type(content_type.as_deref());
    if !kind.is_accepted() {
        tracing::debug!(
            "Skipping {} with content type {:?}",
            item.url,
            content_type.as_deref().unwrap_or("")
        );
        return TaskOutcome::done(Disposition::Unsupported);
    }

    let body = body.unwrap_or_default();
    let links: Vec<Url> = if kind.extracts_links() {
        extract_hrefs_from_bytes(&body)
            .iter()
            .filter_map(|href| resolve_href(&item.url, href))
            .collect()
    } else {
        Vec::new()
    };

    log_write(
        &item.url,
        ctx.sink.record_visit(&VisitRecord {
            url: item.url.to_string(),
            size_bytes: body.len() as u64,
            outlink_count: links.len(),
            content_type: content_type.unwrap_or_default(),
        }),
    );
    ctx.visited.fetch_add(1, Ordering::Relaxed);
    ctx.outlinks.fetch_add(links.len(), Ordering::Relaxed);

    let outlink_count = links.len();
    let discovered = expand(&ctx, &item, links);

    TaskOutcome {
        discovered,
        disposition: Disposition::Visited {
            outlinks: outlink_count,
        },
    }
}

fn gate(ctx: &CrawlContext, item: &WorkItem) -> Option<AbandonReason> {
    if item.depth > ctx.max_depth {
        Some(AbandonReason::TooDeep)
    } else if !ctx.limits.should_admit() {
        Some(AbandonReason::Stopped)
    } else if !ctx.limits.try_begin_fetch() {
        Some(AbandonReason::NoFetchSlot)
    } else {
        None
    }
}

/// Logs every resolved link and admits the in-domain ones
fn expand(ctx: &CrawlContext, item: &WorkItem, links: Vec<Url>) -> Vec<WorkItem> {
    let mut discovered = Vec::new();

    for link in links {
        let class = classify_link(&link, &ctx.seed_domain);
        log_write(
            &item.url,
            ctx.sink.record_outlink(&OutlinkRecord {
                url: link.to_string(),
                class,
            }),
        );

        if class.is_crawlable() && ctx.dedup.admit(link.as_str()) && ctx.limits.has_capacity() {
            discovered.push(item.child(link));
        }
    }

    discovered
}

/// Sink failures are logged and never abort the crawl
fn log_write(page: &Url, result: SinkResult<()>) {
    if let Err(e) = result {
        tracing::error!("Failed to write log row for {}: {}", page, e);
    }
}

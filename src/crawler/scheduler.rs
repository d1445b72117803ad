//! Bounded worker pool draining the frontier
//!
//! The scheduler keeps at most `concurrency` fetch-and-expand tasks running
//! in a [`JoinSet`]. Whenever a slot frees up it pops the next work item from
//! the frontier; whenever a task completes its discoveries are pushed back.
//! The loop ends when the frontier is empty and nothing is in flight. Once
//! the limit controller has no capacity left, pending items are discarded
//! and only the in-flight tasks are awaited.

use crate::crawler::frontier::Frontier;
use crate::crawler::task::{fetch_and_expand, CrawlContext, TaskOutcome};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Completions between two progress log lines
const PROGRESS_INTERVAL: usize = 100;

/// Counters collected while the pool runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tasks that ran to completion, including abandoned ones
    pub completed: usize,
    /// Tasks that panicked
    pub panicked: usize,
    /// Items dropped from the frontier after the crawl stopped
    pub discarded: usize,
}

pub(crate) struct Scheduler<'a> {
    ctx: Arc<CrawlContext>,
    frontier: &'a Frontier,
    concurrency: usize,
}

impl<'a> Scheduler<'a> {
    pub fn new(ctx: Arc<CrawlContext>, frontier: &'a Frontier, concurrency: usize) -> Self {
        Self {
            ctx,
            frontier,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs the pool until quiescence
    pub async fn run(&self) -> SchedulerStats {
        let mut stats = SchedulerStats::default();
        let mut in_flight: JoinSet<TaskOutcome> = JoinSet::new();
        let start_time = Instant::now();

        loop {
            self.top_up(&mut in_flight, &mut stats);

            if in_flight.is_empty() {
                break;
            }

            match in_flight.join_next().await {
                Some(Ok(outcome)) => {
                    tracing::trace!("Task finished: {:?}", outcome.disposition);
                    for item in outcome.discovered {
                        self.frontier.push(item);
                    }
                }
                Some(Err(e)) => {
                    if e.is_panic() {
                        tracing::warn!("Fetch task panicked: {}", e);
                        stats.panicked += 1;
                    } else {
                        tracing::warn!("Fetch task cancelled: {}", e);
                    }
                }
                None => break,
            }

            stats.completed += 1;
            if stats.completed % PROGRESS_INTERVAL == 0 {
                self.log_progress(in_flight.len(), start_time);
            }
        }

        stats
    }

    /// Spawns tasks until the pool is full or the frontier runs dry
    fn top_up(&self, in_flight: &mut JoinSet<TaskOutcome>, stats: &mut SchedulerStats) {
        while in_flight.len() < self.concurrency {
            if !self.ctx.limits.has_capacity() {
                let dropped = self.frontier.drain();
                if dropped > 0 {
                    tracing::debug!("Discarding {} pending URLs", dropped);
                    stats.discarded += dropped;
                }
                return;
            }

            match self.frontier.pop() {
                Some(item) => {
                    tracing::debug!("Dispatching {} at depth {}", item.url, item.depth);
                    in_flight.spawn(fetch_and_expand(Arc::clone(&self.ctx), item));
                }
                None => return,
            }
        }
    }

    fn log_progress(&self, in_flight: usize, start_time: Instant) {
        let snapshot = self.ctx.limits.snapshot();
        let elapsed = start_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            snapshot.fetched as f64 / elapsed
        } else {
            0.0
        };

        tracing::info!(
            "Progress: {} fetched, {} non-success, {} in frontier, {} in flight, {:.2} pages/sec",
            snapshot.fetched,
            snapshot.non_success,
            self.frontier.len(),
            in_flight,
            rate
        );
    }
}

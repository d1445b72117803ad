//! Pending work items awaiting a fetch

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// A URL admitted for fetching, with the depth it was discovered at
///
/// The seed has depth 1; every discovered item is one deeper than the page
/// that linked to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: Url,
    pub depth: u32,
}

impl WorkItem {
    /// The starting item of a crawl
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 1 }
    }

    /// An item discovered on this item's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// FIFO queue of work items, shared between the scheduler and its callers
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<WorkItem>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: WorkItem) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(item);
    }

    pub fn pop(&self) -> Option<WorkItem> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards every pending item, returning how many were dropped
    pub fn drain(&self) -> usize {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}

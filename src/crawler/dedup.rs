//! Dedup set guaranteeing each URL is fetched at most once

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Record of every URL ever admitted to work during a crawl
///
/// The set only grows. [`DedupSet::admit`] is the single check-and-insert
/// step; a caller that gets `false` back must drop the URL.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: Mutex<HashSet<String>>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `url`, returning true iff this call inserted it
    pub fn admit(&self, url: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Number of URLs admitted so far
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

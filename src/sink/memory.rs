//! In-memory log sink

use crate::sink::records::{FetchRecord, OutlinkRecord, VisitRecord};
use crate::sink::{LogSink, LogSource, SinkError, SinkResult};
use std::sync::Mutex;

/// Keeps every row in memory
///
/// Useful when embedding the crawler as a library and for tests that need to
/// inspect what a crawl produced.
#[derive(Debug, Default)]
pub struct MemorySink {
    fetches: Mutex<Vec<FetchRecord>>,
    visits: Mutex<Vec<VisitRecord>>,
    outlinks: Mutex<Vec<OutlinkRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the fetch log
    pub fn fetches(&self) -> Vec<FetchRecord> {
        snapshot(&self.fetches)
    }

    /// Snapshot of the visit log
    pub fn visits(&self) -> Vec<VisitRecord> {
        snapshot(&self.visits)
    }

    /// Snapshot of the outlink log
    pub fn outlinks(&self) -> Vec<OutlinkRecord> {
        snapshot(&self.outlinks)
    }
}

fn snapshot<T: Clone>(rows: &Mutex<Vec<T>>) -> Vec<T> {
    match rows.lock() {
        Ok(rows) => rows.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn push<T>(rows: &Mutex<Vec<T>>, row: T) -> SinkResult<()> {
    rows.lock().map_err(|_| SinkError::LockPoisoned)?.push(row);
    Ok(())
}

impl LogSink for MemorySink {
    fn record_fetch(&self, record: &FetchRecord) -> SinkResult<()> {
        push(&self.fetches, record.clone())
    }

    fn record_visit(&self, record: &VisitRecord) -> SinkResult<()> {
        push(&self.visits, record.clone())
    }

    fn record_outlink(&self, record: &OutlinkRecord) -> SinkResult<()> {
        push(&self.outlinks, record.clone())
    }
}

impl LogSource for MemorySink {
    fn fetch_records(&self) -> SinkResult<Vec<FetchRecord>> {
        Ok(self.fetches())
    }

    fn visit_records(&self) -> SinkResult<Vec<VisitRecord>> {
        Ok(self.visits())
    }

    fn outlink_records(&self) -> SinkResult<Vec<OutlinkRecord>> {
        Ok(self.outlinks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::FetchStatus;
    use crate::url::LinkClass;
    use std::sync::Arc;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        for code in [200u16, 404, 500] {
            sink.record_fetch(&FetchRecord {
                url: format!("https://example.com/{}", code),
                status: FetchStatus::Code(code),
            })
            .unwrap();
        }

        let statuses: Vec<_> = sink.fetches().into_iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                FetchStatus::Code(200),
                FetchStatus::Code(404),
                FetchStatus::Code(500)
            ]
        );
    }

    #[test]
    fn test_memory_sink_concurrent_writers() {
        let sink = Arc::new(MemorySink::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        sink.record_outlink(&OutlinkRecord {
                            url: format!("https://example.com/{}/{}", i, j),
                            class: LinkClass::Ok,
                        })
                        .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.outlink_records().unwrap().len(), 400);
        assert!(sink.visit_records().unwrap().is_empty());
    }
}

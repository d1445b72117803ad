//! Log sinks for crawl output
//!
//! This module handles where the crawl's rows end up:
//! - CSV files (`fetch_<site>.csv`, `visit_<site>.csv`, `urls_<site>.csv`)
//! - A SQLite database with one row set per crawl run
//! - An in-memory sink for embedding the crawler and for tests
//!
//! Every sink can also be read back as a [`LogSource`], which is what the
//! report aggregator consumes.

mod csv_sink;
mod memory;
mod records;
mod schema;
mod sqlite_sink;

pub use csv_sink::{CsvLogPaths, CsvLogReader, CsvLogSink};
pub use memory::MemorySink;
pub use records::{FetchRecord, FetchStatus, OutlinkRecord, TransportErrorKind, VisitRecord};
pub use sqlite_sink::{RunRecord, RunStatus, SqliteLogReader, SqliteLogSink};

use crate::config::{Config, OutputFormat};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while writing or reading crawl logs
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed log row in {log}: {message}")]
    Malformed { log: &'static str, message: String },

    #[error("No crawl runs found in {0}")]
    NoRuns(String),

    #[error("Log sink lock poisoned")]
    LockPoisoned,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for crawl rows
///
/// Implementations must be safe to share between concurrently running fetch
/// tasks; each call appends exactly one complete row.
pub trait LogSink: Send + Sync {
    /// Appends one row to the fetch log
    fn record_fetch(&self, record: &FetchRecord) -> SinkResult<()>;

    /// Appends one row to the visit log
    fn record_visit(&self, record: &VisitRecord) -> SinkResult<()>;

    /// Appends one row to the outlink log
    fn record_outlink(&self, record: &OutlinkRecord) -> SinkResult<()>;

    /// Called once after the crawl has drained
    fn finish(&self) -> SinkResult<()> {
        Ok(())
    }
}

/// Batch reader over the three crawl logs
pub trait LogSource {
    /// All rows of the fetch log, in write order
    fn fetch_records(&self) -> SinkResult<Vec<FetchRecord>>;

    /// All rows of the visit log, in write order
    fn visit_records(&self) -> SinkResult<Vec<VisitRecord>>;

    /// All rows of the outlink log, in write order
    fn outlink_records(&self) -> SinkResult<Vec<OutlinkRecord>>;

    /// Metadata about the run the rows belong to, when the sink tracks runs
    fn run_info(&self) -> SinkResult<Option<RunRecord>> {
        Ok(None)
    }
}

/// Path of the SQLite database for a configuration
pub fn sqlite_path(config: &Config) -> PathBuf {
    config
        .output_dir()
        .join(format!("{}.db", config.site_name()))
}

/// Creates the sink configured by `output.format`, starting a fresh set of logs
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `config_hash` - Hash of the configuration file, recorded by sinks that track runs
pub fn open_sink(config: &Config, config_hash: &str) -> SinkResult<Arc<dyn LogSink>> {
    std::fs::create_dir_all(config.output_dir())?;

    match config.output.format {
        OutputFormat::Csv => {
            let paths = CsvLogPaths::for_site(config.output_dir(), &config.site_name());
            tracing::info!("Writing CSV logs to {}", config.output_dir().display());
            Ok(Arc::new(CsvLogSink::create(paths)?))
        }
        OutputFormat::Sqlite => {
            let path = sqlite_path(config);
            tracing::info!("Writing SQLite logs to {}", path.display());
            Ok(Arc::new(SqliteLogSink::create(
                &path,
                &config.crawler.seed_url,
                config_hash,
            )?))
        }
    }
}

/// Opens the existing logs of a configuration for reading
pub fn open_source(config: &Config) -> SinkResult<Box<dyn LogSource>> {
    match config.output.format {
        OutputFormat::Csv => {
            let paths = CsvLogPaths::for_site(config.output_dir(), &config.site_name());
            Ok(Box::new(CsvLogReader::new(paths)))
        }
        OutputFormat::Sqlite => Ok(Box::new(SqliteLogReader::open_latest(&sqlite_path(
            config,
        ))?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::LinkClass;

    fn config_in(dir: &std::path::Path, format: OutputFormat) -> Config {
        let mut config = Config::for_seed("https://www.example.com/");
        config.output.directory = dir.display().to_string();
        config.output.format = format;
        config
    }

    fn write_sample(sink: &dyn LogSink) {
        sink.record_fetch(&FetchRecord {
            url: "https://www.example.com/".to_string(),
            status: FetchStatus::Code(200),
        })
        .unwrap();
        sink.record_visit(&VisitRecord {
            url: "https://www.example.com/".to_string(),
            size_bytes: 512,
            outlink_count: 1,
            content_type: "text/html".to_string(),
        })
        .unwrap();
        sink.record_outlink(&OutlinkRecord {
            url: "https://other.com/".to_string(),
            class: LinkClass::NotOk,
        })
        .unwrap();
        sink.finish().unwrap();
    }

    #[test]
    fn test_open_csv_sink_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), OutputFormat::Csv);

        let sink = open_sink(&config, "hash").unwrap();
        write_sample(sink.as_ref());

        assert!(dir.path().join("fetch_example.csv").exists());
        assert!(dir.path().join("visit_example.csv").exists());
        assert!(dir.path().join("urls_example.csv").exists());

        let source = open_source(&config).unwrap();
        assert_eq!(source.fetch_records().unwrap().len(), 1);
        assert_eq!(source.visit_records().unwrap().len(), 1);
        assert_eq!(source.outlink_records().unwrap().len(), 1);
        assert!(source.run_info().unwrap().is_none());
    }

    #[test]
    fn test_open_sqlite_sink_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), OutputFormat::Sqlite);

        let sink = open_sink(&config, "abc123").unwrap();
        write_sample(sink.as_ref());
        drop(sink);

        assert!(dir.path().join("example.db").exists());

        let source = open_source(&config).unwrap();
        assert_eq!(source.fetch_records().unwrap().len(), 1);
        let run = source.run_info().unwrap().unwrap();
        assert_eq!(run.config_hash, "abc123");
        assert_eq!(run.status, RunStatus::Completed);
    }
}

//! CSV log files
//!
//! Each crawl writes three files next to each other:
//!
//! | File | Columns |
//! |------|---------|
//! | `fetch_<site>.csv` | `URL`, `Status` |
//! | `visit_<site>.csv` | `URL`, `Size (Bytes)`, `# of Outlinks`, `Content-Type` |
//! | `urls_<site>.csv` | `URL`, `Indicator` |

use crate::sink::records::{FetchRecord, FetchStatus, OutlinkRecord, VisitRecord};
use crate::sink::{LogSink, LogSource, SinkError, SinkResult};
use crate::url::LinkClass;
use csv::{Reader, StringRecord, Writer};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const FETCH_HEADER: [&str; 2] = ["URL", "Status"];
const VISIT_HEADER: [&str; 4] = ["URL", "Size (Bytes)", "# of Outlinks", "Content-Type"];
const OUTLINK_HEADER: [&str; 2] = ["URL", "Indicator"];

/// Locations of the three CSV logs for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLogPaths {
    pub fetch: PathBuf,
    pub visit: PathBuf,
    pub outlinks: PathBuf,
}

impl CsvLogPaths {
    /// Standard file names for `site` inside `dir`
    pub fn for_site(dir: &Path, site: &str) -> Self {
        Self {
            fetch: dir.join(format!("fetch_{}.csv", site)),
            visit: dir.join(format!("visit_{}.csv", site)),
            outlinks: dir.join(format!("urls_{}.csv", site)),
        }
    }
}

/// Log sink writing CSV files
///
/// Each file sits behind its own lock and every row is flushed as soon as it
/// is written, so an interrupted crawl still leaves well-formed logs.
pub struct CsvLogSink {
    paths: CsvLogPaths,
    fetch: Mutex<Writer<File>>,
    visit: Mutex<Writer<File>>,
    outlinks: Mutex<Writer<File>>,
}

impl CsvLogSink {
    /// Creates (or truncates) the three log files and writes their headers
    pub fn create(paths: CsvLogPaths) -> SinkResult<Self> {
        let fetch = create_writer(&paths.fetch, &FETCH_HEADER)?;
        let visit = create_writer(&paths.visit, &VISIT_HEADER)?;
        let outlinks = create_writer(&paths.outlinks, &OUTLINK_HEADER)?;

        Ok(Self {
            paths,
            fetch: Mutex::new(fetch),
            visit: Mutex::new(visit),
            outlinks: Mutex::new(outlinks),
        })
    }

    /// The files this sink writes to
    pub fn paths(&self) -> &CsvLogPaths {
        &self.paths
    }
}

fn create_writer(path: &Path, header: &[&str]) -> SinkResult<Writer<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(header)?;
    writer.flush()?;
    Ok(writer)
}

fn append_row<const N: usize>(writer: &Mutex<Writer<File>>, row: [&str; N]) -> SinkResult<()> {
    let mut writer = writer.lock().map_err(|_| SinkError::LockPoisoned)?;
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

impl LogSink for CsvLogSink {
    fn record_fetch(&self, record: &FetchRecord) -> SinkResult<()> {
        let status = record.status.to_string();
        append_row(&self.fetch, [record.url.as_str(), status.as_str()])
    }

    fn record_visit(&self, record: &VisitRecord) -> SinkResult<()> {
        let size = record.size_bytes.to_string();
        let outlinks = record.outlink_count.to_string();
        append_row(
            &self.visit,
            [
                record.url.as_str(),
                size.as_str(),
                outlinks.as_str(),
                record.content_type.as_str(),
            ],
        )
    }

    fn record_outlink(&self, record: &OutlinkRecord) -> SinkResult<()> {
        append_row(&self.outlinks, [record.url.as_str(), record.class.as_str()])
    }

    fn finish(&self) -> SinkResult<()> {
        for writer in [&self.fetch, &self.visit, &self.outlinks] {
            writer.lock().map_err(|_| SinkError::LockPoisoned)?.flush()?;
        }
        Ok(())
    }
}

impl LogSource for CsvLogSink {
    fn fetch_records(&self) -> SinkResult<Vec<FetchRecord>> {
        CsvLogReader::new(self.paths.clone()).fetch_records()
    }

    fn visit_records(&self) -> SinkResult<Vec<VisitRecord>> {
        CsvLogReader::new(self.paths.clone()).visit_records()
    }

    fn outlink_records(&self) -> SinkResult<Vec<OutlinkRecord>> {
        CsvLogReader::new(self.paths.clone()).outlink_records()
    }
}

/// Reads CSV logs written by [`CsvLogSink`]
pub struct CsvLogReader {
    paths: CsvLogPaths,
}

impl CsvLogReader {
    pub fn new(paths: CsvLogPaths) -> Self {
        Self { paths }
    }
}

fn read_rows<T>(
    path: &Path,
    log: &'static str,
    parse: impl Fn(&StringRecord) -> Result<T, String>,
) -> SinkResult<Vec<T>> {
    let mut reader = Reader::from_path(path)?;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let row = parse(&record).map_err(|message| SinkError::Malformed {
            log,
            message: match record.position() {
                Some(pos) => format!("line {}: {}", pos.line(), message),
                None => message,
            },
        })?;
        rows.push(row);
    }

    Ok(rows)
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("missing {} column", name))
}

impl LogSource for CsvLogReader {
    fn fetch_records(&self) -> SinkResult<Vec<FetchRecord>> {
        read_rows(&self.paths.fetch, "fetch", |record| {
            Ok(FetchRecord {
                url: field(record, 0, "URL")?.to_string(),
                status: field(record, 1, "Status")?.parse::<FetchStatus>()?,
            })
        })
    }

    fn visit_records(&self) -> SinkResult<Vec<VisitRecord>> {
        read_rows(&self.paths.visit, "visit", |record| {
            let size = field(record, 1, "Size")?;
            let outlinks = field(record, 2, "Outlinks")?;
            Ok(VisitRecord {
                url: field(record, 0, "URL")?.to_string(),
                size_bytes: size
                    .parse()
                    .map_err(|_| format!("invalid size '{}'", size))?,
                outlink_count: outlinks
                    .parse()
                    .map_err(|_| format!("invalid outlink count '{}'", outlinks))?,
                content_type: field(record, 3, "Content-Type")?.to_string(),
            })
        })
    }

    fn outlink_records(&self) -> SinkResult<Vec<OutlinkRecord>> {
        read_rows(&self.paths.outlinks, "urls", |record| {
            Ok(OutlinkRecord {
                url: field(record, 0, "URL")?.to_string(),
                class: field(record, 1, "Indicator")?.parse::<LinkClass>()?,
            })
        })
    }
}

//! SQLite log sink
//!
//! All three logs live in one database. Every crawl opens a new row in
//! `runs`, and its fetch, visit and outlink rows reference that run, so one
//! database can hold the history of several crawls of the same site.

use crate::sink::records::{FetchRecord, FetchStatus, OutlinkRecord, VisitRecord};
use crate::sink::schema::initialize_schema;
use crate::sink::{LogSink, LogSource, SinkError, SinkResult};
use crate::url::LinkClass;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Log sink writing to a SQLite database
pub struct SqliteLogSink {
    conn: Mutex<Connection>,
    run_id: i64,
}

impl SqliteLogSink {
    /// Opens (or creates) the database at `path` and starts a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `seed_url` - The crawl's seed, stored with the run
    /// * `config_hash` - Hash of the configuration that produced the run
    pub fn create(path: &Path, seed_url: &str, config_hash: &str) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::start_run(conn, seed_url, config_hash)
    }

    /// Creates a sink backed by an in-memory database
    pub fn in_memory(seed_url: &str, config_hash: &str) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start_run(conn, seed_url, config_hash)
    }

    fn start_run(conn: Connection, seed_url: &str, config_hash: &str) -> SinkResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (seed_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                seed_url,
                Utc::now().to_rfc3339(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started SQLite run {}", run_id);

        Ok(Self {
            conn: Mutex::new(conn),
            run_id,
        })
    }

    /// ID of the run this sink writes to
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> SinkResult<T>) -> SinkResult<T> {
        let conn = self.conn.lock().map_err(|_| SinkError::LockPoisoned)?;
        f(&conn)
    }
}

impl LogSink for SqliteLogSink {
    fn record_fetch(&self, record: &FetchRecord) -> SinkResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO fetches (run_id, url, status, recorded_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    self.run_id,
                    record.url,
                    record.status.to_string(),
                    Utc::now().to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }

    fn record_visit(&self, record: &VisitRecord) -> SinkResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO visits (run_id, url, size_bytes, outlink_count, content_type)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    self.run_id,
                    record.url,
                    record.size_bytes as i64,
                    record.outlink_count as i64,
                    record.content_type
                ],
            )?;
            Ok(())
        })
    }

    fn record_outlink(&self, record: &OutlinkRecord) -> SinkResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO outlinks (run_id, url, classification) VALUES (?1, ?2, ?3)",
                params![self.run_id, record.url, record.class.as_str()],
            )?;
            Ok(())
        })
    }

    fn finish(&self) -> SinkResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE runs SET finished_at = ?1, status = ?2 WHERE id = ?3",
                params![
                    Utc::now().to_rfc3339(),
                    RunStatus::Completed.to_db_string(),
                    self.run_id
                ],
            )?;
            Ok(())
        })
    }
}

impl LogSource for SqliteLogSink {
    fn fetch_records(&self) -> SinkResult<Vec<FetchRecord>> {
        self.with_conn(|conn| query_fetches(conn, self.run_id))
    }

    fn visit_records(&self) -> SinkResult<Vec<VisitRecord>> {
        self.with_conn(|conn| query_visits(conn, self.run_id))
    }

    fn outlink_records(&self) -> SinkResult<Vec<OutlinkRecord>> {
        self.with_conn(|conn| query_outlinks(conn, self.run_id))
    }

    fn run_info(&self) -> SinkResult<Option<RunRecord>> {
        self.with_conn(|conn| query_run(conn, self.run_id))
    }
}

/// Reads the logs of the most recent run in an existing database
pub struct SqliteLogReader {
    conn: Connection,
    run: RunRecord,
}

impl SqliteLogReader {
    /// Opens `path` and selects its latest run
    pub fn open_latest(path: &Path) -> SinkResult<Self> {
        if !path.exists() {
            return Err(SinkError::NoRuns(path.display().to_string()));
        }

        let conn = Connection::open(path)?;
        initialize_schema(&conn)?;

        let run = conn
            .query_row(
                "SELECT id FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or_else(|| SinkError::NoRuns(path.display().to_string()))?;

        let run = query_run(&conn, run)?
            .ok_or_else(|| SinkError::NoRuns(path.display().to_string()))?;

        Ok(Self { conn, run })
    }

    /// The run being read
    pub fn run(&self) -> &RunRecord {
        &self.run
    }
}

impl LogSource for SqliteLogReader {
    fn fetch_records(&self) -> SinkResult<Vec<FetchRecord>> {
        query_fetches(&self.conn, self.run.id)
    }

    fn visit_records(&self) -> SinkResult<Vec<VisitRecord>> {
        query_visits(&self.conn, self.run.id)
    }

    fn outlink_records(&self) -> SinkResult<Vec<OutlinkRecord>> {
        query_outlinks(&self.conn, self.run.id)
    }

    fn run_info(&self) -> SinkResult<Option<RunRecord>> {
        Ok(Some(self.run.clone()))
    }
}

fn query_run(conn: &Connection, run_id: i64) -> SinkResult<Option<RunRecord>> {
    let run = conn
        .query_row(
            "SELECT id, seed_url, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
            params![run_id],
            |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    seed_url: row.get(1)?,
                    started_at: row.get(2)?,
                    finished_at: row.get(3)?,
                    config_hash: row.get(4)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
                        .unwrap_or(RunStatus::Running),
                })
            },
        )
        .optional()?;

    Ok(run)
}

fn query_fetches(conn: &Connection, run_id: i64) -> SinkResult<Vec<FetchRecord>> {
    let mut stmt = conn.prepare("SELECT url, status FROM fetches WHERE run_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(url, status)| {
            let status = status
                .parse::<FetchStatus>()
                .map_err(|message| SinkError::Malformed {
                    log: "fetches",
                    message,
                })?;
            Ok(FetchRecord { url, status })
        })
        .collect()
}

fn query_visits(conn: &Connection, run_id: i64) -> SinkResult<Vec<VisitRecord>> {
    let mut stmt = conn.prepare(
        "SELECT url, size_bytes, outlink_count, content_type FROM visits WHERE run_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok(VisitRecord {
                url: row.get(0)?,
                size_bytes: row.get::<_, i64>(1)?.max(0) as u64,
                outlink_count: row.get::<_, i64>(2)?.max(0) as usize,
                content_type: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_outlinks(conn: &Connection, run_id: i64) -> SinkResult<Vec<OutlinkRecord>> {
    let mut stmt =
        conn.prepare("SELECT url, classification FROM outlinks WHERE run_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(url, class)| {
            let class = class
                .parse::<LinkClass>()
                .map_err(|message| SinkError::Malformed {
                    log: "outlinks",
                    message,
                })?;
            Ok(OutlinkRecord { url, class })
        })
        .collect()
}

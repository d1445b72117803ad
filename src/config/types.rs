use serde::Deserialize;

/// Default cap on the number of fetches per crawl
pub const DEFAULT_MAX_PAGES: usize = 20_000;

/// Default maximum crawl depth (the seed is depth 1)
pub const DEFAULT_MAX_DEPTH: u32 = 16;

/// Default cap on non-2xx responses and transport errors per crawl
pub const DEFAULT_MAX_FAILURES: usize = 1811;

/// Default worker pool width
pub const DEFAULT_CONCURRENCY: usize = 400;

/// Main configuration structure for Site-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Absolute URL the crawl starts from; its host bounds the crawl
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of fetches attempted during the crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum depth to crawl (seed is depth 1)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of non-success fetches after which no further work is admitted
    #[serde(rename = "max-failures", default = "default_max_failures")]
    pub max_failures: usize,

    /// Maximum number of fetch tasks running at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds; the HTTP client default applies when unset
    #[serde(rename = "request-timeout-secs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl CrawlerConfig {
    /// Creates a crawler configuration for `seed_url` with default limits
    pub fn with_seed(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_failures: DEFAULT_MAX_FAILURES,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Which log sink the crawl writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Three CSV files: fetch, visit and urls
    #[default]
    Csv,
    /// A single SQLite database holding all three logs
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the logs are written into
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Log sink format
    #[serde(default)]
    pub format: OutputFormat,

    /// Short site label used in file names; derived from the seed host when unset
    #[serde(rename = "site-name", default)]
    pub site_name: Option<String>,

    /// Where `--report` writes the crawl report
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
            site_name: None,
            report_path: None,
        }
    }
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_failures() -> usize {
    DEFAULT_MAX_FAILURES
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_crawler_name() -> String {
    "site-ripple".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_output_directory() -> String {
    ".".to_string()
}

//! Configuration module for Site-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawling {} to depth {}", config.crawler.seed_url, config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

use std::path::{Path, PathBuf};

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, OutputFormat, UserAgentConfig, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_FAILURES, DEFAULT_MAX_PAGES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;

impl Config {
    /// Builds a configuration for `seed_url` with every other setting at its default
    pub fn for_seed(seed_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig::with_seed(seed_url),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// The site label used in output file names
    ///
    /// Uses `output.site-name` when set, otherwise derives it from the seed host.
    pub fn site_name(&self) -> String {
        if let Some(name) = &self.output.site_name {
            return name.clone();
        }

        ::url::Url::parse(&self.crawler.seed_url)
            .ok()
            .and_then(|url| crate::url::site_label(&url))
            .unwrap_or_else(|| "site".to_string())
    }

    /// Directory the crawl logs are written into
    pub fn output_dir(&self) -> &Path {
        Path::new(&self.output.directory)
    }

    /// Where the crawl report is written
    pub fn report_path(&self) -> PathBuf {
        match &self.output.report_path {
            Some(path) => PathBuf::from(path),
            None => self
                .output_dir()
                .join(format!("CrawlReport_{}.txt", self.site_name())),
        }
    }
}

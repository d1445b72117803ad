//! Site-Ripple main entry point
//!
//! This is the command-line interface for the Site-Ripple single-site crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use site_ripple::config::{load_config_with_hash, Config, OutputFormat};
use site_ripple::crawler::crawl;
use site_ripple::report::generate_report;
use site_ripple::sink::{sqlite_path, CsvLogPaths};
use tracing_subscriber::EnvFilter;

/// Site-Ripple: a single-site link mapper
///
/// Site-Ripple crawls one website breadth-first from a seed URL, never
/// leaving the seed's domain. Every fetch, every successful visit and every
/// outbound link is logged, and the logs can be summarized into a report.
#[derive(Parser, Debug)]
#[command(name = "site-ripple")]
#[command(version)]
#[command(about = "A single-site breadth-first link mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "report")]
    dry_run: bool,

    /// Build the crawl report from existing logs and exit
    #[arg(long, conflicts_with = "dry_run")]
    report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
    } else if cli.report {
        handle_report(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_ripple=info,warn"),
            1 => EnvFilter::new("site_ripple=debug,info"),
            2 => EnvFilter::new("site_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== Site-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max failures: {}", config.crawler.max_failures);
    println!("  Concurrency: {}", config.crawler.concurrency);
    match config.crawler.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: client default"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Site label: {}", config.site_name());
    match config.output.format {
        OutputFormat::Csv => {
            let paths = CsvLogPaths::for_site(config.output_dir(), &config.site_name());
            println!("  Fetch log: {}", paths.fetch.display());
            println!("  Visit log: {}", paths.visit.display());
            println!("  Outlink log: {}", paths.outlinks.display());
        }
        OutputFormat::Sqlite => {
            println!("  Database: {}", sqlite_path(config).display());
        }
    }
    println!("  Report: {}", config.report_path().display());

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}

/// Handles the --report mode: aggregates existing logs into the report
fn handle_report(config: &Config) -> anyhow::Result<()> {
    let (report, path) = generate_report(config).context("Failed to generate crawl report")?;

    println!("=== Crawl Report: {} ===\n", report.site);
    println!("Fetches attempted: {}", report.fetches_attempted);
    println!("Fetches succeeded: {}", report.fetches_succeeded);
    println!("Unique URLs extracted: {}", report.unique_urls);
    println!("\n✓ Report written to: {}", path.display());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (max pages {}, max depth {}, max failures {})",
        config.crawler.seed_url,
        config.crawler.max_pages,
        config.crawler.max_depth,
        config.crawler.max_failures
    );

    let stats = crawl(config, config_hash).await.context("Crawl failed")?;

    println!("=== Crawl Summary ===\n");
    println!("Fetched: {}", stats.fetched);
    println!("Non-success: {}", stats.non_success);
    println!("Visited: {}", stats.visited);
    println!("Outlinks: {}", stats.outlinks);
    println!("URLs admitted: {}", stats.admitted);
    if let Some(reason) = stats.stop_reason {
        println!("Stopped: {}", reason);
    }
    println!("Elapsed: {:.1}s", stats.elapsed.as_secs_f64());

    Ok(())
}

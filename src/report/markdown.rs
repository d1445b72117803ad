//! Markdown report generation
//!
//! Same statistics as the plain text report, laid out as headed sections
//! and tables. Run metadata is included when the logs came from SQLite.

use crate::report::CrawlReport;
use crate::sink::RunRecord;
use chrono::{DateTime, Utc};

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The aggregated crawl statistics
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    // Title
    md.push_str(&format!("# Site-Ripple Crawl Report: {}\n\n", report.site));

    // Run metadata
    if let Some(run) = &report.run {
        push_run_information(&mut md, run);
    }

    // Fetch statistics
    md.push_str("## Fetch Statistics\n\n");
    md.push_str(&format!(
        "- **Fetches Attempted**: {}\n",
        report.fetches_attempted
    ));
    md.push_str(&format!(
        "- **Fetches Succeeded**: {}\n",
        report.fetches_succeeded
    ));
    md.push_str(&format!(
        "- **Fetches Failed or Aborted**: {}\n",
        report.fetches_failed
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    // Outgoing URLs
    md.push_str("## Outgoing URLs\n\n");
    md.push_str(&format!("- **Total URLs Extracted**: {}\n", report.total_urls));
    md.push_str(&format!("- **Unique URLs**: {}\n", report.unique_urls));
    md.push_str(&format!(
        "- **Unique URLs Within Site**: {}\n",
        report.unique_internal
    ));
    md.push_str(&format!(
        "- **Unique URLs Outside Site**: {}\n\n",
        report.unique_external
    ));

    // Status codes
    if !report.status_codes.is_empty() {
        md.push_str("## Status Codes\n\n");
        md.push_str("| Status | Count |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &report.status_codes {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    // File sizes
    md.push_str("## File Sizes\n\n");
    md.push_str("| Size | Pages |\n");
    md.push_str("|------|-------|\n");
    for (label, count) in report.file_sizes.labelled() {
        md.push_str(&format!("| {} | {} |\n", label, count));
    }
    md.push('\n');

    // Content types
    if !report.content_types.is_empty() {
        md.push_str("## Content Types\n\n");
        for content_type in &report.content_types {
            md.push_str(&format!("- {}\n", content_type));
        }
        md.push('\n');
    }

    md
}

fn push_run_information(md: &mut String, run: &RunRecord) {
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", run.id));
    md.push_str(&format!("- **Seed**: {}\n", run.seed_url));
    md.push_str(&format!("- **Started**: {}\n", run.started_at));
    if let Some(finished) = &run.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = run_duration_seconds(run) {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", run.status.to_db_string()));
    md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));
}

fn run_duration_seconds(run: &RunRecord) -> Option<i64> {
    let started = run.started_at.parse::<DateTime<Utc>>().ok()?;
    let finished = run.finished_at.as_ref()?.parse::<DateTime<Utc>>().ok()?;
    Some((finished - started).num_seconds())
}

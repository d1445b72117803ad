//! Plain text report, one section per statistic group

use crate::report::CrawlReport;

/// Formats a crawl report as plain text
pub fn format_text_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("Fetch statistics:\n");
    out.push_str(&format!("# fetches attempted: {}\n", report.fetches_attempted));
    out.push_str(&format!("# fetches succeeded: {}\n", report.fetches_succeeded));
    out.push_str(&format!(
        "# fetches failed or aborted: {}\n\n",
        report.fetches_failed
    ));

    out.push_str("Outgoing URLs: statistics about URLs extracted from visited HTML pages\n");
    out.push_str(&format!("Total URLs extracted: {}\n", report.total_urls));
    out.push_str(&format!("# unique URLs extracted: {}\n", report.unique_urls));
    out.push_str(&format!(
        "# unique URLs within {}: {}\n",
        report.site, report.unique_internal
    ));
    out.push_str(&format!(
        "# unique URLs outside {}: {}\n\n",
        report.site, report.unique_external
    ));

    out.push_str("Status codes:\n");
    for (status, count) in &report.status_codes {
        out.push_str(&format!("{}: {}\n", status, count));
    }
    out.push('\n');

    out.push_str("File sizes:\n");
    for (label, count) in report.file_sizes.labelled() {
        out.push_str(&format!("{}: {}\n", label, count));
    }
    out.push('\n');

    out.push_str("Content Type:\n");
    let content_types: Vec<&str> = report.content_types.iter().map(String::as_str).collect();
    out.push_str(&content_types.join(", "));
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SizeBuckets;
    use crate::sink::{FetchStatus, TransportErrorKind};

    fn create_test_report() -> CrawlReport {
        let mut report = CrawlReport {
            site: "nytimes".to_string(),
            fetches_attempted: 3,
            fetches_succeeded: 1,
            fetches_failed: 2,
            total_urls: 5,
            unique_urls: 4,
            unique_internal: 3,
            unique_external: 1,
            file_sizes: SizeBuckets {
                under_1kb: 0,
                kb_to_mb: 1,
                over_1mb: 0,
            },
            ..CrawlReport::default()
        };
        report.status_codes.insert(FetchStatus::Code(200), 1);
        report.status_codes.insert(FetchStatus::Code(404), 1);
        report
            .status_codes
            .insert(FetchStatus::Transport(TransportErrorKind::Connect), 1);
        report.content_types.insert("text/html".to_string());
        report.content_types.insert("application/pdf".to_string());
        report
    }

    #[test]
    fn test_full_layout() {
        let text = format_text_report(&create_test_report());
        let expected = "\
Fetch statistics:
# fetches attempted: 3
# fetches succeeded: 1
# fetches failed or aborted: 2

Outgoing URLs: statistics about URLs extracted from visited HTML pages
Total URLs extracted: 5
# unique URLs extracted: 4
# unique URLs within nytimes: 3
# unique URLs outside nytimes: 1

Status codes:
200: 1
404: 1
error:connect: 1

File sizes:
< 1KB: 0
1KB - 1MB: 1
> 1MB: 0

Content Type:
application/pdf, text/html
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_report_keeps_sections() {
        let text = format_text_report(&CrawlReport::default());
        assert!(text.contains("Status codes:\n\nFile sizes:"));
        assert!(text.ends_with("Content Type:\n\n"));
    }
}

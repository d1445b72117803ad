//! Crawl to disk, then aggregate the logs into a report

use crate::common::{create_test_config, mount_page, mount_response};
use site_ripple::config::{Config, OutputFormat};
use site_ripple::crawler::crawl;
use site_ripple::report::generate_report;
use site_ripple::sink::{open_source, FetchStatus, RunStatus};
use std::path::Path;
use wiremock::MockServer;

async fn mount_site(server: &MockServer) {
    mount_page(server, "/", &["/a", "/missing", "https://other.test/"]).await;
    mount_page(server, "/a", &["/", "https://other.test/"]).await;
    mount_response(server, "/missing", 404, b"gone".to_vec(), "text/html").await;
}

fn config_in(server: &MockServer, dir: &Path, format: OutputFormat) -> Config {
    let mut config = create_test_config(server);
    config.output.directory = dir.display().to_string();
    config.output.format = format;
    config.output.site_name = Some("mock".to_string());
    config
}

#[tokio::test]
async fn test_csv_crawl_and_text_report() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&server, dir.path(), OutputFormat::Csv);

    let stats = crawl(&config, "hash").await.expect("crawl should succeed");
    assert_eq!(stats.fetched, 3);

    assert!(dir.path().join("fetch_mock.csv").exists());
    assert!(dir.path().join("visit_mock.csv").exists());
    assert!(dir.path().join("urls_mock.csv").exists());

    let (report, path) = generate_report(&config).expect("report should build");
    assert_eq!(path, dir.path().join("CrawlReport_mock.txt"));

    assert_eq!(report.fetches_attempted, 3);
    assert_eq!(report.fetches_succeeded, 2);
    assert_eq!(report.fetches_failed, 1);
    assert_eq!(report.total_urls, 5);
    assert_eq!(report.unique_urls, 4);
    assert_eq!(report.unique_internal, 3);
    assert_eq!(report.unique_external, 1);
    assert_eq!(report.status_codes[&FetchStatus::Code(404)], 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Fetch statistics:\n# fetches attempted: 3\n"));
    assert!(text.contains("404: 1"));
    assert!(text.contains("Content Type:\ntext/html\n"));
}

#[tokio::test]
async fn test_sqlite_crawl_and_markdown_report() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&server, dir.path(), OutputFormat::Sqlite);
    let report_path = dir.path().join("report.md");
    config.output.report_path = Some(report_path.display().to_string());

    crawl(&config, "cafebabe").await.expect("crawl should succeed");
    assert!(dir.path().join("mock.db").exists());

    let source = open_source(&config).unwrap();
    let run = source.run_info().unwrap().expect("run metadata");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "cafebabe");

    let (report, path) = generate_report(&config).expect("report should build");
    assert_eq!(path, report_path);
    assert_eq!(report.fetches_attempted, 3);

    let markdown = std::fs::read_to_string(&path).unwrap();
    assert!(markdown.contains("# Site-Ripple Crawl Report: mock"));
    assert!(markdown.contains("- **Config Hash**: cafebabe"));
    assert!(markdown.contains("| 200 | 2 |"));
}

#[tokio::test]
async fn test_report_without_logs_fails() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let csv = config_in(&server, dir.path(), OutputFormat::Csv);
    assert!(generate_report(&csv).is_err());

    let sqlite = config_in(&server, dir.path(), OutputFormat::Sqlite);
    assert!(generate_report(&sqlite).is_err());
}

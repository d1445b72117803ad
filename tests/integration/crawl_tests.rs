//! End-to-end crawls against mock servers

use crate::common::{create_test_config, mount_page, mount_response};
use site_ripple::config::Config;
use site_ripple::crawler::{CrawlSession, CrawlStats, StopReason};
use site_ripple::sink::{FetchStatus, MemorySink, TransportErrorKind};
use site_ripple::LinkClass;
use std::collections::HashSet;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_crawl(config: &Config) -> (CrawlStats, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let session = CrawlSession::new(config, sink.clone()).expect("Failed to create session");
    let stats = session.run().await;
    (stats, sink)
}

fn fetched_paths(sink: &MemorySink) -> Vec<String> {
    let mut paths: Vec<String> = sink
        .fetches()
        .iter()
        .map(|r| url::Url::parse(&r.url).unwrap().path().to_string())
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_seed_with_internal_and_external_links() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b", "http://other.test/x"]).await;
    mount_page(&server, "/a", &[]).await;
    mount_page(&server, "/b", &[]).await;

    let config = create_test_config(&server);
    let (stats, sink) = run_crawl(&config).await;

    assert_eq!(fetched_paths(&sink), vec!["/", "/a", "/b"]);
    assert!(sink.fetches().iter().all(|r| !r.url.contains("other.test")));
    assert!(sink.fetches().iter().all(|r| r.status == FetchStatus::Code(200)));

    let outlinks = sink.outlinks();
    assert_eq!(outlinks.len(), 3);
    let classes: Vec<(String, LinkClass)> = outlinks
        .into_iter()
        .map(|r| (r.url, r.class))
        .collect();
    assert!(classes.contains(&(format!("{}/a", server.uri()), LinkClass::Ok)));
    assert!(classes.contains(&(format!("{}/b", server.uri()), LinkClass::Ok)));
    assert!(classes.contains(&("http://other.test/x".to_string(), LinkClass::NotOk)));

    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.visited, 3);
    assert_eq!(stats.stop_reason, None);
}

#[tokio::test]
async fn test_cycle_terminates() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/b"]).await;
    mount_page(&server, "/b", &["/"]).await;

    let config = create_test_config(&server);
    let (stats, sink) = run_crawl(&config).await;

    assert_eq!(fetched_paths(&sink), vec!["/", "/b"]);
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.admitted, 2);
}

#[tokio::test]
async fn test_max_depth_one_never_fetches_children() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/c"]).await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>c</p>", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.crawler.max_depth = 1;
    let (stats, sink) = run_crawl(&config).await;

    assert_eq!(fetched_paths(&sink), vec!["/"]);
    let outlinks = sink.outlinks();
    assert_eq!(outlinks.len(), 1);
    assert_eq!(outlinks[0].url, format!("{}/c", server.uri()));
    assert_eq!(outlinks[0].class, LinkClass::Ok);
    assert_eq!(stats.fetched, 1);
}

#[tokio::test]
async fn test_depth_bound_on_a_chain() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/1"]).await;
    mount_page(&server, "/1", &["/2"]).await;
    mount_page(&server, "/2", &["/3"]).await;
    mount_page(&server, "/3", &["/4"]).await;

    let mut config = create_test_config(&server);
    config.crawler.max_depth = 3;
    let (_, sink) = run_crawl(&config).await;

    assert_eq!(fetched_paths(&sink), vec!["/", "/1", "/2"]);
}

#[tokio::test]
async fn test_transport_error_is_logged_and_crawl_continues() {
    let server = MockServer::start().await;
    // Same host as the seed, but nothing listens on port 1
    mount_page(&server, "/", &["http://127.0.0.1:1/down", "/a"]).await;
    mount_page(&server, "/a", &[]).await;

    let config = create_test_config(&server);
    let (stats, sink) = run_crawl(&config).await;

    let fetches = sink.fetches();
    assert_eq!(fetches.len(), 3);

    let down = fetches
        .iter()
        .find(|r| r.url == "http://127.0.0.1:1/down")
        .expect("unreachable URL should be in the fetch log");
    assert_eq!(down.status, FetchStatus::Transport(TransportErrorKind::Connect));

    assert!(sink.visits().iter().all(|v| v.url != "http://127.0.0.1:1/down"));
    assert!(fetched_paths(&sink).contains(&"/a".to_string()));
    assert_eq!(stats.non_success, 1);
    assert_eq!(stats.visited, 2);
}

#[tokio::test]
async fn test_page_cap_is_respected() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/p1", "/p2", "/p3", "/p4", "/p5"]).await;
    for page in ["/p1", "/p2", "/p3", "/p4", "/p5"] {
        mount_page(&server, page, &[]).await;
    }

    let mut config = create_test_config(&server);
    config.crawler.max_pages = 2;
    let (stats, sink) = run_crawl(&config).await;

    assert_eq!(sink.fetches().len(), 2);
    assert!(sink.visits().len() <= 2);
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.stop_reason, Some(StopReason::PageLimit));
}

#[tokio::test]
async fn test_failure_cap_stops_admission() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/e1", "/e2", "/e3", "/e4", "/e5"]).await;
    for page in ["/e1", "/e2", "/e3", "/e4", "/e5"] {
        mount_response(&server, page, 500, b"boom".to_vec(), "text/html").await;
    }

    let mut config = create_test_config(&server);
    config.crawler.max_failures = 2;
    config.crawler.concurrency = 1;
    let (stats, sink) = run_crawl(&config).await;

    assert_eq!(fetched_paths(&sink), vec!["/", "/e1", "/e2"]);
    assert_eq!(stats.non_success, 2);
    assert_eq!(stats.stop_reason, Some(StopReason::FailureLimit));
    assert_eq!(stats.discarded, 3);
}

#[tokio::test]
async fn test_content_types() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/data.json", "/logo.png", "/paper.pdf"]).await;
    mount_response(&server, "/data.json", 200, b"{}".to_vec(), "application/json").await;
    mount_response(&server, "/logo.png", 200, vec![0u8; 1500], "image/png").await;
    mount_response(
        &server,
        "/paper.pdf",
        200,
        b"%PDF-1.4 no anchors here".to_vec(),
        "application/pdf",
    )
    .await;

    let config = create_test_config(&server);
    let (stats, sink) = run_crawl(&config).await;

    assert_eq!(sink.fetches().len(), 4);

    let visits = sink.visits();
    assert_eq!(visits.len(), 3);
    assert!(visits.iter().all(|v| !v.url.ends_with("/data.json")));

    let image = visits
        .iter()
        .find(|v| v.url.ends_with("/logo.png"))
        .expect("image should be visited");
    assert_eq!(image.outlink_count, 0);
    assert_eq!(image.size_bytes, 1500);
    assert_eq!(image.content_type, "image/png");

    assert_eq!(stats.non_success, 0);
}

#[tokio::test]
async fn test_each_url_fetched_once_under_concurrency() {
    let server = MockServer::start().await;
    let pages: Vec<String> = (0..12).map(|i| format!("/p{}", i)).collect();
    let hrefs: Vec<&str> = pages.iter().map(String::as_str).collect();

    mount_page(&server, "/", &hrefs).await;
    for page in &pages {
        // every page links to every other page and back to the seed
        let mut links = hrefs.clone();
        links.push("/");
        mount_page(&server, page, &links).await;
    }

    let mut config = create_test_config(&server);
    config.crawler.concurrency = 8;
    let (stats, sink) = run_crawl(&config).await;

    let fetched: Vec<String> = sink.fetches().into_iter().map(|r| r.url).collect();
    let unique: HashSet<&String> = fetched.iter().collect();
    assert_eq!(fetched.len(), 13);
    assert_eq!(unique.len(), fetched.len());
    assert_eq!(stats.admitted, 13);

    // every visited page has exactly one successful fetch row
    for visit in sink.visits() {
        let rows: Vec<_> = sink.fetches().into_iter().filter(|f| f.url == visit.url).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].status.is_success());
    }
}

#[tokio::test]
async fn test_work_never_leaves_seed_domain() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        &[
            "/inside",
            "https://elsewhere.test/",
            "//cdn.other.test/lib.js",
            "mailto:someone@site.test",
            "#top",
        ],
    )
    .await;
    mount_page(&server, "/inside", &["http://third.test/page"]).await;

    let config = create_test_config(&server);
    let (_, sink) = run_crawl(&config).await;

    let seed_host = url::Url::parse(&server.uri()).unwrap();
    for fetch in sink.fetches() {
        let fetched = url::Url::parse(&fetch.url).unwrap();
        assert_eq!(fetched.host_str(), seed_host.host_str());
    }

    // mailto and fragment-only hrefs are dropped before logging
    let logged: Vec<String> = sink.outlinks().into_iter().map(|r| r.url).collect();
    assert_eq!(logged.len(), 4);
    assert!(logged.contains(&"http://cdn.other.test/lib.js".to_string()));
}

#[tokio::test]
async fn test_independent_sessions_in_one_process() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, "/", &["/shared"]).await;
    mount_page(&first, "/shared", &[]).await;
    mount_page(&second, "/", &["/shared"]).await;
    mount_page(&second, "/shared", &[]).await;

    let first_config = create_test_config(&first);
    let second_config = create_test_config(&second);
    let (a, b) = tokio::join!(run_crawl(&first_config), run_crawl(&second_config));

    assert_eq!(a.0.fetched, 2);
    assert_eq!(b.0.fetched, 2);
}

//! Helpers shared by the integration tests

use site_ripple::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at the mock server's root
pub fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::for_seed(format!("{}/", server.uri()));
    config.crawler.max_pages = 100;
    config.crawler.max_depth = 5;
    config.crawler.max_failures = 100;
    config.crawler.concurrency = 4;
    config.crawler.request_timeout_secs = Some(5);
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

/// Builds an HTML page with one anchor per href
pub fn html_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();
    format!("<html><head><title>Test</title></head><body>\n{}</body></html>", anchors)
}

/// Serves an HTML page linking to `hrefs` at `page`
pub async fn mount_page(server: &MockServer, page: &str, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page(hrefs), "text/html"))
        .mount(server)
        .await;
}

/// Serves `body` with the given status and content type at `page`
pub async fn mount_response(server: &MockServer, page: &str, status: u16, body: Vec<u8>, mime: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, mime))
        .mount(server)
        .await;
}

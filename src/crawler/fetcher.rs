//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - A single GET attempt per URL (no retries)
//! - Classifying the Content-Type of the response
//! - Mapping request failures to transport error kinds

use crate::config::UserAgentConfig;
use crate::sink::TransportErrorKind;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Kind of content a response carries, judged from its Content-Type header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Pdf,
    /// Legacy word processor documents (`application/msword`)
    Document,
    Image,
    /// Anything else, including a missing header
    Unsupported,
}

impl ContentKind {
    /// Classifies a Content-Type header value
    ///
    /// Matching is by substring on the lowercased value, so
    /// `text/html; charset=utf-8` and `application/xhtml+xml` are both HTML.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            return Self::Unsupported;
        };
        let value = value.to_ascii_lowercase();

        if value.contains("html") {
            Self::Html
        } else if value.contains("pdf") {
            Self::Pdf
        } else if value.contains("msword") {
            Self::Document
        } else if value.contains("image") {
            Self::Image
        } else {
            Self::Unsupported
        }
    }

    /// Returns true if a successful response of this kind is recorded as a visit
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Returns true if hrefs should be extracted from the body
    pub fn extracts_links(&self) -> bool {
        matches!(self, Self::Html | Self::Pdf | Self::Document)
    }
}

/// Result of a fetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    /// A response was received
    Response {
        /// HTTP status code
        status: u16,
        /// Raw Content-Type header value
        content_type: Option<String>,
        /// Response body; only read for 2xx responses with an accepted content type
        body: Option<Vec<u8>>,
    },

    /// No usable response was received
    Transport {
        kind: TransportErrorKind,
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy. Without a configured timeout,
/// the client's default (no overall timeout) applies.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Optional overall request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: Option<u64>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.header_value())
        .gzip(true)
        .brotli(true);

    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Fetches a URL with a single GET request
///
/// The body is only read when the status is 2xx and the content type is one
/// the crawler records; a body that fails to stream is reported as
/// [`TransportErrorKind::Body`].
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::Transport {
                kind: classify_error(&e),
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let wants_body =
        status.is_success() && ContentKind::from_content_type(content_type.as_deref()).is_accepted();
    if !wants_body {
        return FetchOutcome::Response {
            status: status.as_u16(),
            content_type,
            body: None,
        };
    }

    match response.bytes().await {
        Ok(body) => FetchOutcome::Response {
            status: status.as_u16(),
            content_type,
            body: Some(body.to_vec()),
        },
        Err(e) => FetchOutcome::Transport {
            kind: TransportErrorKind::Body,
            error: e.to_string(),
        },
    }
}

fn classify_error(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_redirect() {
        TransportErrorKind::Redirect
    } else if error.is_body() || error.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Request
    }
}

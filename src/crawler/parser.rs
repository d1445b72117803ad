//! Link extraction from fetched markup
//!
//! Only `<a href="...">` values are collected, raw and in document order.
//! Resolving them against the page URL is left to
//! [`crate::url::resolve_href`].

use scraper::{Html, Selector};

/// Extracts the raw `href` value of every anchor in `markup`
///
/// # Example
///
/// ```
/// use site_ripple::crawler::extract_hrefs;
///
/// let html = r#"<a href="/a">A</a><a href="http://other.test/x">X</a><a>none</a>"#;
/// assert_eq!(extract_hrefs(html), vec!["/a", "http://other.test/x"]);
/// ```
pub fn extract_hrefs(markup: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(markup);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Like [`extract_hrefs`], for bodies that may not be valid UTF-8
pub fn extract_hrefs_from_bytes(body: &[u8]) -> Vec<String> {
    extract_hrefs(&String::from_utf8_lossy(body))
}

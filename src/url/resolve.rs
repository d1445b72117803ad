use url::Url;

/// Resolves a raw href against the page it was found on
///
/// This is a total function: every input maps to either an absolute
/// http(s) URL or `None`.
///
/// **Dropped (returns `None`):**
/// - empty or whitespace-only hrefs
/// - fragment-only hrefs (`#section`)
/// - hrefs that fail to parse against the base
/// - anything that does not resolve to `http` or `https`
///   (`mailto:`, `javascript:`, `tel:`, `data:`, `ftp://`, ...)
/// - URLs without a host
///
/// **Resolved:**
/// - absolute URLs (`https://other.com/x`)
/// - scheme-relative URLs (`//cdn.example.com/x`)
/// - root-relative and path-relative references (`/a`, `b/c`, `../d`, `?q=1`)
///
/// The fragment is removed from every resolved URL.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_ripple::url::resolve_href;
///
/// let base = Url::parse("https://example.com/news/today").unwrap();
/// let url = resolve_href(&base, "/sports#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/sports");
///
/// assert!(resolve_href(&base, "mailto:desk@example.com").is_none());
/// assert!(resolve_href(&base, "#comments").is_none());
/// ```
pub fn resolve_href(base: &Url, raw: &str) -> Option<Url> {
    let href = raw.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if resolved.host_str().map_or(true, str::is_empty) {
        return None;
    }

    Some(normalize_url(resolved))
}

/// Normalizes an absolute URL into the form used for deduplication
///
/// The URL parser already lowercases the host, drops default ports and
/// resolves dot segments; on top of that the fragment is removed, since it
/// never changes what the server returns.
pub fn normalize_url(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

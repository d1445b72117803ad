use url::{Host, Url};

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// The port is not part of the domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_ripple::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Derives a short site label used to name output files
///
/// A leading `www.` is dropped and the first remaining label is used, so
/// `www.nytimes.com` becomes `nytimes`. IP hosts keep every octet, joined
/// with underscores.
pub fn site_label(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.to_lowercase();
            let trimmed = domain.strip_prefix("www.").unwrap_or(&domain);
            trimmed
                .split('.')
                .find(|label| !label.is_empty())
                .map(str::to_string)
        }
        Host::Ipv4(addr) => Some(addr.to_string().replace('.', "_")),
        Host::Ipv6(addr) => Some(addr.to_string().replace(':', "_")),
    }
}

//! URL handling module for Site-Ripple
//!
//! This module provides href resolution, domain extraction, site labels and
//! the OK / N_OK outlink classification.

mod domain;
mod resolve;

use std::fmt;
use std::str::FromStr;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, site_label};
pub use resolve::{normalize_url, resolve_href};

/// Classification of an outlink relative to the seed domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Same host as the seed; eligible to be crawled
    Ok,
    /// Any other host; recorded but never crawled
    NotOk,
}

impl LinkClass {
    /// Returns true if links of this class may become work items
    pub fn is_crawlable(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The label written to the outlink log
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "N_OK",
        }
    }
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Self::Ok),
            "N_OK" => Ok(Self::NotOk),
            other => Err(format!("unknown link classification '{}'", other)),
        }
    }
}

/// Classifies an outlink against the seed domain
///
/// A link is [`LinkClass::Ok`] iff its host equals `seed_domain`
/// (case-insensitive, port ignored). This is a pure function of the URL's
/// host, so classifying the same links twice always gives the same result.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_ripple::url::{classify_link, LinkClass};
///
/// let inside = Url::parse("https://site.test/a").unwrap();
/// let outside = Url::parse("https://other.test/x").unwrap();
/// assert_eq!(classify_link(&inside, "site.test"), LinkClass::Ok);
/// assert_eq!(classify_link(&outside, "site.test"), LinkClass::NotOk);
/// ```
pub fn classify_link(url: &Url, seed_domain: &str) -> LinkClass {
    match extract_domain(url) {
        Some(domain) if domain.eq_ignore_ascii_case(seed_domain) => LinkClass::Ok,
        _ => LinkClass::NotOk,
    }
}

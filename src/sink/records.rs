//! Row types written to and read back from the crawl logs

use crate::url::LinkClass;
use std::fmt;
use std::str::FromStr;

/// Why a fetch could not produce a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportErrorKind {
    /// The request timed out
    Timeout,
    /// The connection could not be established (DNS, refused, TLS)
    Connect,
    /// The redirect chain could not be followed
    Redirect,
    /// The response body failed to stream
    Body,
    /// Any other request-level failure
    Request,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Request => "request",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "timeout" => Some(Self::Timeout),
            "connect" => Some(Self::Connect),
            "redirect" => Some(Self::Redirect),
            "body" => Some(Self::Body),
            "request" => Some(Self::Request),
            _ => None,
        }
    }
}

/// Prefix marking a transport error in the status column
const TRANSPORT_ERROR_PREFIX: &str = "error:";

/// Outcome column of a fetch log row
///
/// Serialized as the bare status code (`200`, `404`) or as
/// `error:<kind>` when no response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FetchStatus {
    /// A response was received with this HTTP status code
    Code(u16),
    /// No response was received
    Transport(TransportErrorKind),
}

impl FetchStatus {
    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Code(code) if (200..300).contains(code))
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Transport(kind) => write!(f, "{}{}", TRANSPORT_ERROR_PREFIX, kind.as_str()),
        }
    }
}

impl FromStr for FetchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(tag) = s.strip_prefix(TRANSPORT_ERROR_PREFIX) {
            return TransportErrorKind::from_tag(tag)
                .map(Self::Transport)
                .ok_or_else(|| format!("unknown transport error tag '{}'", tag));
        }

        s.parse::<u16>()
            .map(Self::Code)
            .map_err(|_| format!("invalid fetch status '{}'", s))
    }
}

/// One row of the fetch log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    pub url: String,
    pub status: FetchStatus,
}

/// One row of the visit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    pub url: String,
    pub size_bytes: u64,
    pub outlink_count: usize,
    pub content_type: String,
}

/// One row of the outlink log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlinkRecord {
    pub url: String,
    pub class: LinkClass,
}

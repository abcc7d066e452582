// src/error.rs
// =============================================================================
// The library's error type.
//
// Three kinds of failure reach callers and they are kept apart:
// - Network: the request never produced a response (DNS, connect, reset)
// - Http: a response arrived but with a non-2xx status
// - Decode: the body arrived but could not be understood
//
// Nothing here is retried. Listing parse problems never show up as errors;
// they degrade to missing fields instead (see scrape::listing).
// =============================================================================

use thiserror::Error;

/// Errors returned by the scraper, the detail client and the aggregator.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level failure: no HTTP response was received
    #[error("network error requesting {url}: {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-success status code
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// The body could not be decoded (bad JSON/YAML, unknown content coding)
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The configuration could not be turned into a working HTTP client
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn decode(url: &str, reason: impl ToString) -> Self {
        Error::Decode {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Status code for `Http` errors, `None` for everything else
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

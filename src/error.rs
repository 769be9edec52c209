//! Error types for the web2md crate

use std::path::PathBuf;
use thiserror::Error;

/// Result type for web2md operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for web2md operations
#[derive(Debug, Error)]
pub enum Error {
    /// The target URL could not be parsed or has no host
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// URL as given by the user
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Network failure while fetching the page
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        /// Page URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        /// Page URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The page is not an HTML document
    #[error("Unsupported content-type '{content_type}' for {url}")]
    UnsupportedContentType {
        /// Page URL
        url: String,
        /// Content type reported by the server
        content_type: String,
    },

    /// The converted page contained no Markdown
    #[error("No convertible content found at {url}")]
    EmptyContent {
        /// Page URL
        url: String,
    },

    /// Filesystem write failure
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Path that was being written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// HTTP client construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Wrap an IO error with the path it happened on
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}

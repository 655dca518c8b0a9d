//! Errors raised while resolving a remote schema.

use std::path::PathBuf;

/// Fatal remote-resolution failures. Cache failures are not here; they
/// degrade to warnings and never abort resolution.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The server answered with something other than 200.
    #[error("Failed to fetch remote schema: {status} - {status_text}")]
    FetchFailed { status: u16, status_text: String },

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The fetched schema could not be written locally.
    #[error("failed to write schema to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

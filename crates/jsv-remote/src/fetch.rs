//! HTTP GET of a remote schema.

use std::time::Duration;

use crate::error::RemoteError;

/// Response of an unauthenticated GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Fetches schema text by URL. Any HTTP status is a response, not an error.
#[allow(async_fn_in_trait)]
pub trait SchemaFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, RemoteError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("jsv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self { http })
    }
}

impl SchemaFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, RemoteError> {
        let http_err = |source: reqwest::Error| RemoteError::Http {
            url: url.to_string(),
            source,
        };

        let resp = self.http.get(url).send().await.map_err(http_err)?;
        let status = resp.status();
        // reqwest does not expose the server's reason phrase; use the canonical one.
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = resp.text().await.map_err(http_err)?;

        tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "schema fetched");

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

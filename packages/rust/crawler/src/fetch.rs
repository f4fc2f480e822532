//! Page fetching with a per-request timeout.
//!
//! The batch and discovery runs only need "give me the HTML at this URL".
//! [`PageFetcher`] is that seam; [`HttpFetcher`] is the `reqwest` version.

use std::future::Future;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use wikiloot_shared::{FetchConfig, Result, WikilootError};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Why a single page could not be fetched.
///
/// The `Display` text is what lands in the error ledger for the row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The URL could not be parsed (missing scheme, empty cell, ...).
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The request did not complete within the configured timeout.
    #[error("Timeout Error: {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status.
    #[error("HTTP Error {status}: {url}")]
    Status { url: String, status: u16 },

    /// Any other transport failure (DNS, connection reset, body decode).
    #[error("Request Error: {url}: {detail}")]
    Request { url: String, detail: String },
}

impl FetchError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { url: url.into() }
        } else if err.is_builder() {
            FetchError::InvalidUrl { url: url.into() }
        } else {
            FetchError::Request {
                url: url.into(),
                detail: err.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// Something that can turn a URL into an HTML body.
pub trait PageFetcher {
    /// Fetch `url` and return the response body.
    fn fetch(&self, url: &str) -> impl Future<Output = std::result::Result<String, FetchError>>;
}

/// `reqwest`-backed fetcher used by the CLI.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the runtime fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| WikilootError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let parsed = Url::parse(url.trim()).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }
}

//! HTTP access to the remote repository host.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use flora_shared::{FloraError, RemoteConfig, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Maximum response size we consider valid (10 MB).
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Status and (for 200 responses) body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: Some(body.into()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// Fetch a URL and report its status and body.
///
/// `Err(FloraError::Network)` means no HTTP response was obtained at all
/// (DNS, connect, timeout). Other errors reject a response that did arrive.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a client with the configured user agent and timeout.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FloraError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_body_bytes: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the body size cap.
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FloraError::Network(format!("{url}: {e}")))?;

        let status = response.status().as_u16();
        debug!(url, status, "fetched");
        if status != 200 {
            return Ok(FetchResponse::status(status));
        }

        let max = self.max_body_bytes;
        if let Some(len) = response.content_length() {
            if len > max as u64 {
                return Err(FloraError::validation(format!(
                    "{url}: response too large ({len} bytes, max {max})"
                )));
            }
        }

        // Content-Length may be absent (chunked), so the cap is enforced while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FloraError::Network(format!("{url}: failed to read body: {e}")))?
        {
            if bytes.len() + chunk.len() > max {
                return Err(FloraError::validation(format!(
                    "{url}: response exceeds {max} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = String::from_utf8(bytes)
            .map_err(|e| FloraError::parse(format!("{url}: body is not UTF-8: {e}")))?;

        Ok(FetchResponse::ok(body))
    }
}

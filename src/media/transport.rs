use super::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Raw HTTP response handed back to the pipeline. Status classification and
/// body parsing happen in the orchestrator, not here, because upstream also
/// signals failures through JSON bodies on error statuses.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Performs the single GET against the extraction endpoint. Injected into
/// [`super::MediaFetcher`] so tests can substitute canned responses, and so
/// callers can wrap it with cancellation (a wrapping transport returns
/// [`FetchError::Cancelled`] when its token fires).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// Production transport backed by reqwest. Carries a browser-identifying
/// user agent; some extraction endpoints reject requests without one.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            debug!("Request to extraction endpoint failed: {}", e);
            FetchError::Transport(e.status().map(|s| s.as_u16()))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            debug!("Failed to read response body: {}", e);
            FetchError::Transport(Some(status))
        })?;

        Ok(RawResponse { status, body })
    }
}

mod error;
mod normalize;
mod transport;
mod types;
mod validate;

pub use error::FetchError;
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{MediaResult, MediaVariant};
pub use validate::{validate, ValidationOutcome};

use crate::config::Config;
use crate::utils::sanitize_filename;
use anyhow::{Context, Result};
use normalize::normalize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use url::Url;

const FALLBACK_FILENAME_STEM: &str = "instagram_reel";

/// Runs the whole resolve sequence for one URL: validate, call the
/// extraction endpoint, normalize the reply. Holds no mutable state, so
/// concurrent fetches through one instance are independent.
pub struct MediaFetcher {
    endpoint: Url,
    transport: Box<dyn Transport>,
}

impl MediaFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = Url::parse(&config.api.endpoint)
            .with_context(|| format!("Invalid extraction endpoint: {}", config.api.endpoint))?;
        let transport = HttpTransport::new(&config.api.user_agent)?;

        info!("Media fetcher initialized with endpoint: {}", endpoint);

        Ok(Self {
            endpoint,
            transport: Box::new(transport),
        })
    }

    /// Builds a fetcher with a caller-supplied transport. Used by tests and
    /// by callers that wrap the HTTP transport (e.g. with cancellation).
    pub fn with_transport(endpoint: Url, transport: Box<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// Resolves a user-entered Instagram URL to a [`MediaResult`].
    ///
    /// One attempt only; retrying is the caller's decision. Every failure
    /// comes back as a classified [`FetchError`], and a failed call leaves
    /// the fetcher ready for the next one.
    pub async fn fetch(&self, input: &str) -> Result<MediaResult, FetchError> {
        let url = match validate(input) {
            ValidationOutcome::Valid(url) => url,
            ValidationOutcome::Invalid(reason) => {
                warn!("Rejected input: {}", reason);
                return Err(FetchError::InvalidUrl(reason.to_string()));
            }
        };

        let request_url = self.request_url(&url);
        debug!("Requesting extraction: {}", request_url);

        let response = self.transport.get(request_url.as_str()).await?;
        let parsed: Option<Value> = serde_json::from_str(&response.body).ok();

        if !(200..300).contains(&response.status) {
            // Upstream sometimes puts its failure message in a JSON body on
            // error statuses; surface that instead of the bare status.
            if let Some(raw) = &parsed {
                if let Err(err @ FetchError::UpstreamReported(_)) = normalize(raw) {
                    return Err(err);
                }
            }
            warn!(
                "Extraction endpoint returned http status {}",
                response.status
            );
            return Err(FetchError::Transport(Some(response.status)));
        }

        let raw = parsed.ok_or(FetchError::MalformedResponse)?;
        let result = normalize(&raw)?;

        info!("Resolved media url for {}", url);
        Ok(result)
    }

    fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", target);
        url
    }
}

/// Saves the resolved media into `dir` as
/// `<sanitized-title>_<unix-timestamp>.<extension>`.
pub async fn download_to_file(result: &MediaResult, dir: &Path) -> Result<PathBuf> {
    let stem = result
        .title
        .as_deref()
        .map(sanitize_filename)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME_STEM.to_string());

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the unix epoch")?
        .as_secs();

    let path = dir.join(format!("{}_{}.{}", stem, timestamp, result.extension));

    info!("Downloading media to {}", path.display());

    let bytes = reqwest::get(&result.media_url)
        .await
        .context("Failed to request media file")?
        .error_for_status()
        .context("Media host rejected the download")?
        .bytes()
        .await
        .context("Failed to read media file body")?;

    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved {} bytes", bytes.len());
    Ok(path)
}

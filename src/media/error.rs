use thiserror::Error;

/// Classified failures of the fetch pipeline. Every failure path ends up in
/// exactly one of these variants; nothing here is fatal to the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The input string is not an Instagram content URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network-level failure, or an HTTP error status with no usable error
    /// body. `None` means no response was received at all.
    #[error("request failed: {}", .0.map_or_else(|| "no response".to_string(), |s| format!("http status {s}")))]
    Transport(Option<u16>),

    /// Upstream replied 2xx but the body was not valid JSON.
    #[error("upstream returned a malformed response")]
    MalformedResponse,

    /// Upstream explicitly reported an error in its payload. The message is
    /// passed through as-is.
    #[error("{0}")]
    UpstreamReported(String),

    /// Upstream replied with well-formed JSON that contained no recognizable
    /// media URL.
    #[error("no media found in the upstream response")]
    NoMediaFound,

    /// The transport observed a cancellation request before completing.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether repeating the whole fetch sequence could plausibly succeed.
    /// Bad input and definitive upstream answers are not worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::MalformedResponse)
    }
}

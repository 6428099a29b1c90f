/// One downloadable rendition of the media, as advertised by upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaVariant {
    pub url: String,
    pub quality: String,
}

/// Canonical description of a downloadable asset, produced by normalization.
///
/// Only ever constructed once a non-empty absolute media URL has been found
/// in the upstream payload; everything else is optional metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaResult {
    pub media_url: String,
    pub extension: String,
    pub quality: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub thumbnail: Option<String>,
    pub duration_seconds: Option<u64>,
    pub views: Option<u64>,
    pub size_bytes: Option<u64>,
    pub size_label: Option<String>,
    /// Every rendition upstream offered; always contains at least the
    /// entry matching `media_url`.
    pub variants: Vec<MediaVariant>,
}

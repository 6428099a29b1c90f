use super::error::FetchError;
use super::types::{MediaResult, MediaVariant};
use crate::utils::format_size;
use serde_json::Value;
use url::Url;

const DEFAULT_EXTENSION: &str = "mp4";
const DEFAULT_QUALITY: &str = "HD";

/// Maps one of the upstream API's response shapes to a [`MediaResult`].
///
/// The extraction service has changed its payload layout several times, so
/// this tries each known shape in order and uses the first that yields a
/// usable URL:
///
/// 1. a direct `video` or `url` field,
/// 2. a `media` array (`media[0].url`, extra entries kept as variants),
/// 3. a `media` object (`media.url`),
/// 4. a nested `result` object (`result.url` plus its duration/quality/
///    extension/size fields).
///
/// An explicit upstream `error` field always wins over any URL also present
/// in the payload. No recognizable URL at all means [`FetchError::NoMediaFound`].
pub fn normalize(raw: &Value) -> Result<MediaResult, FetchError> {
    if let Some(message) = upstream_error(raw) {
        return Err(FetchError::UpstreamReported(message));
    }

    let meta = TopLevelMeta::from(raw);

    // Shape 1: direct field
    if let Some(url) = media_url(&raw["video"]).or_else(|| media_url(&raw["url"])) {
        return Ok(single_variant_result(url, &meta, None));
    }

    // Shape 2: media array
    if let Some(items) = raw["media"].as_array() {
        if let Some(url) = items.first().and_then(|item| media_url(&item["url"])) {
            let variants: Vec<MediaVariant> = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    media_url(&item["url"]).map(|url| MediaVariant {
                        url,
                        quality: quality_label(&item["quality"], i),
                    })
                })
                .collect();

            let quality = variants
                .first()
                .map(|v| v.quality.clone())
                .unwrap_or_else(|| DEFAULT_QUALITY.to_string());

            return Ok(MediaResult {
                media_url: url,
                extension: DEFAULT_EXTENSION.to_string(),
                quality,
                title: meta.title,
                author: meta.author,
                thumbnail: meta.thumbnail,
                duration_seconds: meta.duration_seconds,
                views: meta.views,
                size_bytes: None,
                size_label: None,
                variants,
            });
        }
    }

    // Shape 3: media object
    if let Some(url) = media_url(&raw["media"]["url"]) {
        let quality = str_field(&raw["media"]["quality"]).map(|q| q.to_uppercase());
        return Ok(single_variant_result(url, &meta, quality));
    }

    // Shape 4: nested result object
    let nested = &raw["result"];
    if let Some(url) = media_url(&nested["url"]) {
        let quality = str_field(&nested["quality"]);
        let extension = str_field(&nested["extension"]);
        let size_bytes = nested["size"].as_u64().filter(|&s| s > 0);
        let size_label = str_field(&nested["formattedSize"])
            .or_else(|| size_bytes.and_then(format_size));
        let duration = nested["duration"].as_u64().or(meta.duration_seconds);

        let quality = quality.unwrap_or_else(|| DEFAULT_QUALITY.to_string());
        let media_url = url.clone();
        return Ok(MediaResult {
            media_url,
            extension: extension.unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            quality: quality.clone(),
            title: meta.title,
            author: meta.author,
            thumbnail: meta.thumbnail,
            duration_seconds: duration,
            views: meta.views,
            size_bytes,
            size_label,
            variants: vec![MediaVariant { url, quality }],
        });
    }

    Err(FetchError::NoMediaFound)
}

/// Metadata the upstream puts next to the URL fields, present in several of
/// the payload shapes.
struct TopLevelMeta {
    title: Option<String>,
    author: Option<String>,
    thumbnail: Option<String>,
    duration_seconds: Option<u64>,
    views: Option<u64>,
}

impl TopLevelMeta {
    fn from(raw: &Value) -> Self {
        Self {
            title: str_field(&raw["title"]),
            author: str_field(&raw["author"]).or_else(|| str_field(&raw["username"])),
            thumbnail: str_field(&raw["thumbnail"]).or_else(|| str_field(&raw["image"])),
            duration_seconds: raw["duration"].as_u64(),
            views: raw["views"].as_u64(),
        }
    }
}

fn single_variant_result(url: String, meta: &TopLevelMeta, quality: Option<String>) -> MediaResult {
    let quality = quality.unwrap_or_else(|| DEFAULT_QUALITY.to_string());
    MediaResult {
        media_url: url.clone(),
        extension: DEFAULT_EXTENSION.to_string(),
        quality: quality.clone(),
        title: meta.title.clone(),
        author: meta.author.clone(),
        thumbnail: meta.thumbnail.clone(),
        duration_seconds: meta.duration_seconds,
        views: meta.views,
        size_bytes: None,
        size_label: None,
        variants: vec![MediaVariant { url, quality }],
    }
}

/// Extracts an upstream-reported error message, honoring the loose
/// truthiness the API uses: absent, `false`, `0`, `""` and `null` all mean
/// "no error".
fn upstream_error(raw: &Value) -> Option<String> {
    match &raw["error"] {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::Bool(true) => Some("upstream reported an error".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A usable media URL candidate: a non-empty string that parses as an
/// absolute URL. Anything else makes the strategy fall through.
fn media_url(value: &Value) -> Option<String> {
    str_field(value).filter(|s| Url::parse(s).is_ok())
}

fn str_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn quality_label(value: &Value, index: usize) -> String {
    str_field(value)
        .map(|q| q.to_uppercase())
        .unwrap_or_else(|| format!("Quality {}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_field_wins_over_url() {
        let raw = json!({ "error": "x", "url": "https://cdn/video.mp4" });
        assert_eq!(
            normalize(&raw),
            Err(FetchError::UpstreamReported("x".to_string()))
        );
    }

    #[test]
    fn test_falsy_error_field_is_ignored() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            let raw = json!({ "error": falsy, "url": "https://cdn/video.mp4" });
            let result = normalize(&raw).unwrap();
            assert_eq!(result.media_url, "https://cdn/video.mp4");
        }
    }

    #[test]
    fn test_boolean_error_gets_generic_message() {
        let raw = json!({ "error": true });
        assert_eq!(
            normalize(&raw),
            Err(FetchError::UpstreamReported(
                "upstream reported an error".to_string()
            ))
        );
    }

    #[test]
    fn test_direct_video_field() {
        let raw = json!({ "video": "https://cdn/clip.mp4" });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/clip.mp4");
        assert_eq!(result.extension, "mp4");
        assert_eq!(result.quality, "HD");
        assert_eq!(result.variants.len(), 1);
    }

    #[test]
    fn test_direct_url_field_with_metadata() {
        let raw = json!({
            "url": "https://cdn/clip.mp4",
            "title": "My Reel",
            "username": "someone",
            "thumbnail": "https://cdn/thumb.jpg",
            "duration": 12,
            "views": 1_500_000u64,
        });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.title.as_deref(), Some("My Reel"));
        assert_eq!(result.author.as_deref(), Some("someone"));
        assert_eq!(result.thumbnail.as_deref(), Some("https://cdn/thumb.jpg"));
        assert_eq!(result.duration_seconds, Some(12));
        assert_eq!(result.views, Some(1_500_000));
    }

    #[test]
    fn test_media_array() {
        let raw = json!({ "media": [{ "url": "https://cdn/a.mp4" }] });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/a.mp4");
        assert_eq!(result.extension, "mp4");
    }

    #[test]
    fn test_media_array_collects_variants() {
        let raw = json!({
            "media": [
                { "url": "https://cdn/hd.mp4", "quality": "hd" },
                { "url": "https://cdn/sd.mp4", "quality": "sd" },
                { "url": "https://cdn/other.mp4" },
            ]
        });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/hd.mp4");
        assert_eq!(result.quality, "HD");
        assert_eq!(
            result.variants,
            vec![
                MediaVariant {
                    url: "https://cdn/hd.mp4".to_string(),
                    quality: "HD".to_string()
                },
                MediaVariant {
                    url: "https://cdn/sd.mp4".to_string(),
                    quality: "SD".to_string()
                },
                MediaVariant {
                    url: "https://cdn/other.mp4".to_string(),
                    quality: "Quality 3".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_media_object() {
        let raw = json!({ "media": { "url": "https://cdn/b.mp4", "quality": "sd" } });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/b.mp4");
        assert_eq!(result.quality, "SD");
    }

    #[test]
    fn test_nested_result_object() {
        let raw = json!({
            "result": {
                "url": "https://cdn/x.mp4",
                "quality": "HD",
                "extension": "mp4",
                "duration": 30,
            }
        });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/x.mp4");
        assert_eq!(result.quality, "HD");
        assert_eq!(result.duration_seconds, Some(30));
    }

    #[test]
    fn test_nested_result_size_is_formatted() {
        let raw = json!({ "result": { "url": "https://cdn/b.mp4", "size": 1_048_576 } });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.size_bytes, Some(1_048_576));
        assert_eq!(result.size_label.as_deref(), Some("1 MB"));
    }

    #[test]
    fn test_nested_result_prefers_upstream_size_label() {
        let raw = json!({
            "result": {
                "url": "https://cdn/b.mp4",
                "size": 1_048_576,
                "formattedSize": "1.0 MiB",
            }
        });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.size_label.as_deref(), Some("1.0 MiB"));
    }

    #[test]
    fn test_nested_result_zero_size_has_no_label() {
        let raw = json!({ "result": { "url": "https://cdn/b.mp4", "size": 0 } });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.size_bytes, None);
        assert_eq!(result.size_label, None);
    }

    #[test]
    fn test_empty_payload_is_no_media() {
        assert_eq!(normalize(&json!({})), Err(FetchError::NoMediaFound));
    }

    #[test]
    fn test_unrecognized_shape_is_no_media() {
        let raw = json!({ "data": { "download": "https://cdn/c.mp4" } });
        assert_eq!(normalize(&raw), Err(FetchError::NoMediaFound));
    }

    #[test]
    fn test_relative_url_is_skipped() {
        // a bare filename is not a usable download target
        assert_eq!(
            normalize(&json!({ "url": "clip.mp4" })),
            Err(FetchError::NoMediaFound)
        );
    }

    #[test]
    fn test_empty_direct_field_falls_through_to_media_array() {
        let raw = json!({ "url": "", "media": [{ "url": "https://cdn/a.mp4" }] });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/a.mp4");
    }

    #[test]
    fn test_direct_field_precedes_media_array() {
        let raw = json!({
            "video": "https://cdn/direct.mp4",
            "media": [{ "url": "https://cdn/array.mp4" }],
        });
        let result = normalize(&raw).unwrap();
        assert_eq!(result.media_url, "https://cdn/direct.mp4");
    }
}

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches Instagram content URLs: optional scheme, optional "www.", the
/// instagram.com host, a reel/p/stories path and a non-empty shortcode
/// segment. Anything after the shortcode is ignored.
static INSTAGRAM_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?instagram\.com/(?:reel|p|stories)/[^/?#&]+")
        .expect("instagram url regex")
});

/// Outcome of URL validation. Carries the accepted URL or the reason it was
/// rejected, so callers can surface something better than a bare boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(String),
    Invalid(&'static str),
}

/// Checks whether the input looks like an Instagram post, reel or story URL.
///
/// Pure syntax check; whether the upstream extractor can actually resolve
/// the content (stories in particular) is decided later in the pipeline.
/// Trimming whitespace is the caller's responsibility.
pub fn validate(input: &str) -> ValidationOutcome {
    if INSTAGRAM_URL_REGEX.is_match(input) {
        ValidationOutcome::Valid(input.to_string())
    } else {
        ValidationOutcome::Invalid("not an instagram url")
    }
}

//! Small text helpers for environment values, base URLs and API error bodies.

/// Characters of a remote error body kept in error messages.
pub const ERROR_EXCERPT_LEN: usize = 180;

/// Trimmed value of an optional setting; blank counts as unset.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Base URL without trailing slashes, or `None` unless it is an http(s) URL
/// with a host.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let url = raw.trim().trim_end_matches('/');
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    if host.is_empty() || host.starts_with('/') {
        return None;
    }
    Some(url.to_string())
}

/// One-line excerpt of an API error body.
///
/// Zotero answers failures with plain text that may span several lines.
pub fn error_excerpt(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(ERROR_EXCERPT_LEN)
        .collect()
}

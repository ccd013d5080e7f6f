//! Turns a pasted link into a recognised platform and handle.

use crate::constants::DEFAULT_SCHEME;
use crate::error::RecognizeError;
use crate::platform::PlatformId;

/// Result of a successful recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognized {
    pub platform: PlatformId,
    /// Raw handle as it appears in the link, without display prefix.
    pub handle: String,
    /// Trimmed, scheme-qualified link. This is the form that gets stored.
    pub canonical_url: String,
}

fn has_scheme(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Trim and scheme-qualify a link. Case is preserved.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}

/// True when the normalized input parses as an absolute URL with a host.
pub fn is_valid_url(raw: &str) -> bool {
    let normalized = normalize_url(raw);
    if normalized.is_empty() {
        return false;
    }
    match url::Url::parse(&normalized) {
        Ok(parsed) => parsed.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Match a link against the platform table in priority order.
pub fn recognize(raw: &str) -> Result<Recognized, RecognizeError> {
    let canonical_url = normalize_url(raw);
    if canonical_url.is_empty() {
        return Err(RecognizeError::EmptyInput);
    }

    for platform in PlatformId::all() {
        if let Some(handle) = platform.descriptor().extract(&canonical_url) {
            tracing::debug!(platform = platform.as_str(), %handle, "Recognized link");
            return Ok(Recognized {
                platform,
                handle,
                canonical_url,
            });
        }
    }

    Err(RecognizeError::UnsupportedPlatform)
}

/// Display form of a handle. Applying it twice changes nothing.
pub fn format_handle(platform: PlatformId, handle: &str) -> String {
    let prefix = platform.descriptor().handle_prefix;
    if prefix.is_empty() || handle.starts_with(prefix) {
        handle.to_string()
    } else {
        format!("{prefix}{handle}")
    }
}

/// Canonical profile link for a handle, which may carry its display prefix.
pub fn profile_url(platform: PlatformId, handle: &str) -> String {
    let descriptor = platform.descriptor();
    let raw = handle
        .trim()
        .strip_prefix(descriptor.handle_prefix)
        .unwrap_or(handle.trim());
    descriptor.profile_url(raw)
}

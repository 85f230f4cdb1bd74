// relsync-net/src/validation.rs
use relsync_common::error::{RelsyncError, Result};
use url::Url;

/// Validates a URL, ensuring it uses the HTTPS scheme.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| {
        RelsyncError::ValidationError(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    if url.scheme() == "https" {
        Ok(url)
    } else {
        Err(RelsyncError::ValidationError(format!(
            "Invalid URL scheme for '{}': Must be https, but got '{}'",
            url_str,
            url.scheme()
        )))
    }
}

/// Strips the RFC 6570 template suffix GitHub appends to upload URLs
/// (`.../assets{?name,label}`).
pub fn strip_uri_template(url: &str) -> &str {
    url.split('{').next().unwrap_or(url)
}

use thiserror::Error;
use url::Url;

/// Why a URL was refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// http(s) URL without a host.
    #[error("URL has no host")]
    MissingHost,
}

/// Validate an article URL before handing it to the system browser.
///
/// Article links come from the backend's news sources, so only `http` and
/// `https` URLs with a host are passed on. Anything else (`file://`,
/// `javascript:`, custom handlers) could launch arbitrary programs via
/// the OS opener.
///
/// ```
/// use cognos::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://example.com/story").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}

//! Target URL construction for balancer probes
//!
//! Joins the balancer base address and the API path into the single URL that
//! every probe in a run requests:
//! - `http://balancer:8090` + `/api/v1/some-data` → `http://balancer:8090/api/v1/some-data`
//! - exactly one slash at the join, query strings on the path are preserved
//! - only http/https targets with a host are accepted

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL format: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Missing host in URL")]
    MissingHost,
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Build the probe URL from a base address and an API path
///
/// # Examples
/// - `http://balancer:8090` + `/api/v1/some-data` → `http://balancer:8090/api/v1/some-data`
/// - `http://balancer:8090/` + `api/v1/some-data` → `http://balancer:8090/api/v1/some-data`
/// - `http://lb.local/prefix` + `/ping?x=1` → `http://lb.local/prefix/ping?x=1`
/// - `http://balancer:8090` + `` → `http://balancer:8090/`
///
/// # Errors
/// * `UrlError::ParseError` - base or joined URL does not parse
/// * `UrlError::MissingHost` - base has no host component
/// * `UrlError::UnsupportedScheme` - scheme other than http/https
pub fn build_request_url(base_url: &str, api_path: &str) -> Result<String, UrlError> {
    let base = Url::parse(base_url.trim())?;
    validate_target(&base)?;

    let path = api_path.trim().trim_start_matches('/');
    let joined = format!("{}/{}", normalize_base_url(base.as_str()), path);

    let url = Url::parse(&joined)?;
    validate_target(&url)?;
    Ok(url.to_string())
}

/// Normalize base URL by trimming trailing slashes
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Mask userinfo so a URL can be written to logs
///
/// `http://user:secret@lb:8090/x` → `http://***@lb:8090/x`. Strings that do not
/// parse as URLs are returned unchanged.
pub fn redact_url(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            if !url.username().is_empty() || url.password().is_some() {
                let _ = url.set_password(None);
                let _ = url.set_username("***");
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

fn validate_target(url: &Url) -> Result<(), UrlError> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }
    Ok(())
}

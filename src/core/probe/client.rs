//! Probe Client Implementations
//!
//! HTTP client abstraction for balancer probes: GET method, no body, one
//! named response header surfaced, response body drained before returning.

use crate::core::probe::error::ProbeError;
use std::time::{Duration, Instant};

use isahc::config::{Configurable, RedirectPolicy};
use isahc::{AsyncReadResponseExt, HttpClient, Request};

const USER_AGENT: &str = concat!("lbprobe/", env!("CARGO_PKG_VERSION"));

/// Result of one completed GET against the balancer
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    /// HTTP status code returned by the balancer
    pub status_code: u16,
    /// Value of the backend identifier header, `None` when absent or empty
    pub backend: Option<String>,
    /// Time from send until the body was fully read
    pub duration: Duration,
}

/// HTTP client used by the distribution tester
///
/// Implementations must issue a GET without a body, honour the timeout for
/// the whole exchange and read the body to completion so the connection is
/// released before the next probe starts.
#[async_trait::async_trait]
pub trait ProbeClient: Send + Sync {
    /// Execute one GET request and extract `header` from the response
    ///
    /// # Returns
    /// * `Ok(ProbeResponse)` - A response was received (any status code)
    /// * `Err(String)` - Network error, timeout or request construction failure
    async fn get(&self, url: &str, header: &str, timeout_ms: u32)
        -> Result<ProbeResponse, String>;
}

/// Extract a backend identifier from a raw header value
///
/// Leading and trailing whitespace is ignored; an empty value counts as absent.
pub fn backend_from_header(value: Option<&[u8]>) -> Option<String> {
    let raw = value?;
    let text = std::str::from_utf8(raw).ok()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Production probe client implementation using isahc
pub struct IsahcProbeClient {
    client: HttpClient,
}

#[async_trait::async_trait]
impl ProbeClient for IsahcProbeClient {
    async fn get(
        &self,
        url: &str,
        header: &str,
        timeout_ms: u32,
    ) -> Result<ProbeResponse, String> {
        let start = Instant::now();

        let request = Request::get(url)
            .timeout(Duration::from_millis(timeout_ms as u64))
            .header("User-Agent", USER_AGENT)
            .body(())
            .map_err(|e| format!("Request creation failed: {}", e))?;

        let mut response = self
            .client
            .send_async(request)
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status_code = response.status().as_u16();
        let backend = backend_from_header(response.headers().get(header).map(|v| v.as_bytes()));

        // Drain the body so the connection is free for the next probe
        response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))?;

        Ok(ProbeResponse {
            status_code,
            backend,
            duration: start.elapsed(),
        })
    }
}

impl IsahcProbeClient {
    pub fn new() -> Result<Self, ProbeError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::None)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

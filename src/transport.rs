//! Resilient Transport
//!
//! Issues one logical HTTP request with bounded retry over transient
//! network failures. Connection errors and timeouts are retried with a
//! constant backoff; an HTTP response of any status is returned as-is,
//! because retrying application-level errors is the caller's decision.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::HeraldError;

/// Fixed delay between attempts. Constant, not exponential.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Default retry budget: up to this many retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default per-attempt timeout; callers override per API class.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully-resolved outbound request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
    pub retries: u32,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a `Authorization: Bearer <token>` header.
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Raw HTTP response: status code plus unparsed body text.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Whether a request error is worth another attempt.
///
/// Connection-level failures (refused, reset, DNS) and per-attempt
/// timeouts are transient; everything else fails immediately.
pub fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// The retrying HTTP transport shared by all API clients.
pub struct Transport {
    http: Client,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Send a request, retrying transient network failures.
    ///
    /// Makes at most `retries + 1` physical attempts with a constant
    /// interval between them. Each attempt is independent; there is no
    /// idempotency key, so callers must tolerate duplicate delivery of
    /// non-idempotent requests on the server side.
    pub async fn send(&self, spec: &RequestSpec) -> Result<RawResponse, HeraldError> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            match self.attempt(spec).await {
                Ok(response) => {
                    debug!(
                        "{} {} -> {} (attempt {})",
                        spec.method, spec.url, response.status, attempts
                    );
                    return Ok(response);
                }
                Err(err) if is_transient(&err) && attempts <= spec.retries => {
                    warn!(
                        "{} {} failed on attempt {}/{}: {}",
                        spec.method,
                        spec.url,
                        attempts,
                        spec.retries + 1,
                        err
                    );
                    sleep(RETRY_BACKOFF).await;
                }
                Err(err) => {
                    return Err(HeraldError::TransportExhausted {
                        attempts,
                        source: err,
                    });
                }
            }
        }
    }

    /// One physical attempt: build, send, and read the response body.
    async fn attempt(&self, spec: &RequestSpec) -> Result<RawResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(spec.method.clone(), &spec.url)
            .timeout(spec.timeout);

        for (name, value) in &spec.headers {
            builder = builder.header(name, value);
        }

        if let Some(ref body) = spec.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

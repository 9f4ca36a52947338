//! Resilient HTTP client for the metering API
//!
//! Wraps reqwest with tenant-scoping headers, retry with exponential
//! backoff on transient failures, and request/response debug logging.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::HarnessConfig;
use crate::utils::{truncate, Timer};

/// Tenant header sent with every request
pub const TENANT_HEADER: &str = "X-Tenant-Slug";

/// The events endpoint reads the tenant from a differently named header
pub const EVENTS_TENANT_HEADER: &str = "X-Tenant";

/// Statuses treated as transient
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Body excerpt length in debug logs and failure messages
pub const BODY_PREVIEW_CHARS: usize = 200;

/// Transport-level failures
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection failed to {0}")]
    ConnectionFailed(String),

    #[error("Retries exhausted after {attempts} attempts (last status {status})")]
    RetriesExhausted { attempts: u32, status: u16 },

    #[error("Invalid header {0}")]
    InvalidHeader(String),

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl TransportError {
    /// Connection-level failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_) | TransportError::ConnectionFailed(_)
        )
    }
}

/// Retry schedule for transient failures
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.max_retries, config.backoff_factor)
    }

    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Sleep before retry number `attempt` (0-based): backoff_factor * 2^attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = self.backoff_factor * 2f64.powi(attempt.min(i32::MAX as u32) as i32);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Per-call request options
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `body` as the JSON request body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, TransportError> {
        let value =
            serde_json::to_value(body).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Per-call header; wins over a default header with the same name
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// HTTP client with tenant headers and retry
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tenant_slug: String,
    default_headers: HeaderMap,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Create a client from harness configuration
    pub fn new(config: &HarnessConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            HeaderName::from_static("x-tenant-slug"),
            HeaderValue::from_str(&config.tenant_slug)
                .map_err(|_| TransportError::InvalidHeader(TENANT_HEADER.to_string()))?,
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant_slug: config.tenant_slug.clone(),
            default_headers,
            timeout_secs: config.timeout_secs,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn tenant_slug(&self) -> &str {
        &self.tenant_slug
    }

    /// Build full URL
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Default headers overlaid with per-call headers
    fn merge_headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut headers = self.default_headers.clone();
        for (key, value) in overrides {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| TransportError::InvalidHeader(key.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Send a request, retrying transient failures
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.build_url(endpoint);
        let headers = self.merge_headers(&options.headers)?;
        let timer = Timer::start(format!("{method} {endpoint}"));
        let mut attempt: u32 = 0;

        loop {
            match self.send_once(&method, &url, &headers, &options).await {
                Ok(response) if RetryPolicy::is_retryable_status(response.status) => {
                    if attempt >= self.retry.max_retries {
                        error!(
                            "{} {} still returning {} after {} attempts ({:.3}s)",
                            method,
                            url,
                            response.status,
                            attempt + 1,
                            timer.elapsed_secs()
                        );
                        return Err(TransportError::RetriesExhausted {
                            attempts: attempt + 1,
                            status: response.status,
                        });
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        status = response.status,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying {} {}",
                        method,
                        url
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    return Ok(response.timed(timer.stop()));
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying {} {} after transport error",
                        method,
                        url
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("Request failed after {:.3}s: {}", timer.elapsed_secs(), e);
                    return Err(e);
                }
            }
            attempt += 1;
        }
    }

    /// Single attempt, no retry
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        options: &RequestOptions,
    ) -> Result<ApiResponse, TransportError> {
        debug!("→ {} {}", method, url);
        if let Some(body) = &options.body {
            debug!(
                "  Request Body: {}",
                truncate(&body.to_string(), BODY_PREVIEW_CHARS)
            );
        }
        if !options.query.is_empty() {
            debug!("  Query Params: {:?}", options.query);
        }

        let mut req_builder = self
            .client
            .request(method.clone(), url)
            .headers(headers.clone());

        if !options.query.is_empty() {
            req_builder = req_builder.query(&options.query);
        }

        if let Some(body) = &options.body {
            req_builder = req_builder.json(body);
        }

        let timer = Timer::start(url);

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                TransportError::ConnectionFailed(url.to_string())
            } else {
                TransportError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout_secs)
            } else {
                TransportError::RequestFailed(format!("Failed to read response body: {e}"))
            }
        })?;

        let duration = timer.stop();
        debug!(
            "← {} {} ({:.3}s)",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            duration.as_secs_f64()
        );
        if !body.is_empty() {
            debug!("  Response Body: {}", truncate(&body, BODY_PREVIEW_CHARS));
        }

        Ok(ApiResponse::new(status.as_u16(), body).timed(duration))
    }

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, endpoint, RequestOptions::new())
            .await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, endpoint, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<ApiResponse, TransportError> {
        self.request(Method::PUT, endpoint, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, TransportError> {
        self.request(Method::DELETE, endpoint, RequestOptions::new())
            .await
    }

    /// DELETE carrying a JSON body (assignment termination)
    pub async fn delete_with_body<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<ApiResponse, TransportError> {
        self.request(Method::DELETE, endpoint, RequestOptions::new().json(body)?)
            .await
    }
}

/// HTTP response as seen by test cases
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub duration_ms: u64,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            duration_ms: 0,
        }
    }

    pub fn timed(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Decode the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

//! HTTP transport to the inference provider.
//!
//! The transport performs exactly one network call per invocation and never
//! retries. Network faults come back as [`TransportFailure`] values so the
//! caller can classify them instead of unwinding.

use crate::config::Credential;
use crate::error::Result;
use crate::payload::WireBody;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Status and body exactly as the provider returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    Timeout,
    Connect,
    Other,
}

/// Marker for a call that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: TransportFailureKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::new(
                TransportFailureKind::Timeout,
                format!("request timed out after {}s", timeout.as_secs()),
            )
        } else if error.is_connect() {
            Self::new(TransportFailureKind::Connect, format!("connection failed: {}", error))
        } else {
            Self::new(TransportFailureKind::Other, format!("request failed: {}", error))
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub type TransportResult = std::result::Result<RawResponse, TransportFailure>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` as JSON with a bearer credential.
    async fn post_json(&self, url: &Url, body: &WireBody, credential: &Credential) -> TransportResult;

    /// GETs `url` with only the bearer credential. Used by the status probe.
    async fn get(&self, url: &Url, credential: &Credential) -> TransportResult;
}

/// [`Transport`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn finish(&self, response: reqwest::Result<reqwest::Response>) -> TransportResult {
        let response = response.map_err(|e| {
            let failure = TransportFailure::from_reqwest(e, self.timeout);
            warn!(error = %failure, "Inference request failed before a response arrived");
            failure
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure::from_reqwest(e, self.timeout))?;

        debug!(status, body_len = body.len(), "Received provider response");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &Url, body: &WireBody, credential: &Credential) -> TransportResult {
        debug!(%url, image_parts = body.image_parts(), "Sending inference request");

        let response = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, credential.bearer())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await;

        self.finish(response).await
    }

    async fn get(&self, url: &Url, credential: &Credential) -> TransportResult {
        debug!(%url, "Probing model status");

        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, credential.bearer())
            .send()
            .await;

        self.finish(response).await
    }
}

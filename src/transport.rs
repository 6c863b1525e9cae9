//! # HTTP Transport
//!
//! The seam between the job client and the network. [`ReqwestTransport`] is
//! the production implementation; tests substitute scripted transports.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Status, poll URL and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// `Location` header value, if the server sent one
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            location: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Body as text for diagnostics
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal HTTP surface the job client needs
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Get the transport name for debugging/logging.
    fn transport_name(&self) -> &'static str;

    /// POST a JSON body
    async fn post_json(
        &self,
        url: &Url,
        authorization: &HeaderValue,
        body: &Value,
    ) -> ClientResult<RawResponse>;

    /// GET a status URL
    async fn get(&self, url: &Url, authorization: &HeaderValue) -> ClientResult<RawResponse>;
}

/// Find the poll URL in a header map.
///
/// `HeaderMap` stores names lowercased, so `LOCATION` matches any casing
/// the server sent. The first non-empty value wins.
pub fn extract_location(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LOCATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// reqwest-backed transport sharing one connection pool
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with a per-request timeout
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("pdf4me-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::config_error(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared pool, custom TLS, proxies)
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn read(response: reqwest::Response) -> ClientResult<RawResponse> {
        let status = response.status().as_u16();
        let location = extract_location(response.headers());
        let body = response.bytes().await?.to_vec();

        debug!(
            status = status,
            location = location.as_deref(),
            body_len = body.len(),
            "Received HTTP response"
        );

        Ok(RawResponse {
            status,
            location,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn transport_name(&self) -> &'static str {
        "reqwest"
    }

    async fn post_json(
        &self,
        url: &Url,
        authorization: &HeaderValue,
        body: &Value,
    ) -> ClientResult<RawResponse> {
        let response = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, authorization.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn get(&self, url: &Url, authorization: &HeaderValue) -> ClientResult<RawResponse> {
        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, authorization.clone())
            .send()
            .await?;
        Self::read(response).await
    }
}

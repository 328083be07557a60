//! HTTP transport used by the source clients
//!
//! The clients talk to upstreams through `HttpTransport` so the caching and
//! fallback logic can be exercised against scripted responses.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// User agent sent with every upstream request
const USER_AGENT: &str = concat!("launchwatch/", env!("CARGO_PKG_VERSION"));

/// Status code and body of an upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON after checking the status
    ///
    /// HTTP 429 maps to `SourceError::RateLimited` so callers can choose the
    /// stale-cache path; every other non-2xx status is `SourceError::Status`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SourceError> {
        if self.status == 429 {
            return Err(SourceError::RateLimited);
        }
        if !self.is_success() {
            return Err(SourceError::Status(self.status));
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Minimal HTTP surface needed by the upstream clients
#[async_trait]
pub trait HttpTransport: fmt::Debug + Send + Sync {
    /// Issues a GET request with extra headers
    async fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<HttpResponse, SourceError>;

    /// Issues a POST request with a JSON body
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, SourceError>;
}

/// `HttpTransport` backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self { client })
    }

    async fn collect(response: reqwest::Response) -> Result<HttpResponse, SourceError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<HttpResponse, SourceError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        Self::collect(request.send().await?).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, SourceError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::collect(response).await
    }
}

//! HTTP transport layer
//!
//! The dispatcher talks to the server through the `Transport` trait so the
//! two-phase exchange can be driven without a network in tests.

use async_trait::async_trait;
use std::fmt;

use crate::common::Result;
use crate::table::Method;

/// A request exactly as it goes on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
        }
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Raw server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw reply
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Transport backed by reqwest
///
/// Uses reqwest's default timeouts; there is no retry.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lwm2m-trigger/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method.into(), &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!("{} -> {} ({} bytes)", request, status, body.len());

        Ok(HttpResponse { status, body })
    }
}

//! Transport trait and reqwest implementation

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A fully signed request, ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Endpoint URL without query string
    pub url: String,
    /// Canonical, form-encoded parameters
    pub query: String,
    /// Value of the `Authorization` header
    pub authorization: String,
    /// Request timeout
    pub timeout: Duration,
}

impl ApiRequest {
    /// Whether the parameters travel in the body rather than the URL
    pub fn has_body(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }

    /// URL to request, with the query string appended for read requests
    pub fn full_url(&self) -> String {
        if self.has_body() || self.query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query)
        }
    }
}

/// Sends signed requests and returns the parsed JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport using the timeout and user agent from `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = request.full_url();
        let mut req = self
            .client
            .request(request.method.clone(), &url)
            .header(AUTHORIZATION, &request.authorization)
            .timeout(request.timeout);

        if request.has_body() {
            req = req
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(request.query.clone());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: request.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        debug!("{} {} -> {}", request.method, request.url, status.as_u16());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: request.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        serde_json::from_str(&body).map_err(|e| {
            Error::decode(format!(
                "HTTP {} returned a body that is not JSON ({e}): {}",
                status.as_u16(),
                truncate(&body, 200)
            ))
        })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

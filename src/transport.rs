//! HTTP transport seam for the REST client.
//!
//! [`RestTransport`] is the only thing [`Client`](crate::client::Client)
//! needs from the network: execute one fully-built request and hand back
//! the status code and body. [`HttpTransport`] is the `reqwest`-backed
//! implementation; tests substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use crate::Result;

/// Default per-request timeout for [`HttpTransport`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A request ready to go on the wire.
///
/// `query` is already encoded and, for signed endpoints, already carries
/// `timestamp`, `recvWindow` and `signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    /// Value for the API-key header, set only on signed requests.
    pub api_key: Option<String>,
}

/// Raw HTTP response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes REST requests against the exchange.
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// Non-2xx statuses are *not* errors at this layer; only failures to
    /// complete the exchange (connect, timeout, body read) are.
    async fn execute(&self, request: RestRequest) -> Result<RestResponse>;
}

/// [`RestTransport`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport targeting `base_url` (e.g. `https://api.binance.com`).
    ///
    /// # Errors
    ///
    /// Returns [`SpotkitError::Transport`](crate::SpotkitError::Transport) if the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RestTransport for HttpTransport {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        let mut url = format!("{}{}", self.base_url, request.path);
        if !request.query.is_empty() {
            url.push('?');
            url.push_str(&request.query);
        }

        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(api_key) = &request.api_key {
            builder = builder.header(crate::auth::API_KEY_HEADER, api_key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(method = %request.method, path = %request.path, status, "HTTP response");

        Ok(RestResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(RestResponse::new(200, "").is_success());
        assert!(RestResponse::new(204, "").is_success());
        assert!(!RestResponse::new(400, "").is_success());
        assert!(!RestResponse::new(503, "").is_success());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let transport = HttpTransport::new("https://api.binance.com/").unwrap();
        assert_eq!(transport.base_url(), "https://api.binance.com");
    }
}

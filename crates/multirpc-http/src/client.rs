//! HTTP JSON-RPC transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;

use multirpc_core::error::TransportError;
use multirpc_core::request::{JsonRpcRequest, JsonRpcResponse};
use multirpc_core::transport::RpcTransport;

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout: Duration,
    /// Extra headers sent with every request (e.g. API keys).
    pub headers: Vec<(String, String)>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            headers: Vec::new(),
        }
    }
}

impl HttpTransportConfig {
    /// Build a `reqwest` client honouring this config.
    pub fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header value for {}: {e}", name.as_str())))?;
            headers.insert(name, value);
        }

        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

/// JSON-RPC over HTTP POST to one endpoint URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `url` with its own HTTP client.
    pub fn new(url: impl Into<String>, config: &HttpTransportConfig) -> Result<Self, TransportError> {
        Self::with_client(url, config.build_client()?)
    }

    /// Create a transport sharing an existing HTTP client (and its connection pool).
    pub fn with_client(url: impl Into<String>, http: reqwest::Client) -> Result<Self, TransportError> {
        let url = url.into();
        reqwest::Url::parse(&url).map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
        tracing::trace!(url = %self.url, method = %req.method, id = %req.id, "POST");
        fetch_json(&self.http, &self.url, req).await
    }

    fn path(&self) -> &str {
        &self.url
    }
}

/// POST `body` to `url` and extract the JSON-RPC result.
///
/// Connection failures and non-2xx statuses become [`TransportError::Http`];
/// an `error` member in the response envelope becomes [`TransportError::Rpc`].
pub async fn fetch_json(
    http: &reqwest::Client,
    url: &str,
    body: &JsonRpcRequest,
) -> Result<Value, TransportError> {
    let resp = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| TransportError::Http(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(TransportError::Http(format!("HTTP {status}: {body}")));
    }

    let envelope = resp
        .json::<JsonRpcResponse>()
        .await
        .map_err(|e| TransportError::Http(e.to_string()))?;

    envelope.into_result().map_err(TransportError::Rpc)
}

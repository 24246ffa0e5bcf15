//! Error taxonomy: per-endpoint failures, the aggregated exhaustion error,
//! and construction-time configuration errors.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors a single endpoint attempt can produce.
///
/// These never reach the caller of a multi-endpoint provider directly; the
/// dispatcher records their messages and moves on to the next endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, non-2xx status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC error object returned by the node. Code and data stay on the value.
    #[error("{}", .0.message)]
    Rpc(JsonRpcError),

    /// An injected provider reported an error through its own API.
    #[error("{0}")]
    Provider(String),

    /// A legacy callback-style provider dropped the callback without answering.
    #[error("provider dropped the request callback")]
    CallbackDropped,

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// The JSON-RPC error object, if the node answered with one.
    pub fn rpc_error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Rpc(err) => Some(err),
            _ => None,
        }
    }
}

/// Raised when every endpoint failed for one logical call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MultiError {
    message: String,
    errors: Vec<String>,
}

impl MultiError {
    /// Human-readable summary of all failures.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-endpoint failure messages, in attempt order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Prefix of every aggregated failure message.
pub const AGGREGATE_HEADER: &str = "Rpc requests unsuccessful.\n";

/// Fold the ordered per-endpoint messages into one [`MultiError`].
pub fn aggregate(errors: Vec<String>) -> MultiError {
    let body = errors
        .iter()
        .map(|err| format!(" {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    MultiError {
        message: format!("{AGGREGATE_HEADER}{body}"),
        errors,
    }
}

/// Fatal configuration problems detected while building a provider.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint list was empty.
    #[error("at least one endpoint is required")]
    NoEndpoints,

    /// An injected provider exposed none of the supported call shapes.
    #[error("unsupported provider at index {index}")]
    UnsupportedProvider { index: usize },

    /// A raw endpoint could not be turned into an HTTP transport.
    #[error("invalid endpoint url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The shared HTTP client could not be built (bad header, TLS backend).
    #[error("failed to build http client: {reason}")]
    HttpClient { reason: String },
}

/// Errors from typed convenience calls on a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Exhausted(#[from] MultiError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_formats_message_in_order() {
        let err = aggregate(vec!["x".into(), "y".into()]);
        assert_eq!(err.message(), "Rpc requests unsuccessful.\n x\n y");
        assert_eq!(err.errors(), &["x".to_string(), "y".to_string()]);
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn aggregate_is_deterministic() {
        let a = aggregate(vec!["timeout".into(), "bad gateway".into()]);
        let b = aggregate(vec!["timeout".into(), "bad gateway".into()]);
        assert_eq!(a, b);
    }

    #[test]
    fn rpc_error_displays_node_message() {
        let err = TransportError::Rpc(JsonRpcError {
            code: -32000,
            message: "execution reverted".into(),
            data: None,
        });
        assert_eq!(err.to_string(), "execution reverted");
        assert_eq!(err.rpc_error().map(|e| e.code), Some(-32000));
    }
}

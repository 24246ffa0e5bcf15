//! The `RpcTransport` trait — the one capability every endpoint adapter provides.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::JsonRpcRequest;

/// Issue a JSON-RPC request against a single endpoint.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Perform one attempt and return the `result` value of the response.
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError>;

    /// Diagnostic label: the URL, or a tag such as `"metamask"` or `"eip-1193:"`.
    fn path(&self) -> &str;
}

//! Shapes an injected provider can take.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use multirpc_core::error::TransportError;
use multirpc_core::request::{JsonRpcRequest, JsonRpcResponse};

/// Argument of an EIP-1193 `request` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    pub params: Vec<Value>,
}

/// EIP-1193 style provider: one `request({ method, params })` entry point.
#[async_trait]
pub trait Eip1193Provider: Send + Sync + 'static {
    async fn request(&self, args: RequestArguments) -> Result<Value, TransportError>;
}

/// Completion callback of a legacy provider. Called at most once.
pub type LegacyCallback = Box<dyn FnOnce(Result<JsonRpcResponse, TransportError>) + Send>;

/// Legacy web3 provider with a callback-style `send` or `sendAsync`.
pub trait LegacySend: Send + Sync + 'static {
    fn send(&self, request: JsonRpcRequest, callback: LegacyCallback);
}

pub type FetchFuture = BoxFuture<'static, Result<Value, TransportError>>;

/// A bare `(method, params) -> result` function.
pub type FetchFn = Arc<dyn Fn(String, Vec<Value>) -> FetchFuture + Send + Sync>;

/// Wrap an async closure as a [`FetchFn`].
pub fn fetch_fn<F, Fut>(f: F) -> FetchFn
where
    F: Fn(String, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TransportError>> + Send + 'static,
{
    Arc::new(move |method, params| f(method, params).boxed())
}

/// Descriptor of an injected provider object.
///
/// Mirrors what a host wallet exposes: identity flags, optional host/path
/// labels, and whichever call interfaces it implements.
#[derive(Clone, Default)]
pub struct ExternalProvider {
    pub is_metamask: bool,
    pub is_status: bool,
    pub host: Option<String>,
    pub path: Option<String>,
    pub(crate) request: Option<Arc<dyn Eip1193Provider>>,
    pub(crate) send_async: Option<Arc<dyn LegacySend>>,
    pub(crate) send: Option<Arc<dyn LegacySend>>,
}

impl ExternalProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metamask(mut self) -> Self {
        self.is_metamask = true;
        self
    }

    pub fn status(mut self) -> Self {
        self.is_status = true;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_request(mut self, provider: Arc<dyn Eip1193Provider>) -> Self {
        self.request = Some(provider);
        self
    }

    pub fn with_send_async(mut self, provider: Arc<dyn LegacySend>) -> Self {
        self.send_async = Some(provider);
        self
    }

    pub fn with_send(mut self, provider: Arc<dyn LegacySend>) -> Self {
        self.send = Some(provider);
        self
    }
}

impl std::fmt::Debug for ExternalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalProvider")
            .field("is_metamask", &self.is_metamask)
            .field("is_status", &self.is_status)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("request", &self.request.is_some())
            .field("send_async", &self.send_async.is_some())
            .field("send", &self.send.is_some())
            .finish()
    }
}

/// Anything that can stand in for a raw endpoint URL.
#[derive(Clone)]
pub enum InjectedProvider {
    Fetch(FetchFn),
    External(ExternalProvider),
}

impl From<ExternalProvider> for InjectedProvider {
    fn from(provider: ExternalProvider) -> Self {
        Self::External(provider)
    }
}

impl From<FetchFn> for InjectedProvider {
    fn from(f: FetchFn) -> Self {
        Self::Fetch(f)
    }
}

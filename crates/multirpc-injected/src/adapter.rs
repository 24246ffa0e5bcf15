//! [`RpcTransport`] implementations for each injected provider shape.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use multirpc_core::error::TransportError;
use multirpc_core::request::JsonRpcRequest;
use multirpc_core::transport::RpcTransport;

use crate::provider::{Eip1193Provider, FetchFn, LegacySend, RequestArguments};
use crate::quirks::{rewrite_for_wallet, WalletIdentity};

/// Calls an EIP-1193 provider's `request` directly.
pub struct Eip1193Transport {
    path: String,
    identity: WalletIdentity,
    provider: Arc<dyn Eip1193Provider>,
}

impl Eip1193Transport {
    pub fn new(
        path: impl Into<String>,
        identity: WalletIdentity,
        provider: Arc<dyn Eip1193Provider>,
    ) -> Self {
        Self {
            path: path.into(),
            identity,
            provider,
        }
    }
}

#[async_trait]
impl RpcTransport for Eip1193Transport {
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
        let (method, params) =
            rewrite_for_wallet(self.identity, req.method.clone(), req.params.clone());
        self.provider
            .request(RequestArguments { method, params })
            .await
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Bridges a callback-style `send`/`sendAsync` into a single-resolution future.
pub struct LegacyTransport {
    path: String,
    identity: WalletIdentity,
    sender: Arc<dyn LegacySend>,
}

impl LegacyTransport {
    pub fn new(path: impl Into<String>, identity: WalletIdentity, sender: Arc<dyn LegacySend>) -> Self {
        Self {
            path: path.into(),
            identity,
            sender,
        }
    }
}

#[async_trait]
impl RpcTransport for LegacyTransport {
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
        let (method, params) =
            rewrite_for_wallet(self.identity, req.method.clone(), req.params.clone());
        let request = JsonRpcRequest {
            jsonrpc: req.jsonrpc.clone(),
            method,
            params,
            id: req.id,
        };

        let (tx, rx) = oneshot::channel();
        self.sender.send(
            request,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );

        let response = rx.await.map_err(|_| TransportError::CallbackDropped)??;
        response.into_result().map_err(TransportError::Rpc)
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// A bare fetch function, already shaped like a JSON-RPC method call.
pub struct FetchTransport {
    func: FetchFn,
}

impl FetchTransport {
    pub fn new(func: FetchFn) -> Self {
        Self { func }
    }
}

#[async_trait]
impl RpcTransport for FetchTransport {
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
        (self.func)(req.method.clone(), req.params.clone()).await
    }

    fn path(&self) -> &str {
        "unknown:"
    }
}

/// The classified form of an injected provider.
pub enum InjectedTransport {
    Eip1193(Eip1193Transport),
    Legacy(LegacyTransport),
    Fetch(FetchTransport),
}

#[async_trait]
impl RpcTransport for InjectedTransport {
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
        match self {
            Self::Eip1193(t) => t.issue(req).await,
            Self::Legacy(t) => t.issue(req).await,
            Self::Fetch(t) => t.issue(req).await,
        }
    }

    fn path(&self) -> &str {
        match self {
            Self::Eip1193(t) => t.path(),
            Self::Legacy(t) => t.path(),
            Self::Fetch(t) => t.path(),
        }
    }
}

//! The public multi-endpoint provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use multirpc_core::dispatcher::Dispatcher;
use multirpc_core::error::{ConfigError, MultiError, ProviderError, TransportError};
use multirpc_core::event::DebugEvent;
use multirpc_core::request::JsonRpcRequest;
use multirpc_core::transport::RpcTransport;
use multirpc_http::HttpTransport;
use multirpc_injected::{classify, InjectedProvider};

use crate::config::MultiProviderConfig;
use crate::endpoint::Endpoint;

/// A JSON-RPC provider that falls back through an ordered endpoint list.
///
/// Holds no mutable state of its own beyond the dispatcher's request id
/// counter and short-lived method cache, so it can be shared behind an `Arc`.
pub struct MultiProvider {
    dispatcher: Dispatcher,
}

impl MultiProvider {
    /// Build a provider from endpoints in priority order.
    ///
    /// Fails on an empty list, an invalid URL, or an injected provider with
    /// no supported call interface.
    pub fn new<I, E>(endpoints: I, config: MultiProviderConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Endpoint>,
    {
        let mut http_client: Option<reqwest::Client> = None;
        let mut transports: Vec<Arc<dyn RpcTransport>> = Vec::new();

        for (index, endpoint) in endpoints.into_iter().map(Into::<Endpoint>::into).enumerate() {
            let transport: Arc<dyn RpcTransport> = match endpoint {
                Endpoint::Url(url) => {
                    // One client, and so one connection pool, for all URL endpoints.
                    let client = match &http_client {
                        Some(client) => client.clone(),
                        None => {
                            let client = config.http.build_client().map_err(|e| {
                                ConfigError::HttpClient {
                                    reason: e.to_string(),
                                }
                            })?;
                            http_client = Some(client.clone());
                            client
                        }
                    };
                    let transport = HttpTransport::with_client(url.clone(), client)
                        .map_err(|e| ConfigError::InvalidUrl {
                            url,
                            reason: e.to_string(),
                        })?;
                    Arc::new(transport)
                }
                Endpoint::Fetch(f) => Arc::new(classify(InjectedProvider::Fetch(f), index)?),
                Endpoint::Injected(p) => Arc::new(classify(InjectedProvider::External(p), index)?),
                Endpoint::Transport(t) => t,
            };
            transports.push(transport);
        }

        let dispatcher = Dispatcher::new(transports, config.dispatcher_options())?;
        tracing::debug!(endpoints = ?dispatcher.paths(), "multi provider ready");
        Ok(Self { dispatcher })
    }

    /// Build a provider over raw JSON-RPC URLs.
    pub fn from_urls<I, S>(urls: I, config: MultiProviderConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(urls.into_iter().map(|u| Endpoint::Url(u.into())), config)
    }

    /// Build a provider over injected wallet providers or fetch functions.
    pub fn from_injected<I, P>(providers: I, config: MultiProviderConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<InjectedProvider>,
    {
        let endpoints = providers.into_iter().map(|p| {
            let provider: InjectedProvider = p.into();
            Endpoint::from(provider)
        });
        Self::new(endpoints, config)
    }

    /// Send `method` with `params`, falling back through the endpoints.
    pub async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, MultiError> {
        self.dispatcher.dispatch(method, params).await
    }

    /// Like [`send`](Self::send), deserializing the result into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ProviderError> {
        let result = self.send(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Diagnostic path of every endpoint, in priority order.
    pub fn paths(&self) -> Vec<String> {
        self.dispatcher.paths()
    }

    pub fn endpoint_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Subscribe to request/response debug events.
    pub fn subscribe(&self) -> broadcast::Receiver<DebugEvent> {
        self.dispatcher.subscribe()
    }
}

#[async_trait]
impl RpcTransport for MultiProvider {
    async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
        self.dispatcher
            .dispatch_request(req.clone())
            .await
            .map_err(|e| TransportError::Other(e.to_string()))
    }

    fn path(&self) -> &str {
        "multi"
    }
}

impl std::fmt::Debug for MultiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiProvider")
            .field("endpoints", &self.dispatcher.paths())
            .finish()
    }
}

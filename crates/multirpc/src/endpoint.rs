//! Endpoint descriptors accepted by the provider.

use std::sync::Arc;

use multirpc_core::transport::RpcTransport;
use multirpc_injected::{ExternalProvider, FetchFn, InjectedProvider};

/// One entry of the ordered endpoint list.
#[derive(Clone)]
pub enum Endpoint {
    /// Raw JSON-RPC URL, reached over HTTP.
    Url(String),
    /// A `(method, params) -> result` function.
    Fetch(FetchFn),
    /// An injected wallet or legacy web3 provider.
    Injected(ExternalProvider),
    /// A transport built elsewhere.
    Transport(Arc<dyn RpcTransport>),
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Fetch(_) => f.write_str("Fetch"),
            Self::Injected(p) => f.debug_tuple("Injected").field(p).finish(),
            Self::Transport(t) => f.debug_tuple("Transport").field(&t.path()).finish(),
        }
    }
}

impl From<&str> for Endpoint {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<ExternalProvider> for Endpoint {
    fn from(provider: ExternalProvider) -> Self {
        Self::Injected(provider)
    }
}

impl From<FetchFn> for Endpoint {
    fn from(f: FetchFn) -> Self {
        Self::Fetch(f)
    }
}

impl From<Arc<dyn RpcTransport>> for Endpoint {
    fn from(transport: Arc<dyn RpcTransport>) -> Self {
        Self::Transport(transport)
    }
}

impl From<InjectedProvider> for Endpoint {
    fn from(provider: InjectedProvider) -> Self {
        match provider {
            InjectedProvider::Fetch(f) => Self::Fetch(f),
            InjectedProvider::External(p) => Self::Injected(p),
        }
    }
}

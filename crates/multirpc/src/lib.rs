//! multirpc — one logical JSON-RPC provider over many endpoints.
//!
//! Give [`MultiProvider`] an ordered list of endpoints (URLs, injected wallet
//! providers, fetch functions, or ready-made transports). Each call goes to
//! the first endpoint; if it fails, the next one is tried, and so on. The
//! caller sees either the first successful result or a single [`MultiError`]
//! listing every endpoint's failure.
//!
//! # Quick start
//! ```rust,no_run
//! use multirpc::{MultiProvider, MultiProviderConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MultiProvider::from_urls(
//!     ["https://rpc.ankr.com/eth", "https://cloudflare-eth.com"],
//!     MultiProviderConfig::default(),
//! )?;
//! let _block = provider.send("eth_blockNumber", vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod endpoint;
pub mod logging;
pub mod provider;

pub use config::MultiProviderConfig;
pub use endpoint::Endpoint;
pub use provider::MultiProvider;

pub use multirpc_core::{
    aggregate, ConfigError, DebugAction, DebugEvent, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, MultiError, ProviderError, RequestErrorHook, RpcId, RpcTransport,
    TransportError, CACHEABLE_METHODS,
};
pub use multirpc_http::{HttpTransport, HttpTransportConfig};
pub use multirpc_injected::{
    fetch_fn, Eip1193Provider, ExternalProvider, FetchFn, InjectedProvider, LegacyCallback,
    LegacySend, RequestArguments,
};

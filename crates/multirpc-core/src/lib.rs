//! multirpc-core — foundation traits and types for MultiRPC.
//!
//! # Overview
//!
//! MultiRPC presents an ordered list of JSON-RPC endpoints as one logical
//! provider: a call goes to the first endpoint, and on failure to the next,
//! until one answers or all of them have failed. The core crate defines:
//!
//! - [`RpcTransport`] — the capability every endpoint adapter implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`Dispatcher`] — the ordered fallback loop
//! - [`MethodCache`] — per-method cache whose entries live for a short burst window
//! - [`MultiError`] / [`aggregate`] — the exhaustion error
//! - [`DebugEvent`] — the observation stream

pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod request;
pub mod transport;

pub use cache::{is_cacheable, MethodCache, BURST_WINDOW, CACHEABLE_METHODS};
pub use dispatcher::{Dispatcher, DispatcherOptions, RequestErrorHook};
pub use error::{aggregate, ConfigError, MultiError, ProviderError, TransportError};
pub use event::{DebugAction, DebugEvent, DebugEvents};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestIdSequence, RpcId};
pub use transport::RpcTransport;

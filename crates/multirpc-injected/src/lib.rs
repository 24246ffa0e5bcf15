//! multirpc-injected — adapters for externally supplied providers.
//!
//! An injected provider is anything a host environment hands over instead of
//! a URL: a browser wallet object, a legacy web3 provider with callback-style
//! `send`/`sendAsync`, or a bare fetch function. [`classify`] inspects it once,
//! at construction time, and yields an [`InjectedTransport`] that the
//! dispatcher drives through the ordinary [`RpcTransport`] capability.
//!
//! [`RpcTransport`]: multirpc_core::RpcTransport

pub mod adapter;
pub mod classify;
pub mod provider;
pub mod quirks;

pub use adapter::{Eip1193Transport, FetchTransport, InjectedTransport, LegacyTransport};
pub use classify::classify;
pub use provider::{
    fetch_fn, Eip1193Provider, ExternalProvider, FetchFn, FetchFuture, InjectedProvider,
    LegacyCallback, LegacySend, RequestArguments,
};
pub use quirks::{rewrite_for_wallet, WalletIdentity};

//! One-time classification of an injected provider into a transport.

use multirpc_core::error::ConfigError;

use crate::adapter::{Eip1193Transport, FetchTransport, InjectedTransport, LegacyTransport};
use crate::provider::{ExternalProvider, InjectedProvider};
use crate::quirks::WalletIdentity;

/// Classify `provider` (at position `index` of the endpoint list).
///
/// Shape precedence is `request` (EIP-1193), then `send_async`, then `send`.
/// A provider exposing none of them is rejected here, never at call time.
pub fn classify(provider: InjectedProvider, index: usize) -> Result<InjectedTransport, ConfigError> {
    match provider {
        InjectedProvider::Fetch(func) => Ok(InjectedTransport::Fetch(FetchTransport::new(func))),
        InjectedProvider::External(external) => classify_external(external, index),
    }
}

fn classify_external(
    provider: ExternalProvider,
    index: usize,
) -> Result<InjectedTransport, ConfigError> {
    let identity = WalletIdentity {
        is_metamask: provider.is_metamask,
        is_status: provider.is_status,
    };

    let mut path = [&provider.host, &provider.path]
        .into_iter()
        .flatten()
        .find(|p| !p.is_empty())
        .cloned()
        .unwrap_or_default();
    if path.is_empty() && provider.is_metamask {
        path = "metamask".to_string();
    }

    let transport = if let Some(request) = provider.request {
        if path.is_empty() {
            path = "eip-1193:".to_string();
        }
        InjectedTransport::Eip1193(Eip1193Transport::new(path, identity, request))
    } else {
        let Some(sender) = provider.send_async.or(provider.send) else {
            tracing::error!(index, "injected provider exposes no supported interface");
            return Err(ConfigError::UnsupportedProvider { index });
        };
        if path.is_empty() {
            path = "unknown:".to_string();
        }
        InjectedTransport::Legacy(LegacyTransport::new(path, identity, sender))
    };

    Ok(transport)
}

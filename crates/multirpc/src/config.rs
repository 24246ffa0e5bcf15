//! Provider configuration.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use multirpc_core::cache::BURST_WINDOW;
use multirpc_core::dispatcher::{DispatcherOptions, RequestErrorHook};
use multirpc_core::error::TransportError;
use multirpc_http::HttpTransportConfig;

/// Configuration for [`MultiProvider`](crate::MultiProvider).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MultiProviderConfig {
    /// Settings for every URL endpoint.
    pub http: HttpTransportConfig,
    /// Buffer size of the debug event channel.
    pub debug_channel_capacity: usize,
    /// Lifetime of a cached `eth_chainId` / `eth_blockNumber` result.
    pub cache_window: Duration,
    /// Called with each failed endpoint attempt and its index.
    #[serde(skip)]
    pub on_request_error: Option<RequestErrorHook>,
}

impl Default for MultiProviderConfig {
    fn default() -> Self {
        Self {
            http: HttpTransportConfig::default(),
            debug_channel_capacity: 256,
            cache_window: BURST_WINDOW,
            on_request_error: None,
        }
    }
}

impl MultiProviderConfig {
    pub fn with_request_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TransportError, usize) + Send + Sync + 'static,
    {
        self.on_request_error = Some(Arc::new(hook));
        self
    }

    pub(crate) fn dispatcher_options(&self) -> DispatcherOptions {
        DispatcherOptions {
            on_request_error: self.on_request_error.clone(),
            debug_channel_capacity: self.debug_channel_capacity,
            cache_window: self.cache_window,
        }
    }
}

impl std::fmt::Debug for MultiProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiProviderConfig")
            .field("http", &self.http)
            .field("debug_channel_capacity", &self.debug_channel_capacity)
            .field("cache_window", &self.cache_window)
            .field("on_request_error", &self.on_request_error.is_some())
            .finish()
    }
}

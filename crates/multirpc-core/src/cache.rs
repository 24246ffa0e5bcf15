//! Ephemeral per-method result cache.
//!
//! Collapses duplicate near-simultaneous calls to cheap, frequently polled
//! methods. Each entry is stamped when stored and treated as gone once the
//! burst window has elapsed, so expiry does not depend on any task being
//! scheduled. It is not a TTL cache for stale reads: the window is a few
//! milliseconds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

/// The only methods whose results may be cached.
pub const CACHEABLE_METHODS: [&str; 2] = ["eth_chainId", "eth_blockNumber"];

/// How long a stored result keeps answering calls for the same method.
pub const BURST_WINDOW: Duration = Duration::from_millis(10);

/// Returns `true` if `method` is on the fixed allow-list.
pub fn is_cacheable(method: &str) -> bool {
    CACHEABLE_METHODS.contains(&method)
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    stored_at: Instant,
}

/// Single-slot-per-method cache shared between concurrent calls.
#[derive(Debug, Clone)]
pub struct MethodCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    window: Duration,
}

impl Default for MethodCache {
    fn default() -> Self {
        Self::with_window(BURST_WINDOW)
    }
}

impl MethodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose entries stay live for `window` after being stored.
    pub fn with_window(window: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Return the live entry for `method`, if any. Expired entries are dropped.
    pub fn get(&self, method: &str) -> Option<Value> {
        if !is_cacheable(method) {
            return None;
        }
        let mut entries = self.lock();
        match entries.get(method) {
            Some(entry) if entry.stored_at.elapsed() < self.window => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(method);
                tracing::trace!(method, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store `value` for `method`, replacing any previous entry.
    ///
    /// Non-cacheable methods are ignored.
    pub fn put(&self, method: &str, value: Value) {
        if !is_cacheable(method) {
            return;
        }
        self.lock().insert(
            method.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `method`.
    pub fn clear(&self, method: &str) {
        self.lock().remove(method);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allow_list_is_fixed() {
        assert!(is_cacheable("eth_chainId"));
        assert!(is_cacheable("eth_blockNumber"));
        assert!(!is_cacheable("eth_getBalance"));
        assert!(!is_cacheable("eth_call"));
    }

    #[test]
    fn entry_visible_within_window() {
        let cache = MethodCache::with_window(Duration::from_secs(60));
        cache.put("eth_chainId", json!("0x1"));
        assert_eq!(cache.get("eth_chainId"), Some(json!("0x1")));
        assert_eq!(cache.get("eth_chainId"), Some(json!("0x1")));
    }

    #[test]
    fn entry_expires_after_window() {
        let cache = MethodCache::new();
        cache.put("eth_blockNumber", json!("0x10"));
        std::thread::sleep(BURST_WINDOW * 5);
        assert_eq!(cache.get("eth_blockNumber"), None);
        assert!(cache.lock().is_empty());
    }

    #[test]
    fn zero_window_never_serves() {
        let cache = MethodCache::with_window(Duration::ZERO);
        cache.put("eth_chainId", json!("0x1"));
        assert_eq!(cache.get("eth_chainId"), None);
    }

    #[test]
    fn put_restarts_the_window() {
        let cache = MethodCache::new();
        cache.put("eth_blockNumber", json!("0x10"));
        std::thread::sleep(BURST_WINDOW * 5);
        cache.put("eth_blockNumber", json!("0x11"));
        assert_eq!(cache.get("eth_blockNumber"), Some(json!("0x11")));
    }

    #[test]
    fn non_cacheable_methods_are_ignored() {
        let cache = MethodCache::new();
        cache.put("eth_getBalance", json!("0x0"));
        assert_eq!(cache.get("eth_getBalance"), None);
    }

    #[test]
    fn clear_removes_entry() {
        let cache = MethodCache::with_window(Duration::from_secs(60));
        cache.put("eth_chainId", json!("0x1"));
        cache.clear("eth_chainId");
        assert_eq!(cache.get("eth_chainId"), None);
    }
}

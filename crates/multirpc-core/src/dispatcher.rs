//! Ordered multi-endpoint dispatch with first-success-wins fallback.
//!
//! Endpoints are tried strictly in list order, one at a time. Every failure
//! is recorded and the next endpoint is tried; only when all of them fail
//! does the caller see an error, the aggregated [`MultiError`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::cache::{is_cacheable, MethodCache, BURST_WINDOW};
use crate::error::{aggregate, ConfigError, MultiError, TransportError};
use crate::event::{DebugEvent, DebugEvents};
use crate::request::{JsonRpcRequest, RequestIdSequence};
use crate::transport::RpcTransport;

/// Observer called with each failed attempt and the index of its endpoint.
pub type RequestErrorHook = Arc<dyn Fn(&TransportError, usize) + Send + Sync>;

/// Options for [`Dispatcher::new`].
#[derive(Clone)]
pub struct DispatcherOptions {
    /// Invoked once per failed endpoint attempt. Panics are contained.
    pub on_request_error: Option<RequestErrorHook>,
    /// Buffer size of the debug event channel.
    pub debug_channel_capacity: usize,
    /// How long an `eth_chainId` / `eth_blockNumber` result answers repeat calls.
    pub cache_window: Duration,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            on_request_error: None,
            debug_channel_capacity: 256,
            cache_window: BURST_WINDOW,
        }
    }
}

impl std::fmt::Debug for DispatcherOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherOptions")
            .field("on_request_error", &self.on_request_error.is_some())
            .field("debug_channel_capacity", &self.debug_channel_capacity)
            .field("cache_window", &self.cache_window)
            .finish()
    }
}

/// Tries transports in fixed order until one returns a result.
pub struct Dispatcher {
    transports: Vec<Arc<dyn RpcTransport>>,
    ids: RequestIdSequence,
    cache: MethodCache,
    events: DebugEvents,
    on_request_error: Option<RequestErrorHook>,
}

impl Dispatcher {
    /// Build a dispatcher over `transports`, in priority order.
    pub fn new(
        transports: Vec<Arc<dyn RpcTransport>>,
        options: DispatcherOptions,
    ) -> Result<Self, ConfigError> {
        if transports.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        Ok(Self {
            transports,
            ids: RequestIdSequence::new(),
            cache: MethodCache::with_window(options.cache_window),
            events: DebugEvents::new(options.debug_channel_capacity),
            on_request_error: options.on_request_error,
        })
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Always `false`: construction rejects an empty endpoint list.
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Diagnostic paths of every endpoint, in priority order.
    pub fn paths(&self) -> Vec<String> {
        self.transports.iter().map(|t| t.path().to_string()).collect()
    }

    /// Subscribe to the debug event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<DebugEvent> {
        self.events.subscribe()
    }

    /// Reserve the next request id.
    pub fn next_id(&self) -> u64 {
        self.ids.next()
    }

    /// Build a request with a fresh id and dispatch it.
    pub async fn dispatch(&self, method: &str, params: Vec<Value>) -> Result<Value, MultiError> {
        let req = JsonRpcRequest::new(self.ids.next(), method, params);
        self.dispatch_request(req).await
    }

    /// Dispatch an already-built request. Its id is reused for every attempt.
    pub async fn dispatch_request(&self, req: JsonRpcRequest) -> Result<Value, MultiError> {
        self.events.emit(DebugEvent::request(&req));

        let cacheable = is_cacheable(&req.method);
        if cacheable {
            if let Some(hit) = self.cache.get(&req.method) {
                tracing::trace!(method = %req.method, id = %req.id, "served from cache");
                return Ok(hit);
            }
        }

        let mut errors = Vec::with_capacity(self.transports.len());

        for (index, transport) in self.transports.iter().enumerate() {
            match transport.issue(&req).await {
                Ok(result) => {
                    self.events.emit(DebugEvent::response(
                        &req,
                        result.clone(),
                        (index, transport.path().to_string()),
                    ));
                    if cacheable {
                        self.cache.put(&req.method, result.clone());
                    }
                    return Ok(result);
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(
                        method = %req.method,
                        id = %req.id,
                        endpoint = index,
                        path = %transport.path(),
                        error = %message,
                        "endpoint attempt failed"
                    );
                    self.events.emit(DebugEvent::attempt_failed(
                        &req,
                        message.clone(),
                        (index, transport.path().to_string()),
                    ));
                    self.notify_request_error(&err, index);
                    errors.push(message);
                }
            }
        }

        let err = aggregate(errors);
        tracing::error!(
            method = %req.method,
            id = %req.id,
            attempts = err.errors().len(),
            "all endpoints failed"
        );
        self.events.emit(DebugEvent::exhausted(&req, err.to_string()));
        Err(err)
    }

    fn notify_request_error(&self, err: &TransportError, index: usize) {
        let Some(hook) = &self.on_request_error else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| hook(err, index))).is_err() {
            tracing::error!(endpoint = index, "on_request_error observer panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DebugAction;
    use crate::request::{JsonRpcError, RpcId};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockTransport {
        path: String,
        outcome: Result<Value, String>,
        calls: AtomicUsize,
        seen_ids: Mutex<Vec<RpcId>>,
    }

    #[async_trait]
    impl RpcTransport for MockTransport {
        async fn issue(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_ids.lock().unwrap().push(req.id);
            self.outcome.clone().map_err(TransportError::Http)
        }

        fn path(&self) -> &str {
            &self.path
        }
    }

    fn ok(path: &str, value: Value) -> Arc<MockTransport> {
        mock(path, Ok(value))
    }

    fn failing(path: &str, msg: &str) -> Arc<MockTransport> {
        mock(path, Err(msg.to_string()))
    }

    fn mock(path: &str, outcome: Result<Value, String>) -> Arc<MockTransport> {
        Arc::new(MockTransport {
            path: path.to_string(),
            outcome,
            calls: AtomicUsize::new(0),
            seen_ids: Mutex::new(Vec::new()),
        })
    }

    fn dispatcher(mocks: &[Arc<MockTransport>], options: DispatcherOptions) -> Dispatcher {
        let transports = mocks
            .iter()
            .map(|m| m.clone() as Arc<dyn RpcTransport>)
            .collect();
        Dispatcher::new(transports, options).unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<DebugEvent>) -> Vec<DebugEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn empty_endpoint_list_rejected() {
        let err = Dispatcher::new(vec![], DispatcherOptions::default()).err().unwrap();
        assert!(matches!(err, ConfigError::NoEndpoints));
    }

    #[tokio::test]
    async fn falls_back_until_first_success() {
        let a = failing("a", "timeout");
        let b = failing("b", "bad gateway");
        let c = ok("c", json!(42));
        let d = ok("d", json!(99));
        let disp = dispatcher(&[a.clone(), b.clone(), c.clone(), d.clone()], Default::default());

        let result = disp.dispatch("eth_chainId", vec![]).await.unwrap();
        assert_eq!(result, json!(42));
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.calls.load(Ordering::SeqCst), 1);
        assert_eq!(d.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_at_every_position_records_preceding_failures() {
        let n = 4;
        for k in 0..n {
            let mocks: Vec<_> = (0..n)
                .map(|i| {
                    if i < k {
                        failing(&format!("e{i}"), &format!("fail {i}"))
                    } else {
                        ok(&format!("e{i}"), json!(i))
                    }
                })
                .collect();

            let recorded = Arc::new(Mutex::new(Vec::new()));
            let sink = recorded.clone();
            let options = DispatcherOptions {
                on_request_error: Some(Arc::new(move |err: &TransportError, index: usize| {
                    sink.lock().unwrap().push((index, err.to_string()));
                })),
                ..Default::default()
            };
            let disp = dispatcher(&mocks, options);

            assert_eq!(disp.dispatch("eth_getBalance", vec![]).await.unwrap(), json!(k));
            let recorded = recorded.lock().unwrap().clone();
            let expected: Vec<_> = (0..k)
                .map(|i| (i, format!("HTTP error: fail {i}")))
                .collect();
            assert_eq!(recorded, expected);
        }
    }

    #[tokio::test]
    async fn all_failing_yields_ordered_multi_error() {
        let disp = dispatcher(&[failing("a", "x"), failing("b", "y")], Default::default());
        let err = disp.dispatch("eth_call", vec![]).await.unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.errors()[0], "HTTP error: x");
        assert_eq!(err.errors()[1], "HTTP error: y");
        let msg = err.to_string();
        assert!(msg.starts_with("Rpc requests unsuccessful.\n"));
        assert!(msg.find('x').unwrap() < msg.find('y').unwrap());
    }

    #[tokio::test]
    async fn error_kind_does_not_short_circuit() {
        struct RpcFailure;

        #[async_trait]
        impl RpcTransport for RpcFailure {
            async fn issue(&self, _req: &JsonRpcRequest) -> Result<Value, TransportError> {
                Err(TransportError::Rpc(JsonRpcError {
                    code: -32601,
                    message: "method not found".into(),
                    data: None,
                }))
            }
            fn path(&self) -> &str {
                "rpc-failure"
            }
        }

        let c = ok("c", json!("0x1"));
        let transports: Vec<Arc<dyn RpcTransport>> = vec![
            Arc::new(RpcFailure) as Arc<dyn RpcTransport>,
            c.clone() as Arc<dyn RpcTransport>,
        ];
        let disp = Dispatcher::new(transports, DispatcherOptions::default()).unwrap();
        assert_eq!(disp.dispatch("eth_foo", vec![]).await.unwrap(), json!("0x1"));
        assert_eq!(c.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_id_reused_across_attempts() {
        let a = failing("a", "down");
        let b = ok("b", json!(1));
        let disp = dispatcher(&[a.clone(), b.clone()], Default::default());

        disp.dispatch("eth_getCode", vec![]).await.unwrap();
        disp.dispatch("eth_getCode", vec![]).await.unwrap();

        let a_ids = a.seen_ids.lock().unwrap().clone();
        let b_ids = b.seen_ids.lock().unwrap().clone();
        assert_eq!(a_ids, vec![RpcId(1), RpcId(2)]);
        assert_eq!(a_ids, b_ids);
    }

    #[tokio::test]
    async fn cacheable_method_served_from_cache_within_burst() {
        let a = ok("a", json!("0x1"));
        let disp = dispatcher(&[a.clone()], Default::default());

        assert_eq!(disp.dispatch("eth_chainId", vec![]).await.unwrap(), json!("0x1"));
        assert_eq!(disp.dispatch("eth_chainId", vec![]).await.unwrap(), json!("0x1"));
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cache_hit_within_burst_on_multi_thread_runtime() {
        for _ in 0..200 {
            let a = ok("a", json!("0x1"));
            let disp = dispatcher(&[a.clone()], Default::default());

            disp.dispatch("eth_blockNumber", vec![]).await.unwrap();
            disp.dispatch("eth_blockNumber", vec![]).await.unwrap();
            assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn cache_expires_after_window() {
        let a = ok("a", json!("0x10"));
        let disp = dispatcher(&[a.clone()], Default::default());

        disp.dispatch("eth_blockNumber", vec![]).await.unwrap();
        tokio::time::sleep(BURST_WINDOW * 5).await;
        disp.dispatch("eth_blockNumber", vec![]).await.unwrap();
        assert_eq!(a.calls.load(Ordering::SeqCst), 2);
    }

    /// Returns the number of calls seen so far, like a chain head advancing.
    struct BlockCounter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RpcTransport for BlockCounter {
        async fn issue(&self, _req: &JsonRpcRequest) -> Result<Value, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!(n))
        }

        fn path(&self) -> &str {
            "counter"
        }
    }

    #[test]
    fn cache_expires_between_separate_block_on_calls() {
        let counter = Arc::new(BlockCounter {
            calls: AtomicUsize::new(0),
        });
        let disp = Dispatcher::new(
            vec![counter.clone() as Arc<dyn RpcTransport>],
            DispatcherOptions::default(),
        )
        .unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut heads = Vec::new();
        for _ in 0..3 {
            heads.push(rt.block_on(disp.dispatch("eth_blockNumber", vec![])).unwrap());
            std::thread::sleep(BURST_WINDOW * 4);
        }
        assert_eq!(heads, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn cache_works_without_a_runtime_driving_expiry() {
        let counter = Arc::new(BlockCounter {
            calls: AtomicUsize::new(0),
        });
        let options = DispatcherOptions {
            cache_window: Duration::from_secs(60),
            ..Default::default()
        };
        let disp = Dispatcher::new(vec![counter.clone() as Arc<dyn RpcTransport>], options).unwrap();

        let first = futures::executor::block_on(disp.dispatch("eth_chainId", vec![])).unwrap();
        let second = futures::executor::block_on(disp.dispatch("eth_chainId", vec![])).unwrap();
        assert_eq!(first, second);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_cacheable_method_always_dispatched() {
        let a = ok("a", json!("0x0"));
        let disp = dispatcher(&[a.clone()], Default::default());

        for _ in 0..3 {
            disp.dispatch("eth_getBalance", vec![json!("0xabc")]).await.unwrap();
        }
        assert_eq!(a.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_cacheable_call_is_not_cached() {
        let a = failing("a", "down");
        let disp = dispatcher(&[a.clone()], Default::default());

        assert!(disp.dispatch("eth_chainId", vec![]).await.is_err());
        assert!(disp.dispatch("eth_chainId", vec![]).await.is_err());
        assert_eq!(a.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn one_request_and_one_response_event_per_call() {
        let disp = dispatcher(
            &[failing("a", "x"), failing("b", "y"), ok("c", json!(7))],
            Default::default(),
        );
        let mut rx = disp.subscribe();

        disp.dispatch("eth_getBalance", vec![]).await.unwrap();
        let events = drain(&mut rx);
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                DebugAction::Request,
                DebugAction::AttemptFailed,
                DebugAction::AttemptFailed,
                DebugAction::Response,
            ]
        );
        assert_eq!(events[3].response, Some(json!(7)));
        assert_eq!(events[3].endpoint, Some((2, "c".to_string())));
    }

    #[tokio::test]
    async fn exhaustion_emits_single_response_with_error() {
        let disp = dispatcher(&[failing("a", "x")], Default::default());
        let mut rx = disp.subscribe();

        disp.dispatch("eth_call", vec![]).await.unwrap_err();
        let responses: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.action == DebugAction::Response)
            .collect();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].error.as_deref().unwrap().contains("x"));
    }

    #[tokio::test]
    async fn cache_hit_emits_only_request_event() {
        let disp = dispatcher(&[ok("a", json!("0x1"))], Default::default());
        disp.dispatch("eth_chainId", vec![]).await.unwrap();

        let mut rx = disp.subscribe();
        disp.dispatch("eth_chainId", vec![]).await.unwrap();
        let actions: Vec<_> = drain(&mut rx).into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![DebugAction::Request]);
    }

    #[tokio::test]
    async fn panicking_observer_does_not_abort_dispatch() {
        let options = DispatcherOptions {
            on_request_error: Some(Arc::new(|_: &TransportError, _: usize| {
                panic!("observer bug");
            })),
            ..Default::default()
        };
        let disp = dispatcher(&[failing("a", "x"), ok("b", json!(true))], options);
        assert_eq!(disp.dispatch("eth_syncing", vec![]).await.unwrap(), json!(true));
    }

    #[tokio::test]
    async fn concurrent_calls_get_unique_ids() {
        let a = ok("a", json!(null));
        let disp = Arc::new(dispatcher(&[a.clone()], Default::default()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let disp = disp.clone();
                tokio::spawn(async move { disp.dispatch("eth_gasPrice", vec![]).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let mut ids: Vec<_> = a
            .seen_ids
            .lock()
            .unwrap()
            .iter()
            .map(|id| id.0)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[test]
    fn paths_in_priority_order() {
        let disp = dispatcher(&[ok("https://a", json!(1)), ok("https://b", json!(2))], Default::default());
        assert_eq!(disp.paths(), vec!["https://a".to_string(), "https://b".to_string()]);
        assert_eq!(disp.len(), 2);
        assert!(!disp.is_empty());
    }
}

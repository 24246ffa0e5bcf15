//! Debug event stream: the only telemetry surface of a provider.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::request::JsonRpcRequest;

/// What a [`DebugEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugAction {
    /// A logical call started. Emitted once per call.
    Request,
    /// One endpoint attempt failed; the dispatcher moves on.
    AttemptFailed,
    /// The call finished, with a result or the aggregated error.
    Response,
}

impl std::fmt::Display for DebugAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request => write!(f, "request"),
            Self::AttemptFailed => write!(f, "attempt_failed"),
            Self::Response => write!(f, "response"),
        }
    }
}

/// A tagged observation published by the dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct DebugEvent {
    pub action: DebugAction,
    pub request: JsonRpcRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Index and path of the endpoint involved, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<(usize, String)>,
}

impl DebugEvent {
    pub fn request(request: &JsonRpcRequest) -> Self {
        Self {
            action: DebugAction::Request,
            request: request.clone(),
            response: None,
            error: None,
            endpoint: None,
        }
    }

    pub fn response(request: &JsonRpcRequest, response: Value, endpoint: (usize, String)) -> Self {
        Self {
            action: DebugAction::Response,
            request: request.clone(),
            response: Some(response),
            error: None,
            endpoint: Some(endpoint),
        }
    }

    pub fn attempt_failed(request: &JsonRpcRequest, error: String, endpoint: (usize, String)) -> Self {
        Self {
            action: DebugAction::AttemptFailed,
            request: request.clone(),
            response: None,
            error: Some(error),
            endpoint: Some(endpoint),
        }
    }

    pub fn exhausted(request: &JsonRpcRequest, error: String) -> Self {
        Self {
            action: DebugAction::Response,
            request: request.clone(),
            response: None,
            error: Some(error),
            endpoint: None,
        }
    }
}

/// Fan-out of [`DebugEvent`]s to any number of subscribers.
///
/// Publishing never blocks; slow subscribers lag and lose the oldest events.
#[derive(Debug, Clone)]
pub struct DebugEvents {
    tx: broadcast::Sender<DebugEvent>,
}

impl DebugEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DebugEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: DebugEvent) {
        tracing::debug!(
            action = %event.action,
            method = %event.request.method,
            id = %event.request.id,
            endpoint = ?event.endpoint,
            error = ?event.error,
            "rpc debug event"
        );
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }
}

//! multirpc-http — HTTP JSON-RPC transport for MultiRPC.
//!
//! One [`HttpTransport`] per raw endpoint URL. Each `issue` is a single POST;
//! retrying is the dispatcher's job, which moves on to the next endpoint.

pub mod client;

pub use client::{fetch_json, HttpTransport, HttpTransportConfig};

//! Wallet compatibility rewrites.

use serde_json::Value;

/// Identity flags an injected wallet advertises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletIdentity {
    pub is_metamask: bool,
    pub is_status: bool,
}

impl WalletIdentity {
    /// MetaMask and Status reject (or hang on) `eth_sign`.
    pub fn needs_personal_sign(&self) -> bool {
        self.is_metamask || self.is_status
    }
}

/// Rewrite `eth_sign` to `personal_sign` with swapped arguments for wallets
/// that need it. Everything else passes through untouched.
pub fn rewrite_for_wallet(
    identity: WalletIdentity,
    method: String,
    params: Vec<Value>,
) -> (String, Vec<Value>) {
    if method != "eth_sign" || !identity.needs_personal_sign() {
        return (method, params);
    }
    // personal_sign takes (data, address); eth_sign takes (address, data).
    let address = params.first().cloned().unwrap_or(Value::Null);
    let data = params.get(1).cloned().unwrap_or(Value::Null);
    ("personal_sign".to_string(), vec![data, address])
}

//! Injected wallet provider boundary.
//!
//! The browser exposes a single, process-wide provider object that may
//! appear or disappear at any time (the extension can be installed or
//! removed between checks). [`WalletProviderHandle::probe`] is therefore
//! called at every decision point instead of caching the result.

use async_trait::async_trait;
use payflow_sdk::objects::{Address, ChainId};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::WalletConnection;
use super::error::ConnectionError;

/// Identifier returned by [`Eip1193Provider::on`].
pub type ListenerId = u64;

/// Callback invoked for provider events.
pub type EventHandler = Arc<dyn Fn(ProviderEvent) + Send + Sync>;

/// Provider events the checkout listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
}

impl ProviderEventKind {
    pub const ALL: [ProviderEventKind; 2] = [
        ProviderEventKind::AccountsChanged,
        ProviderEventKind::ChainChanged,
    ];

    /// The event name used by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::ChainChanged => "chainChanged",
        }
    }
}

impl fmt::Display for ProviderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed accounts changed; empty means the wallet disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
}

impl ProviderEvent {
    /// Decode the raw payload the provider emits for `kind`.
    ///
    /// `accountsChanged` carries an array of addresses, `chainChanged` a
    /// `0x`-prefixed chain id.
    pub fn from_payload(kind: ProviderEventKind, payload: &Value) -> Option<Self> {
        match kind {
            ProviderEventKind::AccountsChanged => payload.as_array().map(|accounts| {
                ProviderEvent::AccountsChanged(
                    accounts
                        .iter()
                        .filter_map(Value::as_str)
                        .map(Address::from)
                        .collect(),
                )
            }),
            ProviderEventKind::ChainChanged => payload
                .as_str()
                .and_then(|chain| chain.parse().ok())
                .map(ProviderEvent::ChainChanged),
        }
    }
}

/// An error reported by the provider.
///
/// Providers reject requests with `{code, message}`; `code` is `None` when
/// the rejection had some other shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error (code {code:?}): {message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested chain has not been added to the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Build from an arbitrary rejection value.
    pub fn from_value(value: &Value) -> Self {
        let code = value.get("code").and_then(Value::as_i64);
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| value.to_string());
        Self { code, message }
    }
}

/// An injected EIP-1193 provider.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Send a JSON-RPC request to the wallet.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Register a handler for `event`.
    fn on(&self, event: ProviderEventKind, handler: EventHandler) -> ListenerId;

    /// Remove a handler registered with [`on`](Self::on).
    fn remove_listener(&self, event: ProviderEventKind, listener: ListenerId);
}

/// Access to the injected provider, re-evaluated on every call.
pub trait WalletProviderHandle: Send + Sync {
    /// The provider, if a recognized one is currently injected.
    fn probe(&self) -> Option<Arc<dyn Eip1193Provider>>;
}

/// Event listeners registered on a provider.
///
/// Dropping the subscription removes every listener it registered.
pub struct Subscription {
    provider: Arc<dyn Eip1193Provider>,
    listeners: Vec<(ProviderEventKind, ListenerId)>,
}

impl Subscription {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for (event, listener) in self.listeners.drain(..) {
            self.provider.remove_listener(event, listener);
        }
    }
}

/// Thin adapter over a [`WalletProviderHandle`].
#[derive(Clone)]
pub struct WalletProviderAdapter {
    handle: Arc<dyn WalletProviderHandle>,
}

impl WalletProviderAdapter {
    pub fn new(handle: Arc<dyn WalletProviderHandle>) -> Self {
        Self { handle }
    }

    /// Whether a provider is injected right now.
    pub fn is_present(&self) -> bool {
        self.handle.probe().is_some()
    }

    /// Ask the wallet to expose an account, then read its active network.
    ///
    /// `expected_chain` is used when the wallet does not report a readable
    /// network.
    pub async fn request_connection(
        &self,
        expected_chain: ChainId,
    ) -> Result<WalletConnection, ConnectionError> {
        let provider = self.handle.probe().ok_or(ConnectionError::NoProvider)?;

        let accounts = provider
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(|e| ConnectionError::classify(e, expected_chain))?;
        let address = accounts
            .as_array()
            .and_then(|accounts| accounts.first())
            .and_then(Value::as_str)
            .map(Address::from)
            .ok_or_else(|| ConnectionError::Unknown {
                code: None,
                message: format!("wallet returned no accounts: {accounts}"),
            })?;

        let chain = match provider.request("eth_chainId", json!([])).await {
            Ok(value) => match value.as_str().and_then(|s| s.parse::<ChainId>().ok()) {
                Some(chain) => chain,
                None => {
                    warn!(reported = %value, "Unreadable chain id, assuming requested chain");
                    expected_chain
                }
            },
            Err(e) => {
                warn!(error = %e, "eth_chainId failed, assuming requested chain");
                expected_chain
            }
        };

        debug!(%address, %chain, "Provider granted account access");
        Ok(WalletConnection { address, chain })
    }

    /// Listen to account and network changes.
    ///
    /// Returns `None` when no provider is injected.
    pub fn subscribe(&self, handler: EventHandler) -> Option<Subscription> {
        let provider = self.handle.probe()?;
        let listeners = ProviderEventKind::ALL
            .into_iter()
            .map(|event| (event, provider.on(event, handler.clone())))
            .collect();
        Some(Subscription {
            provider,
            listeners,
        })
    }
}

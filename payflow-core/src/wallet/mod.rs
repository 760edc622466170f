//! Wallet connection.
//!
//! - [`provider`]: the injected EIP-1193 provider boundary and its adapter
//! - [`connector`]: the connector-library modal and the connection state it
//!   writes to
//! - [`orchestrator`]: the state machine that drives a connection attempt
//!   through the modal, falls back to a direct provider request, and
//!   classifies failures

pub mod connector;
mod error;
pub mod orchestrator;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;

pub use connector::{ConnectorError, ConnectorModal, SharedConnection};
pub use error::ConnectionError;
pub use orchestrator::{
    AttemptOutcome, AttemptPath, ConnectRequest, ConnectionAttempt, ConnectionOrchestrator,
    ConnectionState, DEFAULT_FALLBACK_DELAY,
};
pub use provider::{
    Eip1193Provider, EventHandler, ListenerId, ProviderError, ProviderEvent, ProviderEventKind,
    Subscription, WalletProviderAdapter, WalletProviderHandle,
};

use payflow_sdk::objects::{Address, ChainId};

/// An established wallet connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnection {
    pub address: Address,
    /// The network the wallet reported as active.
    pub chain: ChainId,
}

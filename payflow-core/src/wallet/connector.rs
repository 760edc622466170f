//! Connector-library modal and the connection state it reports through.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use super::WalletConnection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    #[error("connector modal failed to open: {0}")]
    OpenFailed(String),
}

/// A connection modal presented by a wallet connector library.
///
/// `open` returns once the modal is shown. It says nothing about whether a
/// wallet got connected; that only becomes visible through the
/// [`SharedConnection`] the library writes to.
#[async_trait]
pub trait ConnectorModal: Send + Sync {
    /// Whether the modal entry point is usable in this session.
    fn is_available(&self) -> bool;

    async fn open(&self) -> Result<(), ConnectorError>;
}

/// The connection state shared with the connector library.
#[derive(Debug, Clone)]
pub struct SharedConnection {
    tx: Arc<watch::Sender<Option<WalletConnection>>>,
}

impl SharedConnection {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, connection: WalletConnection) {
        self.tx.send_replace(Some(connection));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<WalletConnection> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<WalletConnection>> {
        self.tx.subscribe()
    }
}

impl Default for SharedConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until a connection appears. Resolves to `None` only if every
/// sender is gone.
pub(crate) async fn wait_for_connection(
    mut rx: watch::Receiver<Option<WalletConnection>>,
) -> Option<WalletConnection> {
    rx.wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|connection| connection.clone())
}

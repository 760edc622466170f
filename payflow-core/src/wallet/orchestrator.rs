//! Connection orchestrator.
//!
//! An attempt goes through the connector modal first. The modal gives no
//! reliable failure signal, so a fallback timer is armed when it opens: if
//! no connection has shown up in the shared state when the timer fires and
//! an injected provider is present, a direct provider request is raced
//! against the modal. Without a provider the modal stays the only path.
//!
//! ```text
//! Idle -> AwaitingModal -> (Connected | AwaitingDirectFallback)
//!      -> (Connected | Rejected | NoProvider | UnsupportedChainType | Failed)
//! ```

use kanau::processor::Processor;
use payflow_sdk::objects::ChainId;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::WalletConnection;
use super::connector::{ConnectorModal, SharedConnection, wait_for_connection};
use super::error::ConnectionError;
use super::provider::{EventHandler, ProviderEvent, Subscription, WalletProviderAdapter};

/// How long the modal gets before the direct provider path is added.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    AwaitingModal,
    AwaitingDirectFallback,
    Connected(WalletConnection),
    Rejected,
    NoProvider,
    /// The network is not EVM, or the wallet does not know it.
    UnsupportedChainType,
    Failed,
}

impl ConnectionState {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ConnectionState::AwaitingModal | ConnectionState::AwaitingDirectFallback
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending() && !matches!(self, ConnectionState::Idle)
    }

    pub fn connection(&self) -> Option<&WalletConnection> {
        match self {
            ConnectionState::Connected(connection) => Some(connection),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::AwaitingModal => "awaiting_modal",
            ConnectionState::AwaitingDirectFallback => "awaiting_direct_fallback",
            ConnectionState::Connected(_) => "connected",
            ConnectionState::Rejected => "rejected",
            ConnectionState::NoProvider => "no_provider",
            ConnectionState::UnsupportedChainType => "unsupported_chain_type",
            ConnectionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The path that decided an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPath {
    /// Decided before any wallet interaction.
    Precheck,
    Modal,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Connected,
    Rejected,
    ChainNotAdded,
    UnsupportedNetwork,
    NoProvider,
    Cancelled,
    Failed,
}

impl From<&Result<WalletConnection, ConnectionError>> for AttemptOutcome {
    fn from(result: &Result<WalletConnection, ConnectionError>) -> Self {
        match result {
            Ok(_) => AttemptOutcome::Connected,
            Err(ConnectionError::Rejected) => AttemptOutcome::Rejected,
            Err(ConnectionError::ChainNotAdded(_)) => AttemptOutcome::ChainNotAdded,
            Err(ConnectionError::UnsupportedNetwork(_)) => AttemptOutcome::UnsupportedNetwork,
            Err(ConnectionError::NoProvider) => AttemptOutcome::NoProvider,
            Err(ConnectionError::Cancelled) => AttemptOutcome::Cancelled,
            Err(ConnectionError::AttemptInProgress | ConnectionError::Unknown { .. }) => {
                AttemptOutcome::Failed
            }
        }
    }
}

/// Record of a resolved attempt.
#[derive(Debug, Clone)]
pub struct ConnectionAttempt {
    pub id: Uuid,
    pub started_at: OffsetDateTime,
    pub target_chain: ChainId,
    pub path: AttemptPath,
    pub outcome: AttemptOutcome,
}

/// Start a connection attempt towards `target_chain`.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub target_chain: ChainId,
    /// Cancelling returns the orchestrator to [`ConnectionState::Idle`].
    pub cancel: CancellationToken,
}

enum Plan {
    Reuse(WalletConnection),
    /// A connection the connector wrote before this attempt started.
    Adopt(WalletConnection),
    Fail(ConnectionError),
    Modal(Arc<dyn ConnectorModal>),
    Direct,
}

/// Drives wallet connection attempts for one checkout session.
pub struct ConnectionOrchestrator {
    adapter: WalletProviderAdapter,
    connector: Option<Arc<dyn ConnectorModal>>,
    shared: SharedConnection,
    fallback_delay: Duration,
    state: Arc<watch::Sender<ConnectionState>>,
    subscription: Mutex<Option<Subscription>>,
}

impl ConnectionOrchestrator {
    pub fn new(adapter: WalletProviderAdapter, shared: SharedConnection) -> Self {
        let (state, _rx) = watch::channel(ConnectionState::Idle);
        Self {
            adapter,
            connector: None,
            shared,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
            state: Arc::new(state),
            subscription: Mutex::new(None),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn ConnectorModal>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn shared_connection(&self) -> &SharedConnection {
        &self.shared
    }

    /// The current connection, if any.
    pub fn connection(&self) -> Option<WalletConnection> {
        self.state.borrow().connection().cloned()
    }

    /// Connect a wallet for `target_chain`.
    ///
    /// Returns the existing connection without a new handshake when one is
    /// already established. Fails with [`ConnectionError::AttemptInProgress`]
    /// while another attempt is pending.
    pub async fn connect(
        &self,
        target_chain: ChainId,
        cancel: CancellationToken,
    ) -> Result<WalletConnection, ConnectionError> {
        let plan = self.plan(target_chain);
        let started_at = OffsetDateTime::now_utc();

        let (path, result) = match plan {
            Plan::Reuse(connection) => {
                debug!(address = %connection.address, chain = %connection.chain, "Reusing existing wallet connection");
                return Ok(connection);
            }
            Plan::Fail(ConnectionError::AttemptInProgress) => {
                debug!(chain = %target_chain, "Connection attempt already in progress");
                return Err(ConnectionError::AttemptInProgress);
            }
            Plan::Adopt(connection) => (AttemptPath::Modal, Ok(connection)),
            Plan::Fail(error) => (AttemptPath::Precheck, Err(error)),
            Plan::Modal(connector) => self.run_modal(connector, target_chain, &cancel).await,
            Plan::Direct => (
                AttemptPath::Direct,
                self.race_direct(target_chain, &cancel).await,
            ),
        };

        let attempt = ConnectionAttempt {
            id: Uuid::now_v7(),
            started_at,
            target_chain,
            path,
            outcome: AttemptOutcome::from(&result),
        };
        self.finish(attempt, result)
    }

    /// Decide the path and enter its state in one step, so two concurrent
    /// callers cannot both start an attempt.
    fn plan(&self, target_chain: ChainId) -> Plan {
        let mut plan = Plan::Direct;
        self.state.send_if_modified(|state| {
            if state.is_pending() {
                plan = Plan::Fail(ConnectionError::AttemptInProgress);
                return false;
            }
            if let ConnectionState::Connected(connection) = state {
                plan = Plan::Reuse(connection.clone());
                return false;
            }
            if let Some(connection) = self.shared.current() {
                *state = ConnectionState::Connected(connection.clone());
                plan = Plan::Adopt(connection);
                return true;
            }

            let family = target_chain.family();
            let (next, chosen) = if !family.is_evm() {
                (
                    ConnectionState::UnsupportedChainType,
                    Plan::Fail(ConnectionError::UnsupportedNetwork(family)),
                )
            } else if !self.adapter.is_present() {
                (
                    ConnectionState::NoProvider,
                    Plan::Fail(ConnectionError::NoProvider),
                )
            } else if let Some(connector) = self.connector.as_ref().filter(|c| c.is_available()) {
                (ConnectionState::AwaitingModal, Plan::Modal(connector.clone()))
            } else {
                (ConnectionState::AwaitingDirectFallback, Plan::Direct)
            };
            debug!(chain = %target_chain, state = %next, "Connection attempt planned");
            *state = next;
            plan = chosen;
            true
        });
        plan
    }

    async fn run_modal(
        &self,
        connector: Arc<dyn ConnectorModal>,
        target_chain: ChainId,
        cancel: &CancellationToken,
    ) -> (AttemptPath, Result<WalletConnection, ConnectionError>) {
        if let Err(e) = connector.open().await {
            if self.adapter.is_present() {
                warn!(error = %e, "Connector modal failed, using direct provider request");
                self.transition(ConnectionState::AwaitingDirectFallback);
                return (
                    AttemptPath::Direct,
                    self.race_direct(target_chain, cancel).await,
                );
            }
            warn!(error = %e, "Connector modal failed and no provider is injected");
            return (AttemptPath::Modal, Err(ConnectionError::NoProvider));
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => return (AttemptPath::Modal, Err(ConnectionError::Cancelled)),

            Some(connection) = wait_for_connection(self.shared.subscribe()) => {
                return (AttemptPath::Modal, Ok(connection));
            }

            _ = tokio::time::sleep(self.fallback_delay) => {}
        }

        if self.adapter.is_present() {
            info!(
                delay = ?self.fallback_delay,
                "Modal produced no connection, adding direct provider request"
            );
            self.transition(ConnectionState::AwaitingDirectFallback);
            return (
                AttemptPath::Direct,
                self.race_direct(target_chain, cancel).await,
            );
        }

        debug!("No provider at fallback time, waiting on the modal");
        tokio::select! {
            biased;

            _ = cancel.cancelled() => (AttemptPath::Modal, Err(ConnectionError::Cancelled)),

            Some(connection) = wait_for_connection(self.shared.subscribe()) => {
                (AttemptPath::Modal, Ok(connection))
            }
        }
    }

    /// Direct provider request, raced against the modal writing to the
    /// shared connection.
    async fn race_direct(
        &self,
        target_chain: ChainId,
        cancel: &CancellationToken,
    ) -> Result<WalletConnection, ConnectionError> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(ConnectionError::Cancelled),

            Some(connection) = wait_for_connection(self.shared.subscribe()) => Ok(connection),

            result = self.adapter.request_connection(target_chain) => result,
        }
    }

    fn transition(&self, next: ConnectionState) {
        debug!(state = %next, "Connection state changed");
        self.state.send_replace(next);
    }

    fn finish(
        &self,
        attempt: ConnectionAttempt,
        result: Result<WalletConnection, ConnectionError>,
    ) -> Result<WalletConnection, ConnectionError> {
        match &result {
            Ok(connection) => {
                self.shared.set(connection.clone());
                self.transition(ConnectionState::Connected(connection.clone()));
                self.watch_provider();
                info!(
                    attempt = %attempt.id,
                    chain = %attempt.target_chain,
                    path = ?attempt.path,
                    outcome = ?attempt.outcome,
                    address = %connection.address,
                    "Wallet connected"
                );
            }
            Err(e) => {
                if let Some(next) = e.state() {
                    self.transition(next);
                }
                warn!(
                    attempt = %attempt.id,
                    chain = %attempt.target_chain,
                    path = ?attempt.path,
                    outcome = ?attempt.outcome,
                    error = %e,
                    "Wallet connection attempt failed"
                );
            }
        }
        result
    }

    /// Replace the provider event subscription with one bound to the
    /// current connection.
    fn watch_provider(&self) {
        let state = self.state.clone();
        let shared = self.shared.clone();
        let handler: EventHandler =
            Arc::new(move |event| apply_provider_event(&state, &shared, event));
        let subscription = self.adapter.subscribe(handler);
        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = subscription;
    }

    /// Forget the connection and release the provider listeners.
    ///
    /// Ignored while an attempt is pending; cancel the attempt instead.
    pub fn disconnect(&self) {
        let mut pending = false;
        self.state.send_if_modified(|state| {
            pending = state.is_pending();
            if pending || *state == ConnectionState::Idle {
                return false;
            }
            *state = ConnectionState::Idle;
            true
        });
        if pending {
            debug!("Disconnect ignored while a connection attempt is pending");
            return;
        }
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.shared.clear();
        info!("Wallet disconnected");
    }

    /// Return a failed attempt to [`ConnectionState::Idle`]. Pending and
    /// connected states are left alone.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_terminal() && state.connection().is_none() {
                *state = ConnectionState::Idle;
                true
            } else {
                false
            }
        });
    }
}

fn apply_provider_event(
    state: &watch::Sender<ConnectionState>,
    shared: &SharedConnection,
    event: ProviderEvent,
) {
    match event {
        ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
            None => {
                let changed = state.send_if_modified(|state| {
                    if state.connection().is_some() {
                        *state = ConnectionState::Idle;
                        true
                    } else {
                        false
                    }
                });
                if changed {
                    shared.clear();
                    info!("Wallet removed all accounts");
                }
            }
            Some(address) => {
                state.send_if_modified(|state| match state {
                    ConnectionState::Connected(connection) if connection.address != address => {
                        connection.address = address.clone();
                        shared.set(connection.clone());
                        debug!(%address, "Wallet account changed");
                        true
                    }
                    _ => false,
                });
            }
        },
        ProviderEvent::ChainChanged(chain) => {
            state.send_if_modified(|state| match state {
                ConnectionState::Connected(connection) if connection.chain != chain => {
                    connection.chain = chain;
                    shared.set(connection.clone());
                    debug!(%chain, "Wallet network changed");
                    true
                }
                _ => false,
            });
        }
    }
}

impl Processor<ConnectRequest> for ConnectionOrchestrator {
    type Output = WalletConnection;
    type Error = ConnectionError;

    async fn process(&self, request: ConnectRequest) -> Result<WalletConnection, ConnectionError> {
        self.connect(request.target_chain, request.cancel).await
    }
}

//! Call-counting mocks of the provider and connector boundaries.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::connector::{ConnectorError, ConnectorModal, SharedConnection};
use super::provider::{
    Eip1193Provider, EventHandler, ListenerId, ProviderError, ProviderEvent, ProviderEventKind,
    WalletProviderHandle,
};
use super::WalletConnection;

#[derive(Debug, Clone)]
pub(crate) enum ProviderBehaviour {
    Accounts { accounts: Vec<String>, chain: String },
    Reject(ProviderError),
    /// Never answers.
    Hang,
}

impl ProviderBehaviour {
    pub fn accept(address: &str, chain: &str) -> Self {
        ProviderBehaviour::Accounts {
            accounts: vec![address.to_owned()],
            chain: chain.to_owned(),
        }
    }

    pub fn reject(code: i64) -> Self {
        ProviderBehaviour::Reject(ProviderError::new(code, "mock rejection"))
    }
}

pub(crate) struct MockProvider {
    behaviour: Mutex<ProviderBehaviour>,
    requests: AtomicUsize,
    connection_requests: AtomicUsize,
    next_listener: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, ProviderEventKind, EventHandler)>>,
}

impl MockProvider {
    pub fn new(behaviour: ProviderBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Mutex::new(behaviour),
            requests: AtomicUsize::new(0),
            connection_requests: AtomicUsize::new(0),
            next_listener: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behaviour(&self, behaviour: ProviderBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    /// Every `request` call, whatever the method.
    pub fn request_calls(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// `eth_requestAccounts` calls only.
    pub fn connection_requests(&self) -> usize {
        self.connection_requests.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Fire `kind` with a raw payload to every registered handler.
    pub fn emit(&self, kind: ProviderEventKind, payload: Value) {
        let event = ProviderEvent::from_payload(kind, &payload).unwrap();
        let handlers: Vec<EventHandler> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, event_kind, _)| *event_kind == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(event.clone());
        }
    }
}

#[async_trait]
impl Eip1193Provider for MockProvider {
    async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if method == "eth_requestAccounts" {
            self.connection_requests.fetch_add(1, Ordering::SeqCst);
        }
        let behaviour = self.behaviour.lock().unwrap().clone();
        match (method, behaviour) {
            (_, ProviderBehaviour::Hang) => std::future::pending().await,
            (_, ProviderBehaviour::Reject(error)) => Err(error),
            ("eth_requestAccounts", ProviderBehaviour::Accounts { accounts, .. }) => {
                Ok(json!(accounts))
            }
            ("eth_chainId", ProviderBehaviour::Accounts { chain, .. }) => Ok(json!(chain)),
            (other, _) => Err(ProviderError::new(-32601, format!("unsupported: {other}"))),
        }
    }

    fn on(&self, event: ProviderEventKind, handler: EventHandler) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().push((id, event, handler));
        id
    }

    fn remove_listener(&self, event: ProviderEventKind, listener: ListenerId) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|(id, kind, _)| !(*id == listener && *kind == event));
    }
}

/// An injection slot the tests can fill or empty at any time.
pub(crate) struct MockHandle {
    provider: Mutex<Option<Arc<MockProvider>>>,
}

impl MockHandle {
    pub fn present(provider: Arc<MockProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider: Mutex::new(Some(provider)),
        })
    }

    pub fn absent() -> Arc<Self> {
        Arc::new(Self {
            provider: Mutex::new(None),
        })
    }

    pub fn uninstall(&self) {
        self.provider.lock().unwrap().take();
    }
}

impl WalletProviderHandle for MockHandle {
    fn probe(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.provider
            .lock()
            .unwrap()
            .clone()
            .map(|provider| provider as Arc<dyn Eip1193Provider>)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ModalBehaviour {
    /// Opens and never reports anything.
    Silent,
    /// Writes `connection` to the shared state after `delay`.
    ConnectAfter(Duration, WalletConnection),
    FailToOpen,
}

pub(crate) struct MockModal {
    available: bool,
    behaviour: ModalBehaviour,
    shared: SharedConnection,
    opens: AtomicUsize,
}

impl MockModal {
    pub fn new(behaviour: ModalBehaviour, shared: SharedConnection) -> Arc<Self> {
        Arc::new(Self {
            available: true,
            behaviour,
            shared,
            opens: AtomicUsize::new(0),
        })
    }

    pub fn unavailable(shared: SharedConnection) -> Arc<Self> {
        Arc::new(Self {
            available: false,
            behaviour: ModalBehaviour::Silent,
            shared,
            opens: AtomicUsize::new(0),
        })
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectorModal for MockModal {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn open(&self) -> Result<(), ConnectorError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            ModalBehaviour::Silent => Ok(()),
            ModalBehaviour::ConnectAfter(delay, connection) => {
                let (delay, connection) = (*delay, connection.clone());
                let shared = self.shared.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    shared.set(connection);
                });
                Ok(())
            }
            ModalBehaviour::FailToOpen => {
                Err(ConnectorError::OpenFailed("modal script not loaded".to_owned()))
            }
        }
    }
}

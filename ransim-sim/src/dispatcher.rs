//! Event dispatcher
//!
//! Named-listener fan-out from simulation mutations to protocol sessions.
//! Each listener gets its own bounded channel, so a slow listener applies
//! backpressure to the publisher instead of losing events.

use std::collections::HashMap;

use ransim_common::{EventType, Route, Ue, UpdateType};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// Dispatcher errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatcherError {
    /// A listener with this name already exists
    #[error("listener {0} is already registered")]
    AlreadyRegistered(String),
}

/// The entity an event refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Snapshot of a UE after the mutation
    Ue(Ue),
    /// A replacement route
    Route(Route),
}

/// A simulation mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Created, updated or deleted
    pub event_type: EventType,
    /// Set for UE updates only
    pub update_type: Option<UpdateType>,
    /// Mutated entity
    pub payload: EventPayload,
}

impl Event {
    /// A UE update event.
    pub fn ue_updated(ue: Ue, update_type: UpdateType) -> Self {
        Self {
            event_type: EventType::Updated,
            update_type: Some(update_type),
            payload: EventPayload::Ue(ue),
        }
    }

    /// A route replacement event.
    pub fn route_updated(route: Route) -> Self {
        Self {
            event_type: EventType::Updated,
            update_type: None,
            payload: EventPayload::Route(route),
        }
    }

    /// Returns the UE if this is a tower-changed UE update.
    pub fn as_handover(&self) -> Option<&Ue> {
        match (&self.payload, self.update_type) {
            (EventPayload::Ue(ue), Some(UpdateType::Tower)) => Some(ue),
            _ => None,
        }
    }
}

/// Publish/subscribe registry keyed by listener name.
#[derive(Debug)]
pub struct Dispatcher {
    listeners: RwLock<HashMap<String, mpsc::Sender<Event>>>,
    capacity: usize,
}

impl Dispatcher {
    /// Creates a dispatcher whose listener channels hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Registers a listener and returns its receiving end.
    pub async fn register(&self, name: &str) -> Result<mpsc::Receiver<Event>, DispatcherError> {
        let mut listeners = self.listeners.write().await;
        if listeners.contains_key(name) {
            return Err(DispatcherError::AlreadyRegistered(name.to_string()));
        }
        let (tx, rx) = mpsc::channel(self.capacity);
        listeners.insert(name.to_string(), tx);
        info!("Registered listener {}", name);
        Ok(rx)
    }

    /// Removes a listener. Unknown names are ignored.
    pub async fn unregister(&self, name: &str) {
        if self.listeners.write().await.remove(name).is_some() {
            info!("Unregistered listener {}", name);
        }
    }

    /// Delivers an event to every registered listener.
    ///
    /// Waits while a listener's channel is full. Returns the number of
    /// listeners the event was delivered to.
    pub async fn publish(&self, event: Event) -> usize {
        let targets: Vec<(String, mpsc::Sender<Event>)> = self
            .listeners
            .read()
            .await
            .iter()
            .map(|(name, tx)| (name.clone(), tx.clone()))
            .collect();

        let mut delivered = 0;
        for (name, tx) in targets {
            match tx.send(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => warn!("Listener {} is gone, event dropped", name),
            }
        }
        debug!("Published {:?} event to {} listener(s)", event.event_type, delivered);
        delivered
    }

    /// Number of registered listeners.
    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Returns true if `name` is registered.
    pub async fn is_registered(&self, name: &str) -> bool {
        self.listeners.read().await.contains_key(name)
    }
}

//! Subscriber Registry
//!
//! Process-scoped set of connected sessions. `publish` fans an event out to
//! every session without blocking: a session whose queue is full misses the
//! event, a session whose receiver is gone is pruned.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use kernel::id::ConnectionId;
use tokio::sync::mpsc;

use crate::event::RelayEvent;

/// Default per-session queue length
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

pub struct NotificationRelay {
    sessions: RwLock<HashMap<ConnectionId, mpsc::Sender<RelayEvent>>>,
    queue_capacity: usize,
}

impl NotificationRelay {
    pub fn new(queue_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        })
    }

    /// Register a new session. Dropping the returned handle unregisters it.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = ConnectionId::new();

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);

        tracing::debug!(connection_id = %id, "Relay session registered");

        Subscription {
            id,
            receiver: rx,
            relay: Arc::clone(self),
        }
    }

    /// Deliver `event` to every session; returns how many queues accepted it
    pub fn publish(&self, event: RelayEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            for (id, tx) in sessions.iter() {
                match tx.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::debug!(connection_id = %id, event = event.name(), "Relay queue full, event dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            for id in &closed {
                sessions.remove(id);
            }
        }

        tracing::trace!(event = event.name(), delivered, "Relay event published");
        delivered
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn unregister(&self, id: &ConnectionId) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            tracing::debug!(connection_id = %id, "Relay session unregistered");
        }
    }
}

impl Default for NotificationRelay {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// One connected session's receiving end
pub struct Subscription {
    id: ConnectionId,
    receiver: mpsc::Receiver<RelayEvent>,
    relay: Arc<NotificationRelay>,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub async fn recv(&mut self) -> Option<RelayEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RelayEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.relay.unregister(&self.id);
    }
}

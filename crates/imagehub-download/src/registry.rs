//! Registry of live listeners, one per job identity.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use imagehub_entity::JobIdentity;

use crate::listener::{ListenerHandle, ListenerId};

/// Tracks the listener that owns each in-flight job.
///
/// Submitting a listener for an identity that already has one displaces
/// the old listener; it is abandoned before `submit` returns.
#[derive(Debug, Default)]
pub struct JobRegistry {
    listeners: Mutex<HashMap<JobIdentity, Arc<ListenerHandle>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener` as the owner of its identity and return the
    /// listener it displaced, already abandoned.
    pub async fn submit(&self, listener: Arc<ListenerHandle>) -> Option<Arc<ListenerHandle>> {
        let identity = listener.identity();
        let previous = {
            let mut listeners = self.listeners.lock().await;
            // The old owner stops writing before the new one is visible.
            if let Some(current) = listeners
                .get(&identity)
                .filter(|current| current.id() != listener.id())
            {
                current.cancel();
            }
            listeners.insert(identity, listener.clone())
        };

        let previous = previous.filter(|prev| prev.id() != listener.id())?;
        tracing::debug!(
            %identity,
            displaced = %previous.id(),
            listener = %listener.id(),
            "Displacing stale listener"
        );
        previous.abandon().await;
        Some(previous)
    }

    /// Remove the entry for `identity` if `listener_id` still owns it.
    pub async fn deregister(&self, identity: &JobIdentity, listener_id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().await;
        match listeners.get(identity) {
            Some(current) if current.id() == listener_id => {
                listeners.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// Listener currently owning `identity`.
    pub async fn get(&self, identity: &JobIdentity) -> Option<Arc<ListenerHandle>> {
        self.listeners.lock().await.get(identity).cloned()
    }

    pub async fn len(&self) -> usize {
        self.listeners.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listeners.lock().await.is_empty()
    }

    /// Identities with a live listener.
    pub async fn active_identities(&self) -> Vec<JobIdentity> {
        self.listeners.lock().await.keys().copied().collect()
    }

    /// Listeners whose command went out through `endpoint_id`.
    pub async fn listeners_on_endpoint(&self, endpoint_id: &str) -> Vec<Arc<ListenerHandle>> {
        self.listeners
            .lock()
            .await
            .values()
            .filter(|listener| listener.endpoint_id() == endpoint_id)
            .cloned()
            .collect()
    }

    /// Empty the registry, abandoning every listener in it.
    pub async fn abandon_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut listeners = self.listeners.lock().await;
            listeners.drain().map(|(_, listener)| listener).collect()
        };

        for listener in &drained {
            listener.abandon().await;
        }
        drained.len()
    }
}

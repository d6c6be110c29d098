//! Connection Registry
//!
//! The live set of handles attached to one match. Only the host adds and
//! removes entries; the relay reads snapshots during fan-out.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::network::client::{ClientHandle, ConnectionId};

/// Attached handles keyed by connection id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: RwLock<BTreeMap<ConnectionId, Arc<ClientHandle>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle. Returns false if it was already present.
    pub async fn insert(&self, handle: Arc<ClientHandle>) -> bool {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&handle.id()) {
            return false;
        }
        clients.insert(handle.id(), handle);
        true
    }

    /// Remove a handle. Absent ids are a no-op.
    pub async fn remove(&self, id: &ConnectionId) -> Option<Arc<ClientHandle>> {
        self.clients.write().await.remove(id)
    }

    /// Whether a handle is attached.
    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.clients.read().await.contains_key(id)
    }

    /// Number of attached handles.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// True when nothing is attached.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// Copy of the current handles. The lock is released before returning,
    /// so sends never run while the registry is held.
    pub async fn snapshot(&self) -> Vec<Arc<ClientHandle>> {
        self.clients.read().await.values().cloned().collect()
    }

    /// Handles claiming `player_id`.
    pub async fn for_player(&self, player_id: &str) -> Vec<Arc<ClientHandle>> {
        self.clients
            .read()
            .await
            .values()
            .filter(|h| h.player_id() == Some(player_id))
            .cloned()
            .collect()
    }
}

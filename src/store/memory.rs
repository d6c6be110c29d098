//! In-Memory Match Store
//!
//! Process-local [`MatchStore`] used by a peer that hosts its own match.
//! Nothing survives a restart.

use std::collections::BTreeMap;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::game::metadata::{now_millis, MatchId, MatchMetadata, StoredMatch};
use crate::store::{MatchStore, StoreError};

/// Match store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    matches: RwLock<BTreeMap<MatchId, StoredMatch>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all stored matches, in order.
    pub async fn list_matches(&self) -> Vec<MatchId> {
        self.matches.read().await.keys().cloned().collect()
    }

    /// Remove a match. Returns whether it existed.
    pub async fn wipe(&self, match_id: &str) -> bool {
        self.matches.write().await.remove(match_id).is_some()
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn create_match(&self, match_id: &str, initial: StoredMatch) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        if matches.contains_key(match_id) {
            return Err(StoreError::MatchExists(match_id.to_string()));
        }
        matches.insert(match_id.to_string(), initial);
        Ok(())
    }

    async fn fetch(&self, match_id: &str) -> Result<StoredMatch, StoreError> {
        self.matches
            .read()
            .await
            .get(match_id)
            .cloned()
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))
    }

    async fn set_metadata(&self, match_id: &str, mut metadata: MatchMetadata) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;
        metadata.updated_at = now_millis();
        stored.metadata = metadata;
        Ok(())
    }

    async fn set_state(&self, match_id: &str, state: Value) -> Result<(), StoreError> {
        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(match_id)
            .ok_or_else(|| StoreError::MatchNotFound(match_id.to_string()))?;
        stored.state = state;
        Ok(())
    }
}

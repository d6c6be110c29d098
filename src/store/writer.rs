//! Serialized Metadata Writes
//!
//! The store only offers whole-record replacement, so every
//! fetch-modify-write of one match's metadata must run under a single lock
//! or concurrent writers lose each other's changes. [`MetadataWriter`] owns
//! that lock. The authorization gate and the authority engine share it.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::game::metadata::{MatchId, MatchMetadata, StoredMatch};
use crate::store::{MatchStore, StoreError};

/// Per-match metadata updater.
pub struct MetadataWriter {
    match_id: MatchId,
    store: Arc<dyn MatchStore>,
    lock: Mutex<()>,
}

impl MetadataWriter {
    /// Writer for `match_id` in `store`.
    pub fn new(match_id: impl Into<MatchId>, store: Arc<dyn MatchStore>) -> Self {
        Self {
            match_id: match_id.into(),
            store,
            lock: Mutex::new(()),
        }
    }

    /// Match this writer serves.
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Current state and metadata.
    pub async fn fetch(&self) -> Result<StoredMatch, StoreError> {
        self.store.fetch(&self.match_id).await
    }

    /// Apply `f` to a copy of the metadata and store the copy, all under the
    /// match lock. Nothing is written when `f` leaves the metadata unchanged.
    ///
    /// Credentials already bound to a seat are restored after `f` runs, so
    /// an update can bind an unbound seat but never rebind or unbind one.
    pub async fn update<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut MatchMetadata) -> R + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;

        let current = self.store.fetch(&self.match_id).await?.metadata;
        let mut next = current.clone();
        let result = f(&mut next);
        keep_bindings(&current, &mut next);

        if next != current {
            self.store.set_metadata(&self.match_id, next).await?;
        }
        Ok(result)
    }
}

fn keep_bindings(current: &MatchMetadata, next: &mut MatchMetadata) {
    for (seat, player) in &current.players {
        if player.bound_credentials().is_none() {
            continue;
        }
        if let Some(updated) = next.players.get_mut(seat) {
            updated.credentials = player.credentials.clone();
        }
    }
}

//! Match Store
//!
//! Key-value persistence for match state and seat metadata, keyed by match id.
//! The host only reads metadata and replaces it wholesale; it never patches it.

pub mod memory;
pub mod writer;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::game::metadata::{MatchId, MatchMetadata, StoredMatch};

pub use memory::InMemoryStore;
pub use writer::MetadataWriter;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No match with this id.
    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    /// A match with this id already exists.
    #[error("match already exists: {0}")]
    MatchExists(MatchId),

    /// Backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence for matches.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Create a match. Fails if the id is taken.
    async fn create_match(&self, match_id: &str, initial: StoredMatch) -> Result<(), StoreError>;

    /// Fetch state and metadata.
    async fn fetch(&self, match_id: &str) -> Result<StoredMatch, StoreError>;

    /// Replace the metadata record.
    async fn set_metadata(&self, match_id: &str, metadata: MatchMetadata) -> Result<(), StoreError>;

    /// Replace the game state.
    async fn set_state(&self, match_id: &str, state: Value) -> Result<(), StoreError>;
}

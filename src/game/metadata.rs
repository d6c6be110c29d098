//! Persisted Match Metadata
//!
//! The per-match record kept by a [`MatchStore`](crate::store::MatchStore):
//! the opaque game state plus the seat table that carries credential bindings.
//! Uses BTreeMap so seats iterate in index order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Opaque identifier of one match.
pub type MatchId = String;

/// Numeric player seat within a match (`"0"`, `"1"`, ... on the wire).
pub type SeatIndex = u32;

/// Current wall-clock time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
// PLAYER METADATA
// =============================================================================

/// Persisted information about one seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMetadata {
    /// Seat index.
    pub id: SeatIndex,
    /// Display name, if the lobby assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Credentials bound to this seat. Immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    /// Connection flag maintained by the authority engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
}

impl PlayerMetadata {
    /// Create an unbound seat.
    pub fn new(id: SeatIndex) -> Self {
        Self { id, ..Default::default() }
    }

    /// Credentials that actually bind this seat.
    ///
    /// An empty stored string never counts as a binding.
    pub fn bound_credentials(&self) -> Option<&str> {
        self.credentials.as_deref().filter(|c| !c.is_empty())
    }
}

/// Seat information that is safe to show to every participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPlayerInfo {
    /// Seat index.
    pub id: SeatIndex,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether a client for this seat is currently attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
}

impl From<&PlayerMetadata> for PublicPlayerInfo {
    fn from(player: &PlayerMetadata) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            is_connected: player.is_connected,
        }
    }
}

// =============================================================================
// MATCH METADATA
// =============================================================================

/// Metadata for a whole match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// Name of the game definition that created the match.
    pub game_name: String,
    /// Seat table.
    pub players: BTreeMap<SeatIndex, PlayerMetadata>,
    /// Setup data the match was created with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_data: Option<Value>,
    /// Game-over payload, once the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameover: Option<Value>,
    /// Creation time (Unix ms).
    pub created_at: i64,
    /// Last metadata write (Unix ms).
    pub updated_at: i64,
}

impl MatchMetadata {
    /// Create metadata with `num_players` unbound seats.
    pub fn new(game_name: impl Into<String>, num_players: SeatIndex, setup_data: Option<Value>) -> Self {
        let now = now_millis();
        let players = (0..num_players)
            .map(|id| (id, PlayerMetadata::new(id)))
            .collect();

        Self {
            game_name: game_name.into(),
            players,
            setup_data,
            gameover: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a seat.
    pub fn player(&self, seat: SeatIndex) -> Option<&PlayerMetadata> {
        self.players.get(&seat)
    }

    /// Copy of this metadata with `credentials` bound to `seat`.
    ///
    /// The receiver is left untouched; callers replace the stored record
    /// wholesale with the returned value.
    pub fn with_credentials(&self, seat: SeatIndex, credentials: &str) -> Self {
        let mut next = self.clone();
        if let Some(player) = next.players.get_mut(&seat) {
            player.credentials = Some(credentials.to_string());
        }
        next
    }

    /// Seat table with credentials stripped.
    pub fn public_players(&self) -> Vec<PublicPlayerInfo> {
        self.players.values().map(PublicPlayerInfo::from).collect()
    }
}

/// A match as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
    /// Opaque game state owned by the authority engine.
    pub state: Value,
    /// Seat table and bookkeeping.
    pub metadata: MatchMetadata,
}

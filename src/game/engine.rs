//! Authority Engine Interface
//!
//! The turn-based state machine the host drives. It validates moves, owns
//! turn order and end conditions, and emits outbound messages through the
//! [`StateDistributor`] handed to each call. The host never inspects the
//! arguments it forwards.

use async_trait::async_trait;
use serde_json::Value;

use crate::game::metadata::MatchId;
use crate::network::relay::StateDistributor;

/// A client attached to or detached from the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionChange {
    /// Match the client belongs to.
    pub match_id: MatchId,
    /// Claimed seat; `None` for spectators.
    pub player_id: Option<String>,
    /// Credentials the client offered.
    pub credentials: Option<String>,
    /// True on attach, false on detach.
    pub connected: bool,
}

/// Game-state engine for one match.
#[async_trait]
pub trait AuthorityEngine: Send + Sync {
    /// A client submitted a move or event.
    async fn on_update(&self, args: Vec<Value>, out: &dyn StateDistributor);

    /// A client asked for the full state.
    async fn on_sync(&self, args: Vec<Value>, out: &dyn StateDistributor);

    /// A client sent a chat message.
    async fn on_chat_message(&self, args: Vec<Value>, out: &dyn StateDistributor);

    /// A client attached or detached.
    async fn on_connection_change(&self, change: ConnectionChange, out: &dyn StateDistributor);
}

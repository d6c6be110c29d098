//! Player View Filtering
//!
//! Per-recipient projection of outbound messages. Hidden-information games
//! must never leak another seat's secrets, so every message is filtered for
//! its recipient right before delivery.

use serde_json::Value;

use crate::game::definition::{GameDefinition, PlayerViewFn};
use crate::network::protocol::{ServerMessage, SyncInfo};

/// Redacts a message for one recipient (`None` = spectator).
pub trait ViewFilter: Send + Sync {
    /// Produce the recipient's copy of `message`.
    fn filter(&self, recipient: Option<&str>, message: &ServerMessage) -> ServerMessage;
}

/// Passes every message through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl ViewFilter for IdentityFilter {
    fn filter(&self, _recipient: Option<&str>, message: &ServerMessage) -> ServerMessage {
        message.clone()
    }
}

/// Standard filter built from a game's player-view projection.
///
/// - `Update`: `state.g` projected, deltalog redacted.
/// - `Sync`: current and initial `g` projected, log redacted.
/// - `MatchData`, `Chat`: unchanged.
#[derive(Clone, Default)]
pub struct PlayerViewFilter {
    view: Option<PlayerViewFn>,
}

impl PlayerViewFilter {
    /// Filter for `game`.
    pub fn from_game(game: &GameDefinition) -> Self {
        Self { view: game.player_view_fn() }
    }

    /// Filter from a bare projection function.
    pub fn new(view: PlayerViewFn) -> Self {
        Self { view: Some(view) }
    }

    fn project_state(&self, state: &Value, recipient: Option<&str>) -> Value {
        let Some(view) = &self.view else {
            return state.clone();
        };
        let mut projected = state.clone();
        if let Some(g) = state.get("g") {
            projected["g"] = view(g, recipient);
        }
        projected
    }
}

impl ViewFilter for PlayerViewFilter {
    fn filter(&self, recipient: Option<&str>, message: &ServerMessage) -> ServerMessage {
        match message {
            ServerMessage::Update { match_id, state, deltalog } => ServerMessage::Update {
                match_id: match_id.clone(),
                state: self.project_state(state, recipient),
                deltalog: redact_log(deltalog, recipient),
            },
            ServerMessage::Sync { match_id, sync_info } => ServerMessage::Sync {
                match_id: match_id.clone(),
                sync_info: SyncInfo {
                    state: self.project_state(&sync_info.state, recipient),
                    filtered_metadata: sync_info.filtered_metadata.clone(),
                    initial_state: self.project_state(&sync_info.initial_state, recipient),
                    log: redact_log(&sync_info.log, recipient),
                },
            },
            ServerMessage::MatchData { .. } | ServerMessage::Chat { .. } => message.clone(),
        }
    }
}

/// Strip the arguments of `"redact": true` log entries made by other seats.
///
/// Entries look like `{"action": {"payload": {"player_id": "0", "args": ...}}, "redact": true}`.
pub fn redact_log(log: &[Value], recipient: Option<&str>) -> Vec<Value> {
    log.iter()
        .map(|entry| {
            if entry.get("redact").and_then(Value::as_bool) != Some(true) {
                return entry.clone();
            }
            let actor = entry
                .pointer("/action/payload/player_id")
                .and_then(Value::as_str);
            if recipient.is_some() && actor == recipient {
                return entry.clone();
            }
            let mut redacted = entry.clone();
            if let Some(payload) = redacted.pointer_mut("/action/payload") {
                if let Some(obj) = payload.as_object_mut() {
                    obj.insert("args".into(), Value::Null);
                }
            }
            redacted
        })
        .collect()
}

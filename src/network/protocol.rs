//! Protocol Messages
//!
//! Shapes exchanged between the host and attached clients. The transport
//! decides how these travel; JSON helpers are provided for text transports.
//! Game state, logs and chat bodies stay opaque (`serde_json::Value`).

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::game::metadata::{MatchId, PublicPlayerInfo};

// =============================================================================
// CLIENT -> HOST
// =============================================================================

/// An inbound client action: `{"type": "...", "args": [...]}`.
///
/// The kind is kept as a raw string so that unknown kinds from untrusted
/// peers still parse and can be ignored by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAction {
    /// Action kind (`update`, `sync`, `chat`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Positional arguments for the engine entry point.
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Recognised action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// State update (a move or event).
    Update,
    /// Full-state sync request.
    Sync,
    /// Chat message.
    Chat,
}

impl ActionKind {
    /// Parse a wire kind. Unknown kinds yield `None`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "update" => Some(Self::Update),
            "sync" => Some(Self::Sync),
            "chat" => Some(Self::Chat),
            _ => None,
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Sync => "sync",
            Self::Chat => "chat",
        }
    }
}

impl ClientAction {
    /// Build an action of any kind.
    pub fn new(kind: impl Into<String>, args: Vec<Value>) -> Self {
        Self { kind: kind.into(), args }
    }

    /// `update` action.
    pub fn update(args: Vec<Value>) -> Self {
        Self::new(ActionKind::Update.as_str(), args)
    }

    /// `sync` action.
    pub fn sync(args: Vec<Value>) -> Self {
        Self::new(ActionKind::Sync.as_str(), args)
    }

    /// `chat` action.
    pub fn chat(args: Vec<Value>) -> Self {
        Self::new(ActionKind::Chat.as_str(), args)
    }

    /// Recognised kind, if any.
    pub fn action_kind(&self) -> Option<ActionKind> {
        ActionKind::parse(&self.kind)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// =============================================================================
// HOST -> CLIENT
// =============================================================================

/// Full state handed to a client on sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncInfo {
    /// Current state.
    pub state: Value,
    /// Seat table without credentials.
    #[serde(default)]
    pub filtered_metadata: Vec<PublicPlayerInfo>,
    /// State the match started from.
    pub initial_state: Value,
    /// Action log.
    #[serde(default)]
    pub log: Vec<Value>,
}

/// Messages the authority engine emits for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// New state after a move.
    Update {
        /// Match the state belongs to.
        match_id: MatchId,
        /// Game state.
        state: Value,
        /// Log entries produced by the move.
        #[serde(default)]
        deltalog: Vec<Value>,
    },

    /// Full state for a (re)connecting client.
    Sync {
        /// Match the state belongs to.
        match_id: MatchId,
        /// Sync payload.
        sync_info: SyncInfo,
    },

    /// Seat table changed (join, leave, rename).
    MatchData {
        /// Match the seats belong to.
        match_id: MatchId,
        /// Seat table without credentials.
        players: Vec<PublicPlayerInfo>,
    },

    /// Chat relay.
    Chat {
        /// Match the chat belongs to.
        match_id: MatchId,
        /// Opaque chat payload.
        chat_message: Value,
    },
}

impl ServerMessage {
    /// Match this message belongs to.
    pub fn match_id(&self) -> &str {
        match self {
            Self::Update { match_id, .. }
            | Self::Sync { match_id, .. }
            | Self::MatchData { match_id, .. }
            | Self::Chat { match_id, .. } => match_id,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_action_wire_shape() {
        let action = ClientAction::chat(vec![json!("hello")]);
        let text = action.to_json().unwrap();
        assert_eq!(text, r#"{"type":"chat","args":["hello"]}"#);
    }

    #[test]
    fn test_client_action_unknown_kind_parses() {
        let action = ClientAction::from_json(r#"{"type":"bogus"}"#).unwrap();
        assert_eq!(action.kind, "bogus");
        assert!(action.args.is_empty());
        assert_eq!(action.action_kind(), None);
    }

    #[test]
    fn test_action_kinds() {
        for kind in [ActionKind::Update, ActionKind::Sync, ActionKind::Chat] {
            assert_eq!(ActionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::parse("UPDATE"), None);
    }

    #[test]
    fn test_server_message_tagged() {
        let msg = ServerMessage::Update {
            match_id: "m1".into(),
            state: json!({ "g": {} }),
            deltalog: vec![],
        };
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "update");
        assert_eq!(value["match_id"], "m1");
        assert_eq!(msg.match_id(), "m1");
    }

    #[test]
    fn test_server_message_from_json() {
        let msg = ServerMessage::from_json(
            r#"{"type":"chat","match_id":"m1","chat_message":{"payload":"hi"}}"#,
        )
        .unwrap();
        assert!(matches!(msg, ServerMessage::Chat { ref chat_message, .. } if chat_message["payload"] == "hi"));
    }
}

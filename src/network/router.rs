//! Action Router
//!
//! Maps inbound client actions onto authority engine entry points.
//! Actions come from untrusted peers: unknown kinds are dropped, never errors.

use std::sync::Arc;
use tracing::debug;

use crate::game::engine::AuthorityEngine;
use crate::network::protocol::{ActionKind, ClientAction};
use crate::network::relay::StateDistributor;

/// Dispatches actions to one engine.
pub struct ActionRouter {
    engine: Arc<dyn AuthorityEngine>,
}

impl ActionRouter {
    /// Router feeding `engine`.
    pub fn new(engine: Arc<dyn AuthorityEngine>) -> Self {
        Self { engine }
    }

    /// Forward `action` with its arguments unpacked. Returns the kind that
    /// was routed, or `None` if the action was ignored.
    pub async fn dispatch(&self, action: ClientAction, out: &dyn StateDistributor) -> Option<ActionKind> {
        let Some(kind) = action.action_kind() else {
            debug!("Ignoring action of unknown kind {:?}", action.kind);
            return None;
        };

        match kind {
            ActionKind::Update => self.engine.on_update(action.args, out).await,
            ActionKind::Sync => self.engine.on_sync(action.args, out).await,
            ActionKind::Chat => self.engine.on_chat_message(action.args, out).await,
        }

        Some(kind)
    }
}

//! State Relay
//!
//! Fans engine output out to attached clients. Each recipient gets its own
//! filtered copy: the view filter runs once per handle, keyed by that
//! handle's claimed seat, and results are never shared between recipients.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;

use crate::game::view::ViewFilter;
use crate::network::client::ClientHandle;
use crate::network::protocol::ServerMessage;
use crate::network::registry::ConnectionRegistry;

/// Outbound channels offered to the authority engine.
#[async_trait]
pub trait StateDistributor: Send + Sync {
    /// Deliver to every handle claiming `player_id`. Returns deliveries made.
    async fn send_to_player(&self, player_id: &str, message: ServerMessage) -> usize;

    /// Deliver to every attached handle. Returns deliveries made.
    async fn send_to_all(&self, message: ServerMessage) -> usize;
}

/// Registry-backed distributor.
pub struct Relay {
    registry: Arc<ConnectionRegistry>,
    filter: Arc<dyn ViewFilter>,
}

impl Relay {
    /// Relay over `registry`, redacting with `filter`.
    pub fn new(registry: Arc<ConnectionRegistry>, filter: Arc<dyn ViewFilter>) -> Self {
        Self { registry, filter }
    }

    /// Filter and push one message. Failures are logged and skipped so the
    /// remaining recipients still get theirs.
    fn deliver(&self, handle: &ClientHandle, message: &ServerMessage) -> bool {
        let filtered = self.filter.filter(handle.player_id(), message);
        match handle.send(filtered) {
            Ok(()) => true,
            Err(e) => {
                debug!("Delivery to {} failed: {}", handle.id(), e);
                false
            }
        }
    }
}

#[async_trait]
impl StateDistributor for Relay {
    async fn send_to_player(&self, player_id: &str, message: ServerMessage) -> usize {
        let recipients = self.registry.for_player(player_id).await;
        recipients
            .iter()
            .filter(|handle| self.deliver(handle, &message))
            .count()
    }

    async fn send_to_all(&self, message: ServerMessage) -> usize {
        let recipients = self.registry.snapshot().await;
        recipients
            .iter()
            .filter(|handle| self.deliver(handle, &message))
            .count()
    }
}

//! Client Handles
//!
//! A [`ClientHandle`] is the host's view of one attached peer: the identity
//! it claims and a way to push messages to it. The transport creates handles
//! and drains the paired receiver; the host never owns the connection itself.

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::network::protocol::ServerMessage;

/// Identity of one handle. Two handles never share an id, even when they
/// claim the same seat with the same credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity claims a client presents when it attaches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    /// Claimed seat as a numeric string; `None` for spectators.
    pub player_id: Option<String>,
    /// Credentials offered for the seat.
    pub credentials: Option<String>,
}

impl ClientMetadata {
    /// Claim for a seat.
    pub fn player(player_id: impl Into<String>) -> Self {
        Self {
            player_id: Some(player_id.into()),
            credentials: None,
        }
    }

    /// Spectator with no seat claim.
    pub fn spectator() -> Self {
        Self::default()
    }

    /// Attach credentials to the claim.
    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Offered credentials, ignoring empty strings.
    pub fn supplied_credentials(&self) -> Option<&str> {
        self.credentials.as_deref().filter(|c| !c.is_empty())
    }
}

/// Delivery failures for a single handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The transport dropped its receiver.
    #[error("connection closed")]
    Closed,

    /// The outbound queue is full.
    #[error("outbound queue full")]
    Full,
}

/// One attached peer.
#[derive(Debug)]
pub struct ClientHandle {
    id: ConnectionId,
    metadata: ClientMetadata,
    outbound: mpsc::Sender<ServerMessage>,
}

impl ClientHandle {
    /// Wrap an existing outbound channel.
    pub fn new(metadata: ClientMetadata, outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id: ConnectionId::new(),
            metadata,
            outbound,
        }
    }

    /// Create a handle with a fresh bounded channel. The receiver goes to the
    /// transport's writer task.
    pub fn channel(
        metadata: ClientMetadata,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Arc::new(Self::new(metadata, tx)), rx)
    }

    /// Handle identity.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Identity claims.
    pub fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    /// Claimed seat.
    pub fn player_id(&self) -> Option<&str> {
        self.metadata.player_id.as_deref()
    }

    /// Queue a message without waiting.
    pub fn send(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        self.outbound.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// True once the transport has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

//! Network Layer
//!
//! Authorization and fan-out for attached clients. Transport-agnostic:
//! the transport supplies handles and raw actions, the host does the rest.

pub mod auth;
pub mod client;
pub mod host;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthDecision, AuthorizationGate};
pub use client::{ClientHandle, ClientMetadata, ConnectionId, DeliveryError};
pub use host::{HostConfig, HostError, MatchHost};
pub use protocol::{ActionKind, ClientAction, ServerMessage, SyncInfo};
pub use registry::ConnectionRegistry;
pub use relay::{Relay, StateDistributor};
pub use router::ActionRouter;

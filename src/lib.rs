//! # Match Host
//!
//! Authoritative coordination node for a peer-to-peer turn-based match.
//! One peer runs the host; it decides which attaching clients may claim which
//! seat and relays engine output to every client with its own filtered view.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        MATCH HOST                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/              - Pluggable game collaborators           │
//! │  ├── definition.rs  - Game definition, match creation        │
//! │  ├── metadata.rs    - Persisted seat table                   │
//! │  ├── engine.rs      - Authority engine interface             │
//! │  └── view.rs        - Per-recipient view filtering           │
//! │                                                              │
//! │  store/             - Match persistence                      │
//! │  ├── mod.rs         - MatchStore interface                   │
//! │  ├── memory.rs      - In-memory store                        │
//! │  └── writer.rs      - Serialized metadata updates            │
//! │                                                              │
//! │  network/           - Authority and fan-out                  │
//! │  ├── client.rs      - Client handles                         │
//! │  ├── registry.rs    - Attached handles                       │
//! │  ├── auth.rs        - Seat authorization, credential binding │
//! │  ├── relay.rs       - Filtered fan-out                       │
//! │  ├── router.rs      - Client action dispatch                 │
//! │  ├── protocol.rs    - Message types                          │
//! │  └── host.rs        - Construction and entry points          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - A seat's credentials are bound by the first client that presents
//!   them and never change afterwards.
//! - A client that fails authorization is never attached and never
//!   receives a message.
//! - Every outbound message is filtered for its recipient's seat.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use game::{AuthorityEngine, ConnectionChange, GameDefinition, ViewFilter};
pub use network::{ClientAction, ClientHandle, ClientMetadata, HostConfig, HostError, MatchHost, ServerMessage};
pub use store::{InMemoryStore, MatchStore, MetadataWriter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

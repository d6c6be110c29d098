//! Game Collaborators
//!
//! Everything the host consumes but does not own: how a match is set up,
//! the authority engine that runs it, and how state is projected per seat.
//!
//! ## Module Structure
//!
//! - `definition`: Game definitions and match creation
//! - `metadata`: Persisted match and seat metadata
//! - `engine`: Authority engine interface
//! - `view`: Player-view filtering and log redaction

pub mod definition;
pub mod metadata;
pub mod engine;
pub mod view;

// Re-export key types
pub use definition::{create_match, GameDefinition, SetupContext, SetupError};
pub use metadata::{MatchId, MatchMetadata, PlayerMetadata, PublicPlayerInfo, SeatIndex, StoredMatch};
pub use engine::{AuthorityEngine, ConnectionChange};
pub use view::{IdentityFilter, PlayerViewFilter, ViewFilter};

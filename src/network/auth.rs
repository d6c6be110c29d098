//! Seat Authorization
//!
//! Decides whether an attaching client may claim the seat it names.
//! The first client to present credentials for an unbound seat binds them
//! permanently; later claims must present the same string. Clients without
//! a usable seat claim are spectators and always pass.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::game::metadata::{MatchMetadata, SeatIndex};
use crate::network::client::ClientMetadata;
use crate::store::MetadataWriter;

/// Outcome of checking a claim against stored metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// No usable seat claim (missing, non-numeric, or no such seat).
    Spectator,
    /// Unbound seat claimed without credentials.
    Anonymous {
        /// Claimed seat.
        seat: SeatIndex,
    },
    /// Unbound seat claimed with credentials; they must be persisted.
    Bind {
        /// Claimed seat.
        seat: SeatIndex,
        /// Credentials to bind.
        credentials: String,
    },
    /// Bound seat, matching credentials.
    Verified {
        /// Claimed seat.
        seat: SeatIndex,
    },
    /// Bound seat, missing or different credentials.
    Rejected {
        /// Claimed seat.
        seat: SeatIndex,
    },
}

impl AuthDecision {
    /// Whether the client may attach.
    pub fn is_authorized(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Parse a seat claim. Anything that is not a plain non-negative integer
/// yields `None`.
pub fn parse_seat(player_id: Option<&str>) -> Option<SeatIndex> {
    player_id?.trim().parse().ok()
}

/// Check a claim against `metadata` without side effects.
pub fn decide(metadata: &MatchMetadata, claim: &ClientMetadata) -> AuthDecision {
    let Some(seat) = parse_seat(claim.player_id.as_deref()) else {
        return AuthDecision::Spectator;
    };
    let Some(player) = metadata.player(seat) else {
        return AuthDecision::Spectator;
    };

    match (player.bound_credentials(), claim.supplied_credentials()) {
        (None, Some(credentials)) => AuthDecision::Bind {
            seat,
            credentials: credentials.to_string(),
        },
        (None, None) => AuthDecision::Anonymous { seat },
        (Some(existing), Some(supplied)) if existing == supplied => AuthDecision::Verified { seat },
        (Some(_), _) => AuthDecision::Rejected { seat },
    }
}

/// Per-match authorization gate.
///
/// The fetch-check-write sequence runs through the match's
/// [`MetadataWriter`], so it is serialized against every other metadata
/// write for the match, including bindings of other seats.
pub struct AuthorizationGate {
    metadata: Arc<MetadataWriter>,
}

impl AuthorizationGate {
    /// Gate writing through `metadata`.
    pub fn new(metadata: Arc<MetadataWriter>) -> Self {
        Self { metadata }
    }

    /// Decide whether `claim` may attach, binding credentials on first use.
    ///
    /// Store failures reject seat claims; spectators never touch the store.
    pub async fn authenticate(&self, claim: &ClientMetadata) -> bool {
        if parse_seat(claim.player_id.as_deref()).is_none() {
            return true;
        }

        let result = self
            .metadata
            .update(|metadata| {
                let decision = decide(metadata, claim);
                if let AuthDecision::Bind { seat, credentials } = &decision {
                    *metadata = metadata.with_credentials(*seat, credentials);
                }
                decision
            })
            .await;

        let match_id = self.metadata.match_id();
        match result {
            Ok(AuthDecision::Bind { seat, .. }) => {
                info!("Bound credentials for seat {} in {}", seat, match_id);
                true
            }
            Ok(AuthDecision::Rejected { seat }) => {
                debug!("Rejected claim for seat {} in {}", seat, match_id);
                false
            }
            Ok(decision) => decision.is_authorized(),
            Err(e) => {
                warn!("Authorizing claim in {} failed: {}", match_id, e);
                false
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

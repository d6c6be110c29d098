//! Game Definitions
//!
//! A [`GameDefinition`] describes how to set up a match and how to project
//! its state for one recipient. Rules themselves live in the authority engine.

use std::fmt;
use std::sync::Arc;
use serde_json::{json, Value};
use thiserror::Error;

use crate::game::metadata::{MatchMetadata, SeatIndex, StoredMatch};

/// Builds the initial game state.
pub type SetupFn = Arc<dyn Fn(&SetupContext<'_>) -> Value + Send + Sync>;

/// Checks setup data; returns an error message when it is unusable.
pub type ValidateSetupFn = Arc<dyn Fn(Option<&Value>, usize) -> Option<String> + Send + Sync>;

/// Projects full game state for a recipient (`None` = spectator).
pub type PlayerViewFn = Arc<dyn Fn(&Value, Option<&str>) -> Value + Send + Sync>;

/// Inputs available to a game's setup function.
#[derive(Debug, Clone)]
pub struct SetupContext<'a> {
    /// Number of seats in the match.
    pub num_players: usize,
    /// Seat ids in turn order.
    pub play_order: Vec<String>,
    /// Setup data supplied at creation.
    pub setup_data: Option<&'a Value>,
}

/// Match setup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Seat count outside the game's supported range.
    #[error("invalid number of players: {requested} (expected {min}..={max})")]
    InvalidNumPlayers {
        /// Requested seat count.
        requested: usize,
        /// Minimum supported.
        min: usize,
        /// Maximum supported.
        max: usize,
    },

    /// Setup data rejected by the game.
    #[error("bad setup data passed to game: {0}")]
    InvalidSetupData(String),
}

/// A pluggable game.
#[derive(Clone)]
pub struct GameDefinition {
    /// Declared game name. Empty or `"default"` risks collisions between matches.
    pub name: String,
    /// Fewest seats a match may have.
    pub min_players: usize,
    /// Most seats a match may have.
    pub max_players: usize,
    setup: Option<SetupFn>,
    validate_setup_data: Option<ValidateSetupFn>,
    player_view: Option<PlayerViewFn>,
}

impl GameDefinition {
    /// Game with no setup hooks and no hidden information.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_players: 1,
            max_players: usize::MAX,
            setup: None,
            validate_setup_data: None,
            player_view: None,
        }
    }

    /// Restrict the supported seat range.
    pub fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    /// Set the initial-state builder.
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&SetupContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }

    /// Set the setup-data validator.
    pub fn with_setup_validation<F>(mut self, validate: F) -> Self
    where
        F: Fn(Option<&Value>, usize) -> Option<String> + Send + Sync + 'static,
    {
        self.validate_setup_data = Some(Arc::new(validate));
        self
    }

    /// Set the per-recipient state projection.
    pub fn with_player_view<F>(mut self, view: F) -> Self
    where
        F: Fn(&Value, Option<&str>) -> Value + Send + Sync + 'static,
    {
        self.player_view = Some(Arc::new(view));
        self
    }

    /// True when the name is empty or the literal `"default"`.
    pub fn has_generic_name(&self) -> bool {
        self.name.is_empty() || self.name == "default"
    }

    /// The player-view projection, if this game hides anything.
    pub fn player_view_fn(&self) -> Option<PlayerViewFn> {
        self.player_view.clone()
    }

}

impl fmt::Debug for GameDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameDefinition")
            .field("name", &self.name)
            .field("min_players", &self.min_players)
            .field("max_players", &self.max_players)
            .field("has_setup", &self.setup.is_some())
            .field("has_player_view", &self.player_view.is_some())
            .finish()
    }
}

/// Build the initial state and metadata for a new match.
///
/// The returned state wraps the game's own data as
/// `{ "g": ..., "ctx": {...}, "state_id": 0 }`.
pub fn create_match(
    game: &GameDefinition,
    num_players: usize,
    setup_data: Option<Value>,
) -> Result<StoredMatch, SetupError> {
    let min = game.min_players.max(1);
    let invalid = || SetupError::InvalidNumPlayers {
        requested: num_players,
        min,
        max: game.max_players,
    };
    if num_players < min || num_players > game.max_players {
        return Err(invalid());
    }
    let seats = SeatIndex::try_from(num_players).map_err(|_| invalid())?;

    if let Some(validate) = &game.validate_setup_data {
        if let Some(message) = validate(setup_data.as_ref(), num_players) {
            return Err(SetupError::InvalidSetupData(message));
        }
    }

    let play_order: Vec<String> = (0..num_players).map(|i| i.to_string()).collect();
    let ctx = SetupContext {
        num_players,
        play_order: play_order.clone(),
        setup_data: setup_data.as_ref(),
    };
    let g = match &game.setup {
        Some(setup) => setup(&ctx),
        None => json!({}),
    };

    let state = json!({
        "g": g,
        "ctx": {
            "num_players": num_players,
            "play_order": play_order,
            "current_player": "0",
            "turn": 1,
        },
        "state_id": 0,
    });

    Ok(StoredMatch {
        state,
        metadata: MatchMetadata::new(game.name.clone(), seats, setup_data),
    })
}

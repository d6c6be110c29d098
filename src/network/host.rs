//! Match Host
//!
//! The authoritative node for one match. A transport hands the host client
//! handles as peers attach and detach, plus the actions they send; the host
//! authorizes, forwards to the authority engine, and relays the engine's
//! output back out with per-recipient filtering.

use std::sync::Arc;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::game::definition::{create_match, GameDefinition, SetupError};
use crate::game::engine::{AuthorityEngine, ConnectionChange};
use crate::game::metadata::MatchId;
use crate::game::view::{PlayerViewFilter, ViewFilter};
use crate::network::auth::AuthorizationGate;
use crate::network::client::{ClientHandle, ClientMetadata};
use crate::network::protocol::{ClientAction, ServerMessage};
use crate::network::registry::ConnectionRegistry;
use crate::network::relay::{Relay, StateDistributor};
use crate::network::router::ActionRouter;
use crate::store::{MatchStore, MetadataWriter, StoreError};

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Match identifier.
    pub match_id: MatchId,
    /// Number of seats.
    pub num_players: usize,
    /// Setup data passed to the game.
    pub setup_data: Option<Value>,
    /// Outbound queue size for handles created by [`MatchHost::new_client`].
    pub outbound_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            match_id: "default".to_string(),
            num_players: 2,
            setup_data: None,
            outbound_capacity: 64,
        }
    }
}

impl HostConfig {
    /// Create config from environment variables. Unset or unparseable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            match_id: std::env::var("MATCH_ID").unwrap_or(defaults.match_id),
            num_players: std::env::var("NUM_PLAYERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.num_players),
            setup_data: None,
            outbound_capacity: std::env::var("OUTBOUND_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.outbound_capacity),
        }
    }
}

/// Host construction errors.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The game rejected the match setup.
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// The store could not create the match.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Authoritative host for one match.
pub struct MatchHost {
    config: HostConfig,
    registry: Arc<ConnectionRegistry>,
    metadata: Arc<MetadataWriter>,
    gate: AuthorizationGate,
    relay: Relay,
    router: ActionRouter,
    engine: Arc<dyn AuthorityEngine>,
}

impl MatchHost {
    /// Create the match in `store` and wire up the host.
    ///
    /// Fails if the game rejects the setup or the store already holds the
    /// match. A generic game name only produces a warning.
    #[instrument(skip_all, fields(match_id = %config.match_id))]
    pub async fn new(
        config: HostConfig,
        game: &GameDefinition,
        store: Arc<dyn MatchStore>,
        engine: Arc<dyn AuthorityEngine>,
        filter: Arc<dyn ViewFilter>,
    ) -> Result<Self, HostError> {
        if game.has_generic_name() {
            warn!(
                "Game name {:?} is empty or \"default\"; give the game a unique name \
                 to avoid colliding with other matches",
                game.name
            );
        }

        let initial = create_match(game, config.num_players, config.setup_data.clone())?;
        store.create_match(&config.match_id, initial).await?;

        let registry = Arc::new(ConnectionRegistry::new());
        let metadata = Arc::new(MetadataWriter::new(config.match_id.clone(), store));
        let host = Self {
            gate: AuthorizationGate::new(metadata.clone()),
            metadata,
            relay: Relay::new(registry.clone(), filter),
            router: ActionRouter::new(engine.clone()),
            registry,
            engine,
            config,
        };

        info!("Hosting {} with {} seats", host.config.match_id, host.config.num_players);
        Ok(host)
    }

    /// Like [`MatchHost::new`], filtering with the game's own player view.
    pub async fn with_player_view(
        config: HostConfig,
        game: &GameDefinition,
        store: Arc<dyn MatchStore>,
        engine: Arc<dyn AuthorityEngine>,
    ) -> Result<Self, HostError> {
        let filter = Arc::new(PlayerViewFilter::from_game(game));
        Self::new(config, game, store, engine, filter).await
    }

    /// Match this host serves.
    pub fn match_id(&self) -> &str {
        &self.config.match_id
    }

    /// Host configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Attached handles.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Serialized metadata access for this match. Engines that change seat
    /// metadata must go through it so they cannot race credential binding.
    pub fn metadata_writer(&self) -> &Arc<MetadataWriter> {
        &self.metadata
    }

    /// Outbound channels, for engines that push without a client action.
    pub fn distributor(&self) -> &dyn StateDistributor {
        &self.relay
    }

    /// Create an unregistered handle with the configured queue size, for
    /// in-process transports.
    pub fn new_client(&self, metadata: ClientMetadata) -> (Arc<ClientHandle>, mpsc::Receiver<ServerMessage>) {
        ClientHandle::channel(metadata, self.config.outbound_capacity)
    }

    /// Number of attached handles.
    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }

    /// Whether `handle` is attached.
    pub async fn is_registered(&self, handle: &ClientHandle) -> bool {
        self.registry.contains(&handle.id()).await
    }

    /// Attach a client. Unauthorized clients are dropped without notice.
    /// Returns whether the handle is now attached.
    pub async fn register_client(&self, handle: Arc<ClientHandle>) -> bool {
        if !self.gate.authenticate(handle.metadata()).await {
            debug!("Declined {} claiming seat {:?}", handle.id(), handle.player_id());
            return false;
        }

        if !self.registry.insert(handle.clone()).await {
            debug!("{} already registered", handle.id());
            return true;
        }

        info!("Client {} attached as {:?}", handle.id(), handle.player_id());
        let change = self.connection_change(&handle, true);
        self.engine.on_connection_change(change, &self.relay).await;
        true
    }

    /// Detach a client. Handles that were never attached are ignored.
    pub async fn unregister_client(&self, handle: &ClientHandle) {
        if self.registry.remove(&handle.id()).await.is_none() {
            return;
        }

        info!("Client {} detached", handle.id());
        let change = self.connection_change(handle, false);
        self.engine.on_connection_change(change, &self.relay).await;
    }

    /// Forward a client action to the engine.
    pub async fn process_action(&self, action: ClientAction) {
        self.router.dispatch(action, &self.relay).await;
    }

    /// Parse and forward a JSON client action. Malformed input is dropped.
    pub async fn process_raw(&self, raw: &str) {
        match ClientAction::from_json(raw) {
            Ok(action) => self.process_action(action).await,
            Err(e) => debug!("Ignoring malformed action: {}", e),
        }
    }

    fn connection_change(&self, handle: &ClientHandle, connected: bool) -> ConnectionChange {
        ConnectionChange {
            match_id: self.config.match_id.clone(),
            player_id: handle.metadata().player_id.clone(),
            credentials: handle.metadata().credentials.clone(),
            connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::game::view::IdentityFilter;
    use crate::network::testing::{EngineCall, RecordingEngine};
    use crate::store::InMemoryStore;

    struct Fixture {
        host: MatchHost,
        engine: Arc<RecordingEngine>,
        store: Arc<InMemoryStore>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let engine = Arc::new(RecordingEngine::default());
        let config = HostConfig {
            match_id: "m1".into(),
            ..Default::default()
        };
        let host = MatchHost::new(
            config,
            &GameDefinition::new("cards").with_players(2, 4),
            store.clone(),
            engine.clone(),
            Arc::new(IdentityFilter),
        )
        .await
        .unwrap();
        Fixture { host, engine, store }
    }

    #[test]
    fn test_host_config_default() {
        let config = HostConfig::default();
        assert_eq!(config.num_players, 2);
        assert_eq!(config.outbound_capacity, 64);
        assert!(config.setup_data.is_none());
    }

    #[tokio::test]
    async fn test_new_creates_match() {
        let f = fixture().await;
        assert_eq!(f.host.match_id(), "m1");
        let stored = f.store.fetch("m1").await.unwrap();
        assert_eq!(stored.metadata.players.len(), 2);
        assert_eq!(f.host.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_new_fails_on_bad_setup() {
        let store = Arc::new(InMemoryStore::new());
        let game = GameDefinition::new("cards")
            .with_setup_validation(|_, _| Some("no deck".into()));
        let result = MatchHost::new(
            HostConfig::default(),
            &game,
            store.clone(),
            Arc::new(RecordingEngine::default()),
            Arc::new(IdentityFilter),
        )
        .await;

        assert!(matches!(result, Err(HostError::Setup(SetupError::InvalidSetupData(_)))));
        assert!(store.list_matches().await.is_empty());
    }

    #[tokio::test]
    async fn test_generic_name_still_constructs() {
        let result = MatchHost::new(
            HostConfig::default(),
            &GameDefinition::new("default"),
            Arc::new(InMemoryStore::new()),
            Arc::new(RecordingEngine::default()),
            Arc::new(IdentityFilter),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_match_fails() {
        let f = fixture().await;
        let result = MatchHost::new(
            HostConfig { match_id: "m1".into(), ..Default::default() },
            &GameDefinition::new("cards"),
            f.store.clone(),
            Arc::new(RecordingEngine::default()),
            Arc::new(IdentityFilter),
        )
        .await;
        assert!(matches!(result, Err(HostError::Store(StoreError::MatchExists(_)))));
    }

    #[tokio::test]
    async fn test_credential_binding_scenario() {
        let f = fixture().await;

        let (first, _r1) = f.host.new_client(ClientMetadata::player("0").with_credentials("c0"));
        assert!(f.host.register_client(first.clone()).await);
        let stored = f.store.fetch("m1").await.unwrap().metadata;
        assert_eq!(stored.player(0).unwrap().bound_credentials(), Some("c0"));

        let (again, _r2) = f.host.new_client(ClientMetadata::player("0").with_credentials("c0"));
        assert!(f.host.register_client(again.clone()).await);

        let (impostor, mut r3) = f.host.new_client(ClientMetadata::player("0").with_credentials("wrong"));
        assert!(!f.host.register_client(impostor.clone()).await);
        assert!(!f.host.is_registered(&impostor).await);
        assert_eq!(f.host.connection_count().await, 2);

        f.host
            .distributor()
            .send_to_all(ServerMessage::Chat { match_id: "m1".into(), chat_message: json!("hi") })
            .await;
        f.host
            .distributor()
            .send_to_player("0", ServerMessage::Chat { match_id: "m1".into(), chat_message: json!("psst") })
            .await;
        assert!(r3.try_recv().is_err());

        let changes = f.engine.connection_changes().await;
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.connected && c.player_id.as_deref() == Some("0")));
    }

    #[tokio::test]
    async fn test_spectator_registers_and_notifies() {
        let f = fixture().await;
        let (spectator, _rx) = f.host.new_client(ClientMetadata::spectator().with_credentials("anything"));

        assert!(f.host.register_client(spectator.clone()).await);
        assert!(f.host.is_registered(&spectator).await);
        assert_eq!(
            f.engine.calls().await,
            vec![EngineCall::Connection(ConnectionChange {
                match_id: "m1".into(),
                player_id: None,
                credentials: Some("anything".into()),
                connected: true,
            })]
        );
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let f = fixture().await;
        let (client, _rx) = f.host.new_client(ClientMetadata::player("1"));
        let (stranger, _rs) = f.host.new_client(ClientMetadata::player("0"));

        f.host.register_client(client.clone()).await;
        f.host.unregister_client(&client).await;
        f.host.unregister_client(&client).await;
        f.host.unregister_client(&stranger).await;

        assert_eq!(f.host.connection_count().await, 0);
        let changes = f.engine.connection_changes().await;
        assert_eq!(changes.len(), 2);
        assert!(changes[0].connected);
        assert!(!changes[1].connected);
        assert_eq!(changes[1].player_id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_engine_metadata_update_keeps_concurrent_binding() {
        let f = fixture().await;
        let (client, _rx) = f.host.new_client(ClientMetadata::player("0").with_credentials("c0"));
        let writer = f.host.metadata_writer().clone();

        let (registered, updated) = tokio::join!(
            f.host.register_client(client),
            writer.update(|m| {
                for player in m.players.values_mut() {
                    player.is_connected = Some(false);
                }
            }),
        );
        assert!(registered);
        updated.unwrap();

        let stored = f.store.fetch("m1").await.unwrap().metadata;
        assert_eq!(stored.player(0).unwrap().bound_credentials(), Some("c0"));
        assert_eq!(stored.player(1).unwrap().is_connected, Some(false));
    }

    #[tokio::test]
    async fn test_registering_twice_notifies_once() {
        let f = fixture().await;
        let (client, _rx) = f.host.new_client(ClientMetadata::player("1"));

        assert!(f.host.register_client(client.clone()).await);
        assert!(f.host.register_client(client.clone()).await);
        assert_eq!(f.host.connection_count().await, 1);
        assert_eq!(f.engine.connection_changes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_process_action_routing() {
        let f = fixture().await;

        f.host.process_action(ClientAction::chat(vec![json!("hello")])).await;
        f.host.process_action(ClientAction::new("bogus", vec![])).await;
        f.host.process_raw(r#"{"type":"sync","args":["m1","0"]}"#).await;
        f.host.process_raw("not json").await;

        assert_eq!(
            f.engine.calls().await,
            vec![
                EngineCall::Chat(vec![json!("hello")]),
                EngineCall::Sync(vec![json!("m1"), json!("0")]),
            ]
        );
    }
}

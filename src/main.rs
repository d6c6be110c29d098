//! Match Host Demo
//!
//! Hosts a small hidden-hand card match in-process. Two seated players and a
//! spectator attach over channels, an impostor is turned away, and every
//! recipient logs the view it was sent.

use std::sync::{Arc, OnceLock};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use match_host::{
    VERSION,
    game::{AuthorityEngine, ConnectionChange, GameDefinition, SeatIndex},
    network::{ClientAction, ClientMetadata, HostConfig, MatchHost, ServerMessage, StateDistributor},
    store::{InMemoryStore, MatchStore, MetadataWriter},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Match Host v{}", VERSION);

    let config = HostConfig::from_env();
    let store = Arc::new(InMemoryStore::new());
    let engine = Arc::new(CardEngine::new(config.match_id.clone(), store.clone()));
    let host = MatchHost::with_player_view(config, &card_game(), store.clone(), engine.clone()).await?;
    engine.load(host.metadata_writer().clone()).await?;

    let (alice, alice_rx) = host.new_client(ClientMetadata::player("0").with_credentials("alice-key"));
    let (bob, bob_rx) = host.new_client(ClientMetadata::player("1").with_credentials("bob-key"));
    let (watcher, watcher_rx) = host.new_client(ClientMetadata::spectator());
    let (impostor, _impostor_rx) = host.new_client(ClientMetadata::player("0").with_credentials("guess"));

    for (name, handle) in [("alice", &alice), ("bob", &bob), ("watcher", &watcher), ("impostor", &impostor)] {
        let accepted = host.register_client(handle.clone()).await;
        info!("{} attached: {}", name, accepted);
    }

    host.process_action(ClientAction::sync(vec![json!("0")])).await;
    host.process_action(ClientAction::update(vec![json!("0"), json!(0)])).await;
    host.process_action(ClientAction::chat(vec![json!({ "sender": "1", "text": "nice card" })])).await;
    host.process_action(ClientAction::new("teleport", vec![])).await;

    host.unregister_client(&bob).await;
    host.unregister_client(&alice).await;
    host.unregister_client(&watcher).await;

    drain("alice", alice_rx);
    drain("bob", bob_rx);
    drain("watcher", watcher_rx);

    let metadata = store.fetch(host.match_id()).await?.metadata;
    for player in metadata.players.values() {
        info!("Seat {} bound: {}", player.id, player.bound_credentials().is_some());
    }

    Ok(())
}

/// Two-seat game where each seat sees only its own hand.
fn card_game() -> GameDefinition {
    GameDefinition::new("hidden-hands")
        .with_players(2, 2)
        .with_setup(|ctx| {
            let hands: serde_json::Map<String, Value> = ctx
                .play_order
                .iter()
                .enumerate()
                .map(|(i, seat)| (seat.clone(), json!([i * 10 + 1, i * 10 + 2, i * 10 + 3])))
                .collect();
            json!({ "hands": hands, "table": [] })
        })
        .with_player_view(|g, recipient| {
            let mut view = g.clone();
            if let Some(hands) = view.get_mut("hands").and_then(Value::as_object_mut) {
                for (seat, hand) in hands.iter_mut() {
                    if Some(seat.as_str()) != recipient {
                        let count = hand.as_array().map(Vec::len).unwrap_or(0);
                        *hand = json!({ "hidden": count });
                    }
                }
            }
            view
        })
}

/// Minimal authority engine: plays a card from a hand onto the table.
struct CardEngine {
    match_id: String,
    store: Arc<InMemoryStore>,
    metadata: OnceLock<Arc<MetadataWriter>>,
    state: Mutex<Value>,
    initial: Mutex<Value>,
}

impl CardEngine {
    fn new(match_id: String, store: Arc<InMemoryStore>) -> Self {
        Self {
            match_id,
            store,
            metadata: OnceLock::new(),
            state: Mutex::new(Value::Null),
            initial: Mutex::new(Value::Null),
        }
    }

    /// Seat metadata is written through the host's writer so connection
    /// updates cannot overwrite a credential binding.
    async fn load(&self, metadata: Arc<MetadataWriter>) -> anyhow::Result<()> {
        let stored = metadata.fetch().await?;
        let _ = self.metadata.set(metadata);
        *self.initial.lock().await = stored.state.clone();
        *self.state.lock().await = stored.state;
        Ok(())
    }
}

#[async_trait]
impl AuthorityEngine for CardEngine {
    async fn on_update(&self, args: Vec<Value>, out: &dyn StateDistributor) {
        let (Some(seat), Some(index)) = (args.first().and_then(Value::as_str), args.get(1).and_then(Value::as_u64)) else {
            return;
        };

        let snapshot = {
            let mut state = self.state.lock().await;
            let card = match state["g"]["hands"][seat].as_array_mut() {
                Some(hand) if (index as usize) < hand.len() => hand.remove(index as usize),
                _ => return,
            };
            if let Some(table) = state["g"]["table"].as_array_mut() {
                table.push(card);
            }
            let next_id = state["state_id"].as_u64().unwrap_or(0) + 1;
            state["state_id"] = json!(next_id);
            state.clone()
        };

        if let Err(e) = self.store.set_state(&self.match_id, snapshot.clone()).await {
            tracing::warn!("Persisting state failed: {}", e);
        }

        let deltalog = vec![json!({
            "action": { "payload": { "player_id": seat, "args": [index] } },
            "redact": true,
        })];
        out.send_to_all(ServerMessage::Update {
            match_id: self.match_id.clone(),
            state: snapshot,
            deltalog,
        })
        .await;
    }

    async fn on_sync(&self, args: Vec<Value>, out: &dyn StateDistributor) {
        let Some(seat) = args.first().and_then(Value::as_str) else {
            return;
        };
        let players = match self.store.fetch(&self.match_id).await {
            Ok(stored) => stored.metadata.public_players(),
            Err(_) => Vec::new(),
        };
        let message = ServerMessage::Sync {
            match_id: self.match_id.clone(),
            sync_info: match_host::network::SyncInfo {
                state: self.state.lock().await.clone(),
                filtered_metadata: players,
                initial_state: self.initial.lock().await.clone(),
                log: Vec::new(),
            },
        };
        out.send_to_player(seat, message).await;
    }

    async fn on_chat_message(&self, args: Vec<Value>, out: &dyn StateDistributor) {
        let Some(chat_message) = args.into_iter().next() else {
            return;
        };
        out.send_to_all(ServerMessage::Chat {
            match_id: self.match_id.clone(),
            chat_message,
        })
        .await;
    }

    async fn on_connection_change(&self, change: ConnectionChange, out: &dyn StateDistributor) {
        let Some(writer) = self.metadata.get() else {
            return;
        };
        let Some(seat) = change.player_id.as_deref().and_then(|p| p.parse::<SeatIndex>().ok()) else {
            return;
        };
        let update = writer
            .update(|metadata| {
                if let Some(player) = metadata.players.get_mut(&seat) {
                    player.is_connected = Some(change.connected);
                }
                metadata.public_players()
            })
            .await;
        match update {
            Ok(players) => {
                out.send_to_all(ServerMessage::MatchData {
                    match_id: change.match_id,
                    players,
                })
                .await;
            }
            Err(e) => tracing::warn!("Persisting connection state failed: {}", e),
        }
    }
}

/// Log everything a client was sent.
fn drain(name: &str, mut rx: mpsc::Receiver<ServerMessage>) {
    while let Ok(message) = rx.try_recv() {
        match &message {
            ServerMessage::Update { state, .. } => info!("{} <- update hands={}", name, state["g"]["hands"]),
            ServerMessage::Sync { sync_info, .. } => info!("{} <- sync hands={}", name, sync_info.state["g"]["hands"]),
            ServerMessage::MatchData { players, .. } => info!("{} <- match data ({} seats)", name, players.len()),
            ServerMessage::Chat { chat_message, .. } => info!("{} <- chat {}", name, chat_message),
        }
    }
}

//! Test doubles shared by the network tests.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::game::engine::{AuthorityEngine, ConnectionChange};
use crate::network::protocol::ServerMessage;
use crate::network::relay::StateDistributor;

/// One call observed by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Update(Vec<Value>),
    Sync(Vec<Value>),
    Chat(Vec<Value>),
    Connection(ConnectionChange),
}

/// Engine that records every call and emits nothing.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub async fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().await.clone()
    }

    pub async fn connection_changes(&self) -> Vec<ConnectionChange> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                EngineCall::Connection(change) => Some(change.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl AuthorityEngine for RecordingEngine {
    async fn on_update(&self, args: Vec<Value>, _out: &dyn StateDistributor) {
        self.calls.lock().await.push(EngineCall::Update(args));
    }

    async fn on_sync(&self, args: Vec<Value>, _out: &dyn StateDistributor) {
        self.calls.lock().await.push(EngineCall::Sync(args));
    }

    async fn on_chat_message(&self, args: Vec<Value>, _out: &dyn StateDistributor) {
        self.calls.lock().await.push(EngineCall::Chat(args));
    }

    async fn on_connection_change(&self, change: ConnectionChange, _out: &dyn StateDistributor) {
        self.calls.lock().await.push(EngineCall::Connection(change));
    }
}

/// Distributor that drops everything.
pub struct NullDistributor;

#[async_trait]
impl StateDistributor for NullDistributor {
    async fn send_to_player(&self, _player_id: &str, _message: ServerMessage) -> usize {
        0
    }

    async fn send_to_all(&self, _message: ServerMessage) -> usize {
        0
    }
}

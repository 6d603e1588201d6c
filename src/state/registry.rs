//! Live map of registered user ids to their socket's outbound channel.

use std::collections::HashMap;

use axum::extract::ws::Message;
use log::debug;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{ConnId, UserId, WebSocketSender};

#[derive(Debug, Clone)]
struct RegisteredConnection {
    conn_id: ConnId,
    sender: WebSocketSender,
}

/// At most one connection per user id; the latest registration wins.
/// A superseded socket is left open, it just stops receiving.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, RegisteredConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or overwrite the mapping for `user_id`.
    pub async fn register(&self, user_id: &str, conn_id: ConnId, sender: WebSocketSender) {
        let previous = self
            .connections
            .write()
            .await
            .insert(user_id.to_string(), RegisteredConnection { conn_id, sender });
        if let Some(prev) = previous {
            debug!("Registration for {} supersedes connection {}", user_id, prev.conn_id);
        }
    }

    /// Remove the mapping only if it still points at `conn_id`.
    /// Returns true when an entry was removed.
    pub async fn unregister(&self, user_id: &str, conn_id: &ConnId) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(user_id) {
            Some(conn) if conn.conn_id == *conn_id => {
                connections.remove(user_id);
                true
            }
            _ => false,
        }
    }

    /// Best-effort delivery. Returns whether the message was handed to a live channel;
    /// an absent user or a closed socket is not an error.
    pub async fn send(&self, user_id: &str, message: &Value) -> bool {
        let connections = self.connections.read().await;
        let Some(conn) = connections.get(user_id) else {
            return false;
        };
        let Ok(json) = serde_json::to_string(message) else {
            return false;
        };
        conn.sender.send(Message::Text(json)).is_ok()
    }

    pub async fn is_connected(&self, user_id: &str) -> bool {
        self.connections.read().await.contains_key(user_id)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

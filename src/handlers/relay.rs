//! Per-connection relay state machine.
//!
//! A connection starts unregistered and accepts only `{"command":"register","uid":..}`.
//! Once registered it may forward whitelisted commands to another user id.
//! Anything else is dropped without a reply and the socket stays open.

use axum::extract::ws::Message;
use log::{debug, info, warn};

use crate::protocol::{self, REGISTER_COMMAND};
use crate::state::ConnectionRegistry;
use crate::{ConnId, UserId, WebSocketSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unregistered,
    Registered(UserId),
}

/// Why an inbound frame was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    NotRegistered,
    UnknownCommand,
    MissingTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Registered(UserId),
    /// Forwarded to `target`; `delivered` is false when the target is offline.
    Relayed { target: UserId, delivered: bool },
    Dropped(DropReason),
}

pub struct RelaySession {
    conn_id: ConnId,
    sender: WebSocketSender,
    state: SessionState,
}

impl RelaySession {
    pub fn new(conn_id: ConnId, sender: WebSocketSender) -> Self {
        Self {
            conn_id,
            sender,
            state: SessionState::Unregistered,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Registered(user_id) => Some(user_id),
            SessionState::Unregistered => None,
        }
    }

    pub async fn handle_text(&mut self, raw: &str, registry: &ConnectionRegistry) -> Inbound {
        let Some(msg) = protocol::parse_object(raw) else {
            return Inbound::Dropped(DropReason::Malformed);
        };

        let Some(from) = self.user_id().map(str::to_string) else {
            return self.try_register(&msg, registry).await;
        };

        let command = protocol::str_field(&msg, "command").unwrap_or_default();
        if !protocol::is_relay_command(command) {
            return Inbound::Dropped(DropReason::UnknownCommand);
        }
        let Some(target) = protocol::str_field(&msg, "target").map(str::to_string) else {
            return Inbound::Dropped(DropReason::MissingTarget);
        };

        let delivered = registry.send(&target, &protocol::forwarded(msg, &from)).await;
        Inbound::Relayed { target, delivered }
    }

    async fn try_register(
        &mut self,
        msg: &serde_json::Map<String, serde_json::Value>,
        registry: &ConnectionRegistry,
    ) -> Inbound {
        if protocol::str_field(msg, "command") != Some(REGISTER_COMMAND) {
            return Inbound::Dropped(DropReason::NotRegistered);
        }
        let Some(user_id) = protocol::str_field(msg, "uid").map(str::to_string) else {
            return Inbound::Dropped(DropReason::NotRegistered);
        };

        registry
            .register(&user_id, self.conn_id.clone(), self.sender.clone())
            .await;
        self.state = SessionState::Registered(user_id.clone());
        info!("Relay connected: {}", user_id);

        if let Ok(json) = serde_json::to_string(&protocol::registered_ack()) {
            if self.sender.send(Message::Text(json)).is_err() {
                warn!("Could not acknowledge registration for {}", user_id);
            }
        }
        Inbound::Registered(user_id)
    }

    /// Socket closed or failed. Removes the registry entry if it is still ours.
    pub async fn close(self, registry: &ConnectionRegistry) {
        if let SessionState::Registered(user_id) = self.state {
            if registry.unregister(&user_id, &self.conn_id).await {
                info!("Relay disconnected: {}", user_id);
            } else {
                debug!("Relay {} closed after being superseded", user_id);
            }
        }
    }
}

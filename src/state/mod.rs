pub mod documents;
pub mod friends;
pub mod registry;

pub use friends::{FriendAction, FriendGraph, FriendStore, FriendView, JsonFileStore, MemoryStore};
pub use registry::ConnectionRegistry;

use std::path::PathBuf;
use std::time::Instant;

use log::info;
use tokio::sync::Mutex;

use crate::protocol;
use crate::{Error, Result, ServerConfig};

/// Shared application state: the connection registry, the friend store, and
/// where the served documents live.
pub struct AppState {
    pub registry: ConnectionRegistry,
    /// Held across load → mutate → save → notify so friend operations never interleave.
    pub friends: Mutex<Box<dyn FriendStore>>,
    pub server_data_path: PathBuf,
    /// When the process started (for uptime on /api/status).
    pub started_at: Instant,
    /// RFC 3339 start time (for status).
    pub started_at_utc: String,
}

impl AppState {
    pub fn new(friends: Box<dyn FriendStore>, server_data_path: PathBuf) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            friends: Mutex::new(friends),
            server_data_path,
            started_at: Instant::now(),
            started_at_utc: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// State backed by the JSON documents in `config.data_dir`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Box::new(JsonFileStore::new(
                config.document_path(documents::FRIENDS_FILE),
            )),
            config.document_path(documents::SERVER_DATA_FILE),
        )
    }

    /// Send a friend request from `caller` to `target`, or accept it if `target`
    /// already asked `caller`. The target is notified if connected.
    pub async fn request_or_accept(&self, caller: &str, target: &str) -> Result<FriendAction> {
        require_ids(caller, target)?;

        let mut store = self.friends.lock().await;
        let mut graph = store.load()?;
        let action = graph.request_or_accept(caller, target);
        store.save(&graph)?;

        let notice = match action {
            FriendAction::Accepted => protocol::friend_request_accepted(),
            FriendAction::Requested => protocol::friend_request_received(),
        };
        self.registry.send(target, &notice).await;
        drop(store);

        info!("Friend request {} -> {}: {:?}", caller, target, action);
        Ok(action)
    }

    /// Remove any friendship or pending request between the two users. Silent
    /// and idempotent.
    pub async fn unfriend(&self, caller: &str, target: &str) -> Result<()> {
        require_ids(caller, target)?;

        let mut store = self.friends.lock().await;
        let mut graph = store.load()?;
        graph.unfriend(caller, target);
        store.save(&graph)?;
        drop(store);

        info!("Unfriended {} <-> {}", caller, target);
        Ok(())
    }

    /// The caller's friends, outgoing and incoming requests, and blocked ids.
    /// Read-only: the caller's record is created in the snapshot, not persisted.
    pub async fn friend_view(&self, caller: &str) -> Result<FriendView> {
        let store = self.friends.lock().await;
        let mut graph = store.load()?;
        drop(store);
        Ok(graph.view(caller))
    }
}

fn require_ids(caller: &str, target: &str) -> Result<()> {
    if caller.is_empty() || target.is_empty() {
        return Err(Error::InvalidArgument("Missing uids".to_string()));
    }
    Ok(())
}

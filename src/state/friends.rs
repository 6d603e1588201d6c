//! Persisted friend graph: per-user friends, pending requests and blocked ids.
//!
//! Pending direction: a request from A to B is stored as `B ∈ A.pending`.
//! Incoming requests for a user are found by scanning every other record's
//! `pending` for that user's id.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::documents::{read_document, write_document};
use crate::{Result, UserId};

/// Denormalized peer info kept in a user's `friends` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInfo {
    #[serde(rename = "currentUserID")]
    pub current_user_id: UserId,
    #[serde(rename = "currentName")]
    pub current_name: String,
}

impl FriendInfo {
    /// No display-name service exists, so the name is the id.
    pub fn for_user(user_id: &str) -> Self {
        Self {
            current_user_id: user_id.to_string(),
            current_name: user_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub friends: BTreeMap<UserId, FriendInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending: Vec<UserId>,
    /// Stored but not enforced anywhere.
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocked: BTreeSet<UserId>,
}

/// Hand-edited files carry `null` where a list belongs; read it as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of a send-or-accept call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendAction {
    Accepted,
    Requested,
}

/// What a user sees when fetching their own friend state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FriendView {
    pub friends: BTreeMap<UserId, FriendInfo>,
    pub pending: Vec<UserId>,
    #[serde(rename = "incomingRequests")]
    pub incoming_requests: Vec<UserId>,
    pub blocked: BTreeSet<UserId>,
}

/// Whole-graph snapshot, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendGraph {
    records: BTreeMap<UserId, FriendRecord>,
}

impl FriendGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&FriendRecord> {
        self.records.get(user_id)
    }

    /// The record for `user_id`, created empty if absent.
    pub fn ensure(&mut self, user_id: &str) -> &mut FriendRecord {
        self.records.entry(user_id.to_string()).or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// If `target` already asked `caller`, make them friends; otherwise record
    /// `caller`'s request to `target`.
    pub fn request_or_accept(&mut self, caller: &str, target: &str) -> FriendAction {
        self.ensure(caller);
        let target_record = self.ensure(target);

        if target_record.pending.iter().any(|id| id == caller) {
            target_record.pending.retain(|id| id != caller);
            target_record
                .friends
                .insert(caller.to_string(), FriendInfo::for_user(caller));
            self.ensure(caller)
                .friends
                .insert(target.to_string(), FriendInfo::for_user(target));
            return FriendAction::Accepted;
        }

        let caller_record = self.ensure(caller);
        if !caller_record.pending.iter().any(|id| id == target) {
            caller_record.pending.push(target.to_string());
        }
        FriendAction::Requested
    }

    /// Drop the friendship and any pending request in either direction.
    pub fn unfriend(&mut self, caller: &str, target: &str) {
        let caller_record = self.ensure(caller);
        caller_record.friends.remove(target);
        caller_record.pending.retain(|id| id != target);

        let target_record = self.ensure(target);
        target_record.friends.remove(caller);
        target_record.pending.retain(|id| id != caller);
    }

    /// Ids whose `pending` names `user_id`. Scans every record.
    pub fn incoming_requests(&self, user_id: &str) -> Vec<UserId> {
        self.records
            .iter()
            .filter(|(_, record)| record.pending.iter().any(|id| id == user_id))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn view(&mut self, user_id: &str) -> FriendView {
        let incoming_requests = self.incoming_requests(user_id);
        let record = self.ensure(user_id);
        FriendView {
            friends: record.friends.clone(),
            pending: record.pending.clone(),
            incoming_requests,
            blocked: record.blocked.clone(),
        }
    }
}

/// Persistence for the friend graph. Callers serialize access; each logical
/// operation is one `load` followed by at most one `save`.
pub trait FriendStore: Send + Sync {
    fn load(&self) -> Result<FriendGraph>;
    fn save(&mut self, graph: &FriendGraph) -> Result<()>;
}

/// `friends.json` in the data directory. A missing file loads as an empty graph.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FriendStore for JsonFileStore {
    fn load(&self) -> Result<FriendGraph> {
        Ok(read_document(&self.path)?.unwrap_or_default())
    }

    fn save(&mut self, graph: &FriendGraph) -> Result<()> {
        write_document(&self.path, graph)
    }
}

/// In-process graph with no persistence. Used by tests and by callers that
/// embed `AppState` without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    graph: FriendGraph,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FriendStore for MemoryStore {
    fn load(&self) -> Result<FriendGraph> {
        Ok(self.graph.clone())
    }

    fn save(&mut self, graph: &FriendGraph) -> Result<()> {
        self.graph = graph.clone();
        Ok(())
    }
}

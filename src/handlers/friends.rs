//! Friend API. Identity is taken as supplied: the `x-uid` header, falling back
//! to `callerUid` in the body (POST) or `uid` in the query string (GET).

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::FriendView;
use crate::{Result, SharedState};

const CALLER_HEADER: &str = "x-uid";

// ---------- Request bodies ----------

#[derive(Debug, Default, Deserialize)]
pub struct FriendTargetBody {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, rename = "callerUid")]
    pub caller_uid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FriendsQuery {
    #[serde(default)]
    pub uid: Option<String>,
}

fn header_caller(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Caller and target ids from a POST; an unreadable body counts as empty.
fn ids_from(
    headers: &HeaderMap,
    body: std::result::Result<Json<FriendTargetBody>, JsonRejection>,
) -> (String, String) {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let caller = header_caller(headers).or(body.caller_uid).unwrap_or_default();
    (caller, body.uid.unwrap_or_default())
}

// ---------- Handlers ----------

/// GET /getfriends — without a caller id the view is empty.
pub async fn get_friends(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<FriendsQuery>,
) -> Result<Json<FriendView>> {
    let caller = header_caller(&headers)
        .or(query.uid)
        .filter(|uid| !uid.is_empty());
    let Some(caller) = caller else {
        return Ok(Json(FriendView::default()));
    };
    Ok(Json(state.friend_view(&caller).await?))
}

/// POST /frienduser — send a request, or accept one the target already sent.
pub async fn friend_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: std::result::Result<Json<FriendTargetBody>, JsonRejection>,
) -> Result<Json<Value>> {
    let (caller, target) = ids_from(&headers, body);
    let action = state.request_or_accept(&caller, &target).await?;
    Ok(Json(json!({ "success": true, "action": action })))
}

/// POST /unfrienduser — remove a friend, cancel an outgoing request or deny an incoming one.
pub async fn unfriend_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: std::result::Result<Json<FriendTargetBody>, JsonRejection>,
) -> Result<Json<Value>> {
    let (caller, target) = ids_from(&headers, body);
    state.unfriend(&caller, &target).await?;
    Ok(Json(json!({ "success": true })))
}

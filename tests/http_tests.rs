use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use menu_beacon::state::documents::{seed_data_dir, FRIENDS_FILE, SERVER_DATA_FILE};
use menu_beacon::{app, AppState, ServerConfig};

fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ServerConfig {
        data_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    seed_data_dir(&config.data_dir).expect("seed data dir");
    let state = Arc::new(AppState::from_config(&config));
    (app(state, &config), dir)
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn post(path: &str, caller: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(caller) = caller {
        builder = builder.header("x-uid", caller);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn get(path: &str, caller: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(caller) = caller {
        builder = builder.header("x-uid", caller);
    }
    builder.body(Body::empty()).expect("request")
}

fn sorted(value: &Value) -> Vec<String> {
    let mut ids: Vec<String> = value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string id").to_string())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn friend_routes_reject_missing_ids() {
    let (app, _dir) = test_app();

    let (status, body) = call(&app, post("/frienduser", None, json!({"uid": "bob"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing uids"}));

    let (status, _) = call(&app, post("/frienduser", Some("alice"), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, post("/unfrienduser", Some("alice"), json!({"uid": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_json = Request::builder()
        .method("POST")
        .uri("/frienduser")
        .header("content-type", "application/json")
        .header("x-uid", "alice")
        .body(Body::from("{ nope"))
        .expect("request");
    let (status, _) = call(&app, bad_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn request_then_accept_makes_mutual_friends() {
    let (app, _dir) = test_app();

    let (status, body) = call(&app, post("/frienduser", Some("alice"), json!({"uid": "bob"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "action": "requested"}));

    let (_, bob) = call(&app, get("/getfriends", Some("bob"))).await;
    assert_eq!(bob["incomingRequests"], json!(["alice"]));
    let (_, alice) = call(&app, get("/getfriends", Some("alice"))).await;
    assert_eq!(alice["pending"], json!(["bob"]));

    // Caller identity from the body instead of the header.
    let (status, body) = call(
        &app,
        post("/frienduser", None, json!({"uid": "alice", "callerUid": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "action": "accepted"}));

    let (_, alice) = call(&app, get("/getfriends", Some("alice"))).await;
    let (_, bob) = call(&app, get("/getfriends", Some("bob"))).await;
    assert_eq!(
        alice["friends"],
        json!({"bob": {"currentUserID": "bob", "currentName": "bob"}})
    );
    assert_eq!(
        bob["friends"],
        json!({"alice": {"currentUserID": "alice", "currentName": "alice"}})
    );
    for view in [&alice, &bob] {
        assert_eq!(view["pending"], json!([]));
        assert_eq!(view["incomingRequests"], json!([]));
        assert_eq!(view["blocked"], json!([]));
    }
}

#[tokio::test]
async fn incoming_requests_list_every_requester() {
    let (app, _dir) = test_app();
    call(&app, post("/frienduser", Some("bob"), json!({"uid": "alice"}))).await;
    call(&app, post("/frienduser", Some("carol"), json!({"uid": "alice"}))).await;

    let (status, view) = call(&app, get("/getfriends?uid=alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sorted(&view["incomingRequests"]), vec!["bob", "carol"]);
    assert_eq!(view["pending"], json!([]));
}

#[tokio::test]
async fn get_friends_without_caller_is_empty() {
    let (app, _dir) = test_app();
    let (status, view) = call(&app, get("/getfriends", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        view,
        json!({"friends": {}, "pending": [], "incomingRequests": [], "blocked": []})
    );
}

#[tokio::test]
async fn unfriend_is_idempotent() {
    let (app, _dir) = test_app();
    call(&app, post("/frienduser", Some("alice"), json!({"uid": "bob"}))).await;
    call(&app, post("/frienduser", Some("bob"), json!({"uid": "alice"}))).await;

    for _ in 0..2 {
        let (status, body) =
            call(&app, post("/unfrienduser", Some("alice"), json!({"uid": "bob"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    let (_, alice) = call(&app, get("/getfriends", Some("alice"))).await;
    let (_, bob) = call(&app, get("/getfriends", Some("bob"))).await;
    assert_eq!(alice["friends"], json!({}));
    assert_eq!(bob["friends"], json!({}));
}

#[tokio::test]
async fn friend_graph_is_written_to_disk() {
    let (app, dir) = test_app();
    call(&app, post("/frienduser", Some("alice"), json!({"uid": "bob"}))).await;

    let raw = fs::read_to_string(dir.path().join(FRIENDS_FILE)).expect("friends.json");
    let on_disk: Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(
        on_disk,
        json!({
            "alice": {"friends": {}, "pending": ["bob"], "blocked": []},
            "bob": {"friends": {}, "pending": [], "blocked": []}
        })
    );
}

#[tokio::test]
async fn corrupt_friend_graph_is_a_server_error() {
    let (app, dir) = test_app();
    fs::write(dir.path().join(FRIENDS_FILE), "{ truncated").expect("write");

    let (status, body) = call(&app, post("/frienduser", Some("alice"), json!({"uid": "bob"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Storage unavailable"}));

    // The broken document is not replaced.
    let raw = fs::read_to_string(dir.path().join(FRIENDS_FILE)).expect("friends.json");
    assert_eq!(raw, "{ truncated");
}

#[tokio::test]
async fn server_data_is_served_verbatim() {
    let (app, dir) = test_app();

    let (status, body) = call(&app, get("/serverdata", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["menu-version"], "8.5.1");
    assert_eq!(body["detected-mods"], json!([]));

    fs::write(
        dir.path().join(SERVER_DATA_FILE),
        r#"{"motd":"custom","anything":[1,2,3]}"#,
    )
    .expect("write");
    let (_, body) = call(&app, get("/serverdata", None)).await;
    assert_eq!(body, json!({"motd": "custom", "anything": [1, 2, 3]}));

    fs::remove_file(dir.path().join(SERVER_DATA_FILE)).expect("remove");
    let (status, body) = call(&app, get("/serverdata", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Server data unavailable"}));
}

#[tokio::test]
async fn tts_is_not_implemented() {
    let (app, _dir) = test_app();
    let (status, body) = call(&app, post("/tts", None, json!({"text": "hello"}))).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body, json!({"error": "TTS not configured on this server."}));
}

#[tokio::test]
async fn health_status_and_fallback() {
    let (app, _dir) = test_app();

    let resp = app.clone().oneshot(get("/health", None)).await.expect("response");
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, body) = call(&app, get("/api/status", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"], 0);
    assert!(body["started_at_utc"].is_string());

    let resp = app.clone().oneshot(get("/vote", None)).await.expect("response");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

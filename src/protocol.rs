//! Relay wire protocol. Messages are free-form JSON objects keyed by `command`;
//! the server only looks at a handful of fields and passes the rest through.

use serde_json::{json, Map, Value};

pub const REGISTER_COMMAND: &str = "register";
pub const REGISTERED_COMMAND: &str = "registered";
pub const NOTIFICATION_COMMAND: &str = "notification";

/// `from` value on every server-originated message.
pub const SERVER_SENDER: &str = "Server";

/// Commands a registered connection may forward to another user. Case-sensitive.
pub const RELAY_COMMANDS: &[&str] = &[
    "invite",
    "reqinvite",
    "preferences",
    "theme",
    "macro",
    "message",
    "notification",
];

/// How long the client shows a server notification, in milliseconds.
pub const NOTIFICATION_DURATION_MS: u64 = 5000;

const FRIENDS_TAG: &str =
    "<color=grey>[</color><color=green>FRIENDS</color><color=grey>]</color>";

pub fn is_relay_command(command: &str) -> bool {
    RELAY_COMMANDS.contains(&command)
}

/// Parse an inbound frame. Anything that is not a JSON object is `None`.
pub fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Non-empty string field, or `None`.
pub fn str_field<'a>(msg: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    msg.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Acknowledgment sent back on the registering socket.
pub fn registered_ack() -> Value {
    json!({ "command": REGISTERED_COMMAND, "from": SERVER_SENDER })
}

/// A toast-style notification originated by the server.
pub fn server_notification(message: &str) -> Value {
    json!({
        "command": NOTIFICATION_COMMAND,
        "from": SERVER_SENDER,
        "message": message,
        "time": NOTIFICATION_DURATION_MS,
    })
}

pub fn friend_request_received() -> Value {
    server_notification(&format!("{} You have a new friend request.", FRIENDS_TAG))
}

pub fn friend_request_accepted() -> Value {
    server_notification(&format!("{} Your friend request was accepted.", FRIENDS_TAG))
}

/// The inbound message as forwarded: every field kept, `from` forced to the sender.
pub fn forwarded(mut msg: Map<String, Value>, from: &str) -> Value {
    msg.insert("from".to_string(), Value::String(from.to_string()));
    Value::Object(msg)
}

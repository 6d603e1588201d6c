//! Flat JSON documents in the data directory.
//!
//! Writes go to a sibling temp file that is renamed into place, so a reader
//! never sees a half-written document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::Result;

pub const SERVER_DATA_FILE: &str = "serverdata.json";
pub const FRIENDS_FILE: &str = "friends.json";

/// Read and parse a document. A missing file is `Ok(None)`.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Pretty-print `value` to `path`, replacing any previous content atomically.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    let tmp = temp_path(path);
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Configuration served to clients on first start. The server never reads
/// these keys itself; operators edit the file in place.
pub fn default_server_data() -> Value {
    json!({
        "menu-version": "8.5.1",
        "min-version": "8.0.0",
        "min-console-version": "1.0.0",
        "motd": "You are using build {0}. Welcome to ii's Stupid Menu! SERVER FIX BY N5!!!",
        "discord-invite": "https://discord.gg/iidk",
        "admins": [
            { "name": "N5", "user-id": "1522F007FE79BFE1" }
        ],
        "super-admins": ["N5"],
        "patreon": [],
        "poll": "What goes well with cheeseburgers?",
        "option-a": "Fries",
        "option-b": "Chips",
        "detected-mods": []
    })
}

/// Create the data directory and any missing documents. Existing files are left untouched.
pub fn seed_data_dir(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;

    let server_data = data_dir.join(SERVER_DATA_FILE);
    if !server_data.exists() {
        write_document(&server_data, &default_server_data())?;
        info!("Seeded {}", server_data.display());
    }

    let friends = data_dir.join(FRIENDS_FILE);
    if !friends.exists() {
        write_document(&friends, &json!({}))?;
        info!("Seeded {}", friends.display());
    }

    Ok(())
}

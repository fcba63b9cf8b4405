//! Files kept under the user cache directory: session, chat history and the
//! local SQLite store.

use sha2::{Digest, Sha256};
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

const APP_DIR: &str = "weekly-score";

/// Path: ~/.cache/weekly-score
pub fn cache_root() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join(APP_DIR)
}

/// Path: {root}/session.json
pub fn session_path(root: &Path) -> PathBuf {
    root.join("session.json")
}

/// Path: {root}/chat-{sha256(username)}.json
///
/// Hashing keeps distinct usernames on distinct files whatever characters
/// they contain.
pub fn chat_history_path(root: &Path, username: &str) -> PathBuf {
    let digest = Sha256::digest(username.trim().as_bytes());
    root.join(format!("chat-{}.json", hex::encode(digest)))
}

/// Path: ~/.cache/weekly-score/scores.db
pub fn default_db_path() -> PathBuf {
    cache_root().join("scores.db")
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file, creating parent directories.
pub fn write_string(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}

/// Remove a file; a missing file is not an error. Returns whether it existed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

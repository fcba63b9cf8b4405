//! Login, logout and whoami

use std::{io::BufRead, path::Path};

use super::common::{current_session, CommandContext};
use crate::{
    accounts::{authenticate, Session},
    assistant::ChatHistory,
    core::{chat_history_path, session_path},
    storage::TableStore,
    Result,
};

/// Drop a user's saved conversation so the next chat reseeds from fresh data.
fn discard_chat(cache_dir: &Path, username: &str) -> Result<bool> {
    ChatHistory::discard(&chat_history_path(cache_dir, username))
}

/// Check credentials against the account sheet and persist the session.
/// Any earlier conversation of the same user is discarded.
pub async fn login<S: TableStore>(
    ctx: &CommandContext<S>,
    username: &str,
    password: &str,
) -> Result<Session> {
    let accounts = ctx.load_accounts().await?;
    let session = authenticate(
        &accounts,
        username,
        password,
        ctx.config.hashed_passwords,
    )?;
    discard_chat(&ctx.cache_dir, &session.username)?;
    session.save_to(&session_path(&ctx.cache_dir))?;
    Ok(session)
}

/// First line of `reader`, without the line ending.
pub fn read_password<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

/// Handle the login command. Without a password argument it is read from
/// stdin.
pub async fn handle_login<S: TableStore>(
    ctx: &CommandContext<S>,
    username: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => {
            eprint!("Password: ");
            read_password(std::io::stdin().lock())?
        }
    };
    let session = login(ctx, username, &password).await?;
    println!("✓ Logged in. Xin chào {} 👋", session.greeting_name());
    Ok(())
}

/// Forget the saved session and its conversation. Returns whether a session
/// existed.
pub fn logout(cache_dir: &Path) -> Result<bool> {
    let path = session_path(cache_dir);
    if let Ok(Some(session)) = Session::load_from(&path) {
        discard_chat(cache_dir, &session.username)?;
    }
    Session::clear_at(&path)
}

/// Handle the logout command
pub fn handle_logout(cache_dir: &Path) -> Result<()> {
    if logout(cache_dir)? {
        println!("✓ Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

/// Handle the whoami command
pub fn handle_whoami(cache_dir: &Path) -> Result<()> {
    let session = current_session(cache_dir)?;
    println!("👤 {}", session.username);
    println!("🔑 Role: {}", session.role);
    if !session.class_name.is_empty() {
        println!("📘 Class: {}", session.class_name);
    }
    if !session.display_name.is_empty() {
        println!("Name: {}", session.display_name);
    }
    Ok(())
}

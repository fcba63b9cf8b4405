//! Accounts and login sessions
//!
//! Accounts are read from the account sheet with the same header
//! normalization the score sheet uses, so `Mật khẩu`, `mat khau` and
//! `Password` all bind to the password column. A successful login yields a
//! [`Session`] that every command receives explicitly.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::{
    core::{remove_file_if_exists, try_read_to_string, write_string},
    error::ScoreError,
    scoring::{normalize_header, ScoreTable},
    Result,
};


const USERNAME_CANDIDATES: &[&str] = &["username", "ten dang nhap"];
const PASSWORD_CANDIDATES: &[&str] = &["password", "mat khau"];
const ROLE_CANDIDATES: &[&str] = &["quyen", "role"];
const CLASS_CANDIDATES: &[&str] = &["lopphutrach", "lop phu trach"];
const DISPLAY_CANDIDATES: &[&str] = &["tengiaovien", "ten giao vien"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ScoreError;

    /// Case-insensitive; a blank cell is a plain user.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(ScoreError::UnknownRole {
                role: other.to_string(),
            }),
        }
    }
}

/// One row of the account sheet. The role is kept raw and parsed at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub role: String,
    pub class_name: String,
    pub display_name: String,
}

/// Who is logged in and what they may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub class_name: String,
    pub display_name: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name, or the username when the sheet has none.
    pub fn greeting_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }

    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ScoreError::PermissionDenied {
                action: action.to_string(),
                required: Role::Admin.to_string(),
            })
        }
    }

    /// Admins may act on any class; users only on their assigned one.
    pub fn can_access_class(&self, class_name: &str) -> bool {
        self.is_admin() || self.class_name.trim() == class_name.trim()
    }

    pub fn require_class_access(&self, class_name: &str, action: &str) -> Result<()> {
        if self.can_access_class(class_name) {
            Ok(())
        } else {
            Err(ScoreError::PermissionDenied {
                action: format!("{} for class {}", action, class_name.trim()),
                required: Role::Admin.to_string(),
            })
        }
    }

    /// Read a persisted session; a missing file means nobody is logged in.
    pub fn load_from(path: &Path) -> Result<Option<Session>> {
        match try_read_to_string(path) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_string(path, &serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Remove a persisted session. Returns whether one existed.
    pub fn clear_at(path: &Path) -> Result<bool> {
        Ok(remove_file_if_exists(path)?)
    }
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    candidates
        .iter()
        .find_map(|c| normalized.iter().position(|n| n == c))
}

/// Parse the account sheet (header first). Rows without a username are dropped.
pub fn load_accounts(values: Vec<Vec<String>>) -> Vec<Account> {
    let table = ScoreTable::from_values(values);
    if !table.is_loaded() {
        return Vec::new();
    }
    let headers = table.columns();

    let username = find_column(headers, USERNAME_CANDIDATES).unwrap_or(0);
    let password = find_column(headers, PASSWORD_CANDIDATES);
    let role = find_column(headers, ROLE_CANDIDATES);
    let class_name = find_column(headers, CLASS_CANDIDATES);
    let display_name = find_column(headers, DISPLAY_CANDIDATES);

    let cell = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    table
        .rows()
        .iter()
        .map(|row| Account {
            username: cell(row, Some(username)),
            password: cell(row, password),
            role: cell(row, role),
            class_name: cell(row, class_name),
            display_name: cell(row, display_name),
        })
        .filter(|account| !account.username.is_empty())
        .collect()
}

/// Lowercase hex SHA-256 of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check credentials against the account list and open a session.
///
/// With `hashed`, the stored password is a lowercase hex SHA-256 digest.
pub fn authenticate(
    accounts: &[Account],
    username: &str,
    password: &str,
    hashed: bool,
) -> Result<Session> {
    if accounts.is_empty() {
        return Err(ScoreError::NoAccounts);
    }

    let username = username.trim();
    let account = accounts
        .iter()
        .find(|a| a.username == username)
        .ok_or_else(|| ScoreError::AccountNotFound {
            username: username.to_string(),
        })?;

    let matches = if hashed {
        hash_password(password) == account.password.to_lowercase()
    } else {
        password == account.password
    };
    if !matches {
        debug!(username, "password mismatch");
        return Err(ScoreError::WrongPassword);
    }

    let role = account.role.parse::<Role>()?;
    info!(username, %role, "logged in");
    Ok(Session {
        username: account.username.clone(),
        role,
        class_name: account.class_name.clone(),
        display_name: account.display_name.clone(),
    })
}

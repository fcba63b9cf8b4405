//! Error types for the weekly score CLI

use thiserror::Error;


pub type Result<T> = std::result::Result<T, ScoreError>;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(#[from] chrono::ParseError),

    #[error("Failed to parse number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("{env_var} environment variable not set")]
    MissingConfig { env_var: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("Sheet '{sheet}' is empty; run `weekly-score init-sheet` first")]
    EmptyTable { sheet: String },

    #[error("Unknown rubric item: {key}")]
    UnknownRubricItem { key: String },

    #[error("Invalid count entry '{entry}', expected KEY=COUNT")]
    InvalidCountEntry { entry: String },

    #[error("No accounts found in the account sheet")]
    NoAccounts,

    #[error("Account not found: {username}")]
    AccountNotFound { username: String },

    #[error("Wrong password")]
    WrongPassword,

    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    #[error("No class given and the account has no assigned class")]
    MissingClass,

    #[error("Not logged in; run `weekly-score login` first")]
    NotLoggedIn,

    #[error("Permission denied: {action} requires {required} role")]
    PermissionDenied { action: String, required: String },

    #[error("Assistant returned no text")]
    EmptyAssistantResponse,

    #[error("{message}")]
    Storage { message: String },
}

impl From<anyhow::Error> for ScoreError {
    fn from(err: anyhow::Error) -> Self {
        // rusqlite errors wrapped by anyhow keep their own variant
        match err.downcast::<rusqlite::Error>() {
            Ok(db) => ScoreError::Database(db),
            Err(other) => ScoreError::Storage {
                message: format!("{:#}", other),
            },
        }
    }
}

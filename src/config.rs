//! Environment-driven configuration
//!
//! Every setting is read once at command start. The CLI's `--backend` flag
//! takes precedence over `WEEKLY_SCORE_BACKEND`.

use std::path::PathBuf;
use tracing::debug;

use crate::{
    cli::types::BackendKind,
    core::default_db_path,
    error::ScoreError,
    storage::{Backend, SheetsStore, SqliteStore},
    Result,
};

/// Sheet holding login accounts.
pub const ACCOUNTS_SHEET: &str = "TaiKhoan";
/// Sheet holding weekly scores.
pub const SCORE_SHEET: &str = "Score";

pub const SPREADSHEET_ID_ENV_VAR: &str = "WEEKLY_SCORE_SPREADSHEET_ID";
pub const ACCESS_TOKEN_ENV_VAR: &str = "WEEKLY_SCORE_ACCESS_TOKEN";
pub const BACKEND_ENV_VAR: &str = "WEEKLY_SCORE_BACKEND";
pub const DB_PATH_ENV_VAR: &str = "WEEKLY_SCORE_DB";
pub const HASHED_PASSWORDS_ENV_VAR: &str = "WEEKLY_SCORE_HASHED_PASSWORDS";
pub const GEMINI_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_ENV_VAR: &str = "WEEKLY_SCORE_GEMINI_MODEL";
/// Read by `login` when `--password` is not given on the command line.
pub const PASSWORD_ENV_VAR: &str = "WEEKLY_SCORE_PASSWORD";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    pub spreadsheet_id: Option<String>,
    pub access_token: Option<String>,
    pub db_path: PathBuf,
    pub hashed_passwords: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env(backend: Option<BackendKind>) -> Result<Self> {
        Self::from_lookup(backend, |key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(backend: Option<BackendKind>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match backend {
            Some(kind) => kind,
            None => get(BACKEND_ENV_VAR)
                .map(|v| v.parse::<BackendKind>())
                .transpose()?
                .unwrap_or_default(),
        };

        let hashed_passwords = match get(HASHED_PASSWORDS_ENV_VAR) {
            None => false,
            Some(v) => parse_flag(&v).ok_or_else(|| ScoreError::InvalidConfig {
                key: HASHED_PASSWORDS_ENV_VAR.to_string(),
                value: v,
            })?,
        };

        let config = Self {
            backend,
            spreadsheet_id: get(SPREADSHEET_ID_ENV_VAR),
            access_token: get(ACCESS_TOKEN_ENV_VAR),
            db_path: get(DB_PATH_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            hashed_passwords,
            gemini_api_key: get(GEMINI_API_KEY_ENV_VAR),
            gemini_model: get(GEMINI_MODEL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        };
        debug!(backend = %config.backend, db = %config.db_path.display(), "loaded config");
        Ok(config)
    }

    pub fn spreadsheet_id(&self) -> Result<&str> {
        require(&self.spreadsheet_id, SPREADSHEET_ID_ENV_VAR)
    }

    pub fn access_token(&self) -> Result<&str> {
        require(&self.access_token, ACCESS_TOKEN_ENV_VAR)
    }

    pub fn gemini_api_key(&self) -> Result<&str> {
        require(&self.gemini_api_key, GEMINI_API_KEY_ENV_VAR)
    }

    /// Open the configured table store.
    pub fn build_store(&self) -> Result<Backend> {
        match self.backend {
            BackendKind::Sheets => Ok(Backend::Sheets(SheetsStore::new(
                self.spreadsheet_id()?,
                self.access_token()?,
            )?)),
            BackendKind::Sqlite => Ok(Backend::Sqlite(SqliteStore::open(&self.db_path)?)),
        }
    }
}

fn require<'a>(value: &'a Option<String>, env_var: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| ScoreError::MissingConfig {
        env_var: env_var.to_string(),
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(None, lookup(&[])).unwrap();
        assert_eq!(config.backend, BackendKind::Sheets);
        assert!(!config.hashed_passwords);
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.db_path, default_db_path());
    }

    #[test]
    fn test_cli_backend_overrides_env() {
        let env = lookup(&[(BACKEND_ENV_VAR, "sheets")]);
        let config = Config::from_lookup(Some(BackendKind::Sqlite), env).unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);

        let env = lookup(&[(BACKEND_ENV_VAR, "sqlite")]);
        let config = Config::from_lookup(None, env).unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);
    }

    #[test]
    fn test_invalid_backend_and_flag() {
        let env = lookup(&[(BACKEND_ENV_VAR, "excel")]);
        assert!(matches!(
            Config::from_lookup(None, env),
            Err(ScoreError::InvalidConfig { .. })
        ));

        let env = lookup(&[(HASHED_PASSWORDS_ENV_VAR, "maybe")]);
        assert!(matches!(
            Config::from_lookup(None, env),
            Err(ScoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_hashed_passwords_flag() {
        let env = lookup(&[(HASHED_PASSWORDS_ENV_VAR, "TRUE")]);
        assert!(Config::from_lookup(None, env).unwrap().hashed_passwords);
    }

    #[test]
    fn test_blank_values_are_missing() {
        let env = lookup(&[(SPREADSHEET_ID_ENV_VAR, "  "), (ACCESS_TOKEN_ENV_VAR, "tok")]);
        let config = Config::from_lookup(None, env).unwrap();
        match config.spreadsheet_id() {
            Err(ScoreError::MissingConfig { env_var }) => {
                assert_eq!(env_var, SPREADSHEET_ID_ENV_VAR)
            }
            other => panic!("expected MissingConfig, got {:?}", other),
        }
        assert_eq!(config.access_token().unwrap(), "tok");
    }

    #[test]
    fn test_sheets_store_requires_credentials() {
        let config = Config::from_lookup(None, lookup(&[])).unwrap();
        assert!(matches!(
            config.build_store(),
            Err(ScoreError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_sqlite_store_opens_configured_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("sub").join("scores.db");
        let env = lookup(&[(DB_PATH_ENV_VAR, db.to_str().unwrap())]);
        let config = Config::from_lookup(Some(BackendKind::Sqlite), env).unwrap();

        match config.build_store().unwrap() {
            Backend::Sqlite(store) => assert_eq!(store.path(), Some(db.as_path())),
            Backend::Sheets(_) => panic!("expected sqlite backend"),
        }
    }
}

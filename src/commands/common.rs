//! Common utilities and helper functions shared across commands.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    accounts::{load_accounts, Account, Session},
    cli::types::BackendKind,
    config::{Config, ACCOUNTS_SHEET, SCORE_SHEET},
    core::{cache_root, session_path},
    error::ScoreError,
    scoring::{Rubric, ScoreSheet},
    storage::{Backend, TableStore},
    Result,
};

/// Resources most commands need: configuration, the table store, the rubric
/// and the directory sessions and chat histories live in.
pub struct CommandContext<S = Backend> {
    pub config: Config,
    pub store: S,
    pub rubric: Rubric,
    pub cache_dir: PathBuf,
}

impl CommandContext<Backend> {
    /// Build from the environment and open the configured store.
    pub fn from_env(backend: Option<BackendKind>) -> Result<Self> {
        let config = Config::from_env(backend)?;
        let store = config.build_store()?;
        debug!(backend = %config.backend, "opened table store");
        Ok(Self::new(config, store, cache_root()))
    }
}

impl<S: TableStore> CommandContext<S> {
    pub fn new(config: Config, store: S, cache_dir: PathBuf) -> Self {
        Self {
            config,
            store,
            rubric: Rubric::standard(),
            cache_dir,
        }
    }

    /// The logged-in session, or `NotLoggedIn`.
    pub fn session(&self) -> Result<Session> {
        current_session(&self.cache_dir)
    }

    pub async fn load_scores(&self) -> Result<ScoreSheet> {
        ScoreSheet::load(&self.store, SCORE_SHEET, &self.rubric).await
    }

    pub async fn load_accounts(&self) -> Result<Vec<Account>> {
        let values = self.store.read_all(ACCOUNTS_SHEET).await?;
        Ok(load_accounts(values))
    }
}

/// Read the saved session under `cache_dir`.
pub fn current_session(cache_dir: &Path) -> Result<Session> {
    Session::load_from(&session_path(cache_dir))?.ok_or(ScoreError::NotLoggedIn)
}

/// Current local time in the sheet's timestamp format.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Today's local date.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

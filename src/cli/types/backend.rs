//! Storage backend selection.

use crate::error::{Result, ScoreError};
use std::fmt;
use std::str::FromStr;

/// Which table store the commands talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    /// Google Sheets spreadsheet (system of record)
    #[default]
    Sheets,
    /// Local SQLite file in the cache directory
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendKind::Sheets => "sheets",
            BackendKind::Sqlite => "sqlite",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BackendKind {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sheets" | "google" | "gsheets" => Ok(Self::Sheets),
            "sqlite" | "local" => Ok(Self::Sqlite),
            other => Err(ScoreError::InvalidConfig {
                key: "backend".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("sheets".parse::<BackendKind>().unwrap(), BackendKind::Sheets);
        assert_eq!("SQLite".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!("excel".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_backend_display_round_trips() {
        for kind in [BackendKind::Sheets, BackendKind::Sqlite] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }
}

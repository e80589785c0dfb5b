use std::fmt;

use thiserror::Error;

/// Failures while turning one cached source snapshot into typed rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("invalid json in {source_name}: {source}")]
    Json {
        source_name: String,
        source: serde_json::Error,
    },

    /// A partial scrape: the row is shorter than the positional schema needs.
    #[error("{source_name} row {row}: expected at least {expected} fields, found {found}")]
    MalformedRow {
        source_name: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{source_name} row {row}: invalid {field} value {value:?}")]
    InvalidValue {
        source_name: String,
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("malformed matchup string {game_info:?}")]
    MalformedMatchup { game_info: String },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no matching record")]
    NotFound,
    #[error("{candidates} records match")]
    Ambiguous { candidates: usize },
}

/// Why a salary-export player was left out of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnmatchedIdentity { source: &'static str },
    AmbiguousIdentity { source: &'static str, candidates: usize },
}

impl SkipReason {
    pub fn from_match_error(source: &'static str, err: MatchError) -> Self {
        match err {
            MatchError::NotFound => SkipReason::UnmatchedIdentity { source },
            MatchError::Ambiguous { candidates } => {
                SkipReason::AmbiguousIdentity { source, candidates }
            }
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnmatchedIdentity { source } => write!(f, "not found in {source}"),
            SkipReason::AmbiguousIdentity { source, candidates } => {
                write!(f, "{candidates} ambiguous matches in {source}")
            }
        }
    }
}

use std::path::PathBuf;

use crate::ai::SearchError;
use crate::game::MoveError;

/// Errors that can occur while loading or saving the Q-table.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read Q-table from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode Q-table from {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rmp_serde::decode::Error,
    },

    #[error("failed to encode Q-table: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("unsupported Q-table format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while playing games between agents.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("{agent} selected illegal action {action} (legal: {legal:?})")]
    IllegalAction {
        agent: String,
        action: usize,
        legal: Vec<usize>,
    },

    #[error("{agent} returned no action for a non-terminal position")]
    NoAction { agent: String },

    #[error("move rejected by the board: {0:?}")]
    Move(MoveError),

    #[error("game should be terminal but has no outcome")]
    MissingOutcome,

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors raised when rebuilding a position from an external grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("invalid cell value {value} at row {row}, column {col} (expected -1, 0 or 1)")]
    InvalidCell { row: usize, col: usize, value: i8 },

    #[error("disc above an empty cell at row {row}, column {col}")]
    FloatingDisc { row: usize, col: usize },

    #[error("impossible disc counts: red={red}, yellow={yellow}")]
    InvalidCounts { red: usize, yellow: usize },

    #[error("both players have four in a row")]
    BothConnected,
}

/// Errors raised when asking an agent for a move on an external grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::UnsupportedVersion { found: 9, expected: 1 };
        assert_eq!(
            err.to_string(),
            "unsupported Q-table format version 9 (expected 1)"
        );
    }

    #[test]
    fn test_match_error_display() {
        let err = MatchError::IllegalAction {
            agent: "Magnus".to_string(),
            action: 5,
            legal: vec![0, 1, 2],
        };
        assert_eq!(
            err.to_string(),
            "Magnus selected illegal action 5 (legal: [0, 1, 2])"
        );
    }

    #[test]
    fn test_move_error_is_carried() {
        let err = MatchError::Move(MoveError::ColumnFull);
        assert_eq!(err.to_string(), "move rejected by the board: ColumnFull");
    }

    #[test]
    fn test_grid_error_display() {
        let err = GridError::InvalidCounts { red: 3, yellow: 1 };
        assert_eq!(err.to_string(), "impossible disc counts: red=3, yellow=1");
    }

    #[test]
    fn test_policy_error_wraps_sources() {
        let err: PolicyError = GridError::BothConnected.into();
        assert_eq!(err.to_string(), "invalid grid: both players have four in a row");
        let err: PolicyError = SearchError::NoLegalMoves.into();
        assert!(err.to_string().starts_with("search failed: "));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("magnus.alpha must be in [0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: magnus.alpha must be in [0, 1]"
        );
    }
}

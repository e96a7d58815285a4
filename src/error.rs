//! Error types
//!
//! Only the leaderboard boundary and the session transitions can fail. The
//! simulation itself clamps or rejects bad moves silently.

use thiserror::Error;

/// Malformed score submission, rejected before anything is touched
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Name must not be blank")]
    EmptyName,
    #[error("Valid score is required")]
    MissingScore,
    #[error("Score must be a non-negative number, got {0}")]
    InvalidScore(String),
}

/// Leaderboard storage failure. Recovered inside the score service.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored leaderboard is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage unavailable")]
    Unavailable,
}

/// Session transition requested in the wrong phase
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("player name is blank")]
    InvalidName,
    #[error("a session can only start from the menu")]
    NotInMenu,
    #[error("no game is being played")]
    NotPlaying,
    #[error("the current level is not complete yet")]
    LevelNotComplete,
    #[error("the session is not over")]
    NotGameOver,
}

/// Settings file could not be read or written
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

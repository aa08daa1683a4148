//! Error types raised by repository implementations.

use skirmish_core::BattleError;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("replay repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid replay name {0:?}")]
    InvalidName(String),

    #[error("replayed battle does not match: expected digest {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("recorded battle cannot be rebuilt: {0}")]
    Replay(#[from] BattleError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

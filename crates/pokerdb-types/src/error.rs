use thiserror::Error;

/// Errors produced by value parsing and document invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid timestamp {value:?}: expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp { value: String },

    #[error("only sealed sessions can be appended to the database")]
    UnsealedSession,
}

/// Errors produced by player registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("player not found: {0}")]
    NotFound(String),

    #[error("player already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid player name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },
}

/// Errors from database store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No database document exists under this name.
    #[error("database not found: {0}")]
    NotFound(String),

    /// A database document already exists under this name.
    #[error("database already exists: {0}")]
    AlreadyExists(String),

    /// The database name cannot be used as a file name.
    #[error("invalid database name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No home directory to derive the default storage location from.
    #[error("cannot locate home directory: HOME is not set")]
    NoHomeDirectory,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

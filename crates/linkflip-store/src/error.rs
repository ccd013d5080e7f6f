use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// The medium rejected a document write.
    #[error("Could not save {key}: {reason}")]
    Write { key: String, reason: String },

    /// A stored document could not be read or parsed. Logged, never
    /// returned from [`crate::DocumentStore::load`].
    #[error("Stored {key} is unreadable: {reason}")]
    ReadCorrupt { key: String, reason: String },

    /// JSON encoding error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous holder of the connection lock panicked.
    #[error("Database lock poisoned")]
    Poisoned,

    /// A background save did not run to completion.
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

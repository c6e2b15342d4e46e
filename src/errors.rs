//! Error types for hemolink storage operations.

/// Errors that can occur while reading or writing the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested row was not found.
    NotFound,
    /// A row with the same unique key already exists.
    AlreadyExists,
    /// JSON serialization or deserialization failed.
    SerializationError(String),
    /// An internal database error occurred.
    Internal(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Row not found"),
            Self::AlreadyExists => write!(f, "Row already exists"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            _ => StoreError::Internal(e.to_string()),
        }
    }
}

impl std::error::Error for StoreError {}

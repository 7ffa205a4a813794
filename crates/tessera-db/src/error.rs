//! Database-specific error types and conversions.

use tessera_core::error::TesseraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Could not decode row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// True when the error is a unique-index violation. Find-or-create
    /// callers treat this as "lost the race, look it up again".
    pub fn is_duplicate(&self) -> bool {
        match self {
            DbError::Surreal(e) => e.to_string().contains("already contains"),
            _ => false,
        }
    }
}

impl From<DbError> for TesseraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TesseraError::NotFound { entity, id },
            other => TesseraError::Database(other.to_string()),
        }
    }
}

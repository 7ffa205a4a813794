//! Error types shared across the Tessera crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Nesting '{child}' would create a circular collection chain")]
    CycleDetected { child: String },

    #[error("{entity} must belong to the same organization")]
    CrossOrg { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TesseraResult<T> = Result<T, TesseraError>;

//! Tag engine error types.

use tessera_core::error::TesseraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagEngineError {
    #[error("nesting '{child}' would create a circular collection chain")]
    CycleDetected { child: String },

    #[error("collection graph traversal exceeded {limit} nodes")]
    GraphLimitExceeded { limit: usize },
}

impl From<TagEngineError> for TesseraError {
    fn from(err: TagEngineError) -> Self {
        match err {
            TagEngineError::CycleDetected { child } => TesseraError::CycleDetected { child },
            TagEngineError::GraphLimitExceeded { .. } => TesseraError::Validation {
                message: err.to_string(),
            },
        }
    }
}

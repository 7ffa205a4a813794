//! Section domain model — ordered content blocks within a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One content block of a document. Org scope is inherited through the
/// owning document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub document_id: Uuid,
    pub header: String,
    pub body_md: String,
    /// Explicit position within the document; listing orders by
    /// `(order, id)` so ties stay stable.
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSection {
    pub document_id: Uuid,
    pub header: String,
    pub body_md: String,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSection {
    pub header: Option<String>,
    pub body_md: Option<String>,
    pub order: Option<u32>,
}

//! Document version snapshots.
//!
//! A snapshot of a document's structural metadata and visibility at a
//! point in time, appended by the calling layer after each document
//! mutation. Append-only: no update or delete operations exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::document::DocumentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: Uuid,
    pub document_id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
    pub everyone: bool,
    /// Structural metadata captured as id lists at snapshot time.
    pub tag_ids: Vec<Uuid>,
    pub collection_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentVersion {
    pub document_id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    pub status: DocumentStatus,
    pub everyone: bool,
    pub tag_ids: Vec<Uuid>,
    pub collection_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
}

//! Document domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Draft,
    Published,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::Published => "Published",
            DocumentStatus::Archived => "Archived",
        }
    }
}

/// A knowledge-base document.
///
/// Department and tag membership live in edge relations; collection
/// membership is the reverse side of each collection's document set.
/// When `everyone` is false the surrounding request layer requires at
/// least one department — the core only derives structural tags from
/// whatever membership it finds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    /// Unique within the organization when non-empty; derived from
    /// `title` when absent.
    pub slug: String,
    pub status: DocumentStatus,
    /// Visible to the whole organization regardless of departments.
    pub everyone: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub org_id: Uuid,
    pub title: String,
    /// Derived from `title` when `None`.
    pub slug: Option<String>,
    pub status: DocumentStatus,
    pub everyone: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<DocumentStatus>,
    pub everyone: Option<bool>,
}

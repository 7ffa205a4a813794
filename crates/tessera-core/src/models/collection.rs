//! Collection domain model.
//!
//! Collections curate documents and may nest other collections. The
//! nesting relation is a directed graph over collections of one org and
//! must remain acyclic and free of self-loops at all times; the tag
//! engine's cycle guard vets every proposed edge before it is committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    /// Unique within the organization; derived from `name` when absent.
    pub slug: String,
    pub description: String,
    /// Display position among the org's collections.
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    pub org_id: Uuid,
    pub name: String,
    /// Derived from `name` when `None`.
    pub slug: Option<String>,
    pub description: String,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCollection {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub order: Option<u32>,
}

/// The added/removed sides of a bulk membership replacement.
///
/// `set_documents` returns this so the trigger layer can re-sync
/// structural tags for every affected document, on both sides.
#[derive(Debug, Clone, Default)]
pub struct MembershipDelta {
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

//! Tag domain model.
//!
//! A tag may point at a department, collection, document, or URL. Tags
//! linked to a department or collection are *structural*: the system
//! provisions them and keeps their attachment to documents in lockstep
//! with membership. All other tags are *manual* and the engine never
//! removes them from a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a tag points at, if anything.
///
/// Modelled as a tagged variant so that "is this tag structural" is a
/// type-level question rather than a set of null checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TagLink {
    /// Plain label with no link target.
    #[default]
    None,
    /// Mirrors membership in a department. Structural.
    Department(Uuid),
    /// Mirrors membership in a collection. Structural.
    Collection(Uuid),
    /// Points a reader at a document. Manual.
    Document(Uuid),
    /// Points a reader at an external URL. Manual.
    Url(String),
}

impl TagLink {
    /// Structural tags are system-managed; the synchronizer only ever
    /// attaches or detaches these.
    pub fn is_structural(&self) -> bool {
        matches!(self, TagLink::Department(_) | TagLink::Collection(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    /// Unique within the organization.
    pub slug: String,
    pub description: String,
    pub link: TagLink,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn is_structural(&self) -> bool {
        self.link.is_structural()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub org_id: Uuid,
    pub name: String,
    /// Derived from `name` when `None`.
    pub slug: Option<String>,
    pub description: String,
    pub link: TagLink,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Replaces the link outright; pass `Some(TagLink::None)` to unlink.
    pub link: Option<TagLink>,
}

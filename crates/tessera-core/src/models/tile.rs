//! Tile domain model — homepage/navigation entry points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TesseraError, TesseraResult};

/// What a tile navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Document,
    Department,
    Collection,
    Url,
}

impl TileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Document => "Document",
            TileKind::Department => "Department",
            TileKind::Collection => "Collection",
            TileKind::Url => "Url",
        }
    }
}

/// A navigation tile on an organization's landing page.
///
/// Exactly one target field is meaningful, determined by `kind`; the
/// repository rejects writes whose target is missing or belongs to a
/// different organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: String,
    pub kind: TileKind,
    pub order: u32,
    pub is_active: bool,
    pub document_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub collection_id: Option<Uuid>,
    pub href: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTile {
    pub org_id: Uuid,
    pub title: String,
    pub kind: TileKind,
    pub order: u32,
    pub is_active: bool,
    pub document_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub collection_id: Option<Uuid>,
    pub href: String,
    pub description: String,
}

impl CreateTile {
    /// Check that the target required by `kind` is present.
    ///
    /// Same-org enforcement needs the store and happens in the
    /// repository; this covers the shape of the input itself.
    pub fn validate_target(&self) -> TesseraResult<()> {
        let ok = match self.kind {
            TileKind::Document => self.document_id.is_some(),
            TileKind::Department => self.department_id.is_some(),
            TileKind::Collection => self.collection_id.is_some(),
            TileKind::Url => !self.href.is_empty(),
        };
        if ok {
            Ok(())
        } else {
            Err(TesseraError::Validation {
                message: format!("{} tile requires a matching target", self.kind.as_str()),
            })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTile {
    pub title: Option<String>,
    pub order: Option<u32>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

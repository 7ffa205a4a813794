//! SurrealDB repository implementations for the `tessera-core` traits.

mod collection;
mod department;
mod document;
mod document_version;
mod organization;
mod resource_link;
mod section;
mod tag;
mod tile;

pub use collection::SurrealCollectionRepository;
pub use department::SurrealDepartmentRepository;
pub use document::SurrealDocumentRepository;
pub use document_version::SurrealDocumentVersionRepository;
pub use organization::SurrealOrganizationRepository;
pub use resource_link::SurrealResourceLinkRepository;
pub use section::SurrealSectionRepository;
pub use tag::SurrealTagRepository;
pub use tile::SurrealTileRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

/// Row struct for id-only edge queries (`meta::id(...) AS record_id`).
#[derive(Debug, SurrealValue)]
pub(crate) struct IdRow {
    pub(crate) record_id: String,
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

pub(crate) fn parse_id_rows(rows: Vec<IdRow>, what: &str) -> Result<Vec<Uuid>, DbError> {
    rows.into_iter()
        .map(|row| parse_uuid(&row.record_id, what))
        .collect()
}

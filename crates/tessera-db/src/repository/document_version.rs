//! SurrealDB implementation of [`DocumentVersionRepository`].
//!
//! Snapshots are append-only; the table schema denies updates and
//! deletes outright.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::document::DocumentStatus;
use tessera_core::models::document_version::{CreateDocumentVersion, DocumentVersion};
use tessera_core::repository::{DocumentVersionRepository, PaginatedResult, Pagination};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::CountRow;

fn parse_status(s: &str) -> Result<DocumentStatus, DbError> {
    match s {
        "Draft" => Ok(DocumentStatus::Draft),
        "Published" => Ok(DocumentStatus::Published),
        "Archived" => Ok(DocumentStatus::Archived),
        other => Err(DbError::Decode(format!("unknown document status: {other}"))),
    }
}

fn parse_uuid_list(values: Vec<String>, what: &str) -> Result<Vec<Uuid>, DbError> {
    values
        .iter()
        .map(|v| super::parse_uuid(v, what))
        .collect()
}

#[derive(Debug, SurrealValue)]
struct VersionRow {
    document_id: String,
    org_id: String,
    title: String,
    status: String,
    everyone: bool,
    tag_ids: Vec<String>,
    collection_ids: Vec<String>,
    department_ids: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct VersionRowWithId {
    record_id: String,
    document_id: String,
    org_id: String,
    title: String,
    status: String,
    everyone: bool,
    tag_ids: Vec<String>,
    collection_ids: Vec<String>,
    department_ids: Vec<String>,
    created_at: DateTime<Utc>,
}

impl VersionRowWithId {
    fn try_into_version(self) -> Result<DocumentVersion, DbError> {
        let id = super::parse_uuid(&self.record_id, "document_version")?;
        let document_id = super::parse_uuid(&self.document_id, "document")?;
        let org_id = super::parse_uuid(&self.org_id, "organization")?;
        Ok(DocumentVersion {
            id,
            document_id,
            org_id,
            title: self.title,
            status: parse_status(&self.status)?,
            everyone: self.everyone,
            tag_ids: parse_uuid_list(self.tag_ids, "tag")?,
            collection_ids: parse_uuid_list(self.collection_ids, "collection")?,
            department_ids: parse_uuid_list(self.department_ids, "department")?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the DocumentVersion repository.
#[derive(Clone)]
pub struct SurrealDocumentVersionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentVersionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DocumentVersionRepository for SurrealDocumentVersionRepository<C> {
    async fn append(&self, input: CreateDocumentVersion) -> TesseraResult<DocumentVersion> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let document_id = input.document_id;
        let org_id = input.org_id;

        let tag_ids: Vec<String> = input.tag_ids.iter().map(Uuid::to_string).collect();
        let collection_ids: Vec<String> =
            input.collection_ids.iter().map(Uuid::to_string).collect();
        let department_ids: Vec<String> =
            input.department_ids.iter().map(Uuid::to_string).collect();

        let result = self
            .db
            .query(
                "CREATE type::record('document_version', $id) SET \
                 document_id = $document_id, org_id = $org_id, \
                 title = $title, status = $status, everyone = $everyone, \
                 tag_ids = $tag_ids, collection_ids = $collection_ids, \
                 department_ids = $department_ids",
            )
            .bind(("id", id_str.clone()))
            .bind(("document_id", document_id.to_string()))
            .bind(("org_id", org_id.to_string()))
            .bind(("title", input.title))
            .bind(("status", input.status.as_str()))
            .bind(("everyone", input.everyone))
            .bind(("tag_ids", tag_ids))
            .bind(("collection_ids", collection_ids))
            .bind(("department_ids", department_ids))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<VersionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document_version".into(),
            id: id_str,
        })?;

        Ok(DocumentVersion {
            id,
            document_id,
            org_id,
            title: row.title,
            status: parse_status(&row.status)?,
            everyone: row.everyone,
            tag_ids: parse_uuid_list(row.tag_ids, "tag")?,
            collection_ids: parse_uuid_list(row.collection_ids, "collection")?,
            department_ids: parse_uuid_list(row.department_ids, "department")?,
            created_at: row.created_at,
        })
    }

    async fn list_by_document(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        pagination: Pagination,
    ) -> TesseraResult<PaginatedResult<DocumentVersion>> {
        let doc_str = document_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM document_version \
                 WHERE document_id = $document_id \
                 AND org_id = $org_id GROUP ALL",
            )
            .bind(("document_id", doc_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document_version \
                 WHERE document_id = $document_id AND org_id = $org_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("document_id", doc_str))
            .bind(("org_id", org_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VersionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_version())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

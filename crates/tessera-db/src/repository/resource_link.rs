//! SurrealDB implementation of [`ResourceLinkRepository`].

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::resource_link::{CreateResourceLink, ResourceLink};
use tessera_core::repository::ResourceLinkRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ResourceLinkRow {
    document_id: String,
    title: String,
    url: String,
    note: String,
}

#[derive(Debug, SurrealValue)]
struct ResourceLinkRowWithId {
    record_id: String,
    document_id: String,
    title: String,
    url: String,
    note: String,
}

impl ResourceLinkRowWithId {
    fn try_into_resource_link(self) -> Result<ResourceLink, DbError> {
        let id = super::parse_uuid(&self.record_id, "resource_link")?;
        let document_id = super::parse_uuid(&self.document_id, "document")?;
        Ok(ResourceLink {
            id,
            document_id,
            title: self.title,
            url: self.url,
            note: self.note,
        })
    }
}

/// SurrealDB implementation of the ResourceLink repository.
#[derive(Clone)]
pub struct SurrealResourceLinkRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResourceLinkRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourceLinkRepository for SurrealResourceLinkRepository<C> {
    async fn create(&self, input: CreateResourceLink) -> TesseraResult<ResourceLink> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let document_id = input.document_id;

        let result = self
            .db
            .query(
                "CREATE type::record('resource_link', $id) SET \
                 document_id = $document_id, title = $title, \
                 url = $url, note = $note",
            )
            .bind(("id", id_str.clone()))
            .bind(("document_id", document_id.to_string()))
            .bind(("title", input.title))
            .bind(("url", input.url))
            .bind(("note", input.note))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ResourceLinkRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource_link".into(),
            id: id_str,
        })?;

        Ok(ResourceLink {
            id,
            document_id,
            title: row.title,
            url: row.url,
            note: row.note,
        })
    }

    async fn delete(&self, document_id: Uuid, id: Uuid) -> TesseraResult<()> {
        self.db
            .query(
                "DELETE type::record('resource_link', $id) \
                 WHERE document_id = $document_id",
            )
            .bind(("id", id.to_string()))
            .bind(("document_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_document(&self, document_id: Uuid) -> TesseraResult<Vec<ResourceLink>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource_link \
                 WHERE document_id = $document_id \
                 ORDER BY title ASC",
            )
            .bind(("document_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceLinkRowWithId> = result.take(0).map_err(DbError::from)?;

        let links = rows
            .into_iter()
            .map(|row| row.try_into_resource_link())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(links)
    }
}

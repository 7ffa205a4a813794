//! SurrealDB implementation of [`SectionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::section::{CreateSection, Section, UpdateSection};
use tessera_core::repository::SectionRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SectionRow {
    document_id: String,
    header: String,
    body_md: String,
    position: u32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SectionRowWithId {
    record_id: String,
    document_id: String,
    header: String,
    body_md: String,
    position: u32,
    created_at: DateTime<Utc>,
}

impl SectionRowWithId {
    fn try_into_section(self) -> Result<Section, DbError> {
        let id = super::parse_uuid(&self.record_id, "section")?;
        let document_id = super::parse_uuid(&self.document_id, "document")?;
        Ok(Section {
            id,
            document_id,
            header: self.header,
            body_md: self.body_md,
            order: self.position,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Section repository.
#[derive(Clone)]
pub struct SurrealSectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SectionRepository for SurrealSectionRepository<C> {
    async fn create(&self, input: CreateSection) -> TesseraResult<Section> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let document_id = input.document_id;

        let result = self
            .db
            .query(
                "CREATE type::record('section', $id) SET \
                 document_id = $document_id, header = $header, \
                 body_md = $body_md, position = $position",
            )
            .bind(("id", id_str.clone()))
            .bind(("document_id", document_id.to_string()))
            .bind(("header", input.header))
            .bind(("body_md", input.body_md))
            .bind(("position", input.order))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "section".into(),
            id: id_str,
        })?;

        Ok(Section {
            id,
            document_id,
            header: row.header,
            body_md: row.body_md,
            order: row.position,
            created_at: row.created_at,
        })
    }

    async fn update(
        &self,
        document_id: Uuid,
        id: Uuid,
        input: UpdateSection,
    ) -> TesseraResult<Section> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.header.is_some() {
            sets.push("header = $header");
        }
        if input.body_md.is_some() {
            sets.push("body_md = $body_md");
        }
        if input.order.is_some() {
            sets.push("position = $position");
        }

        if sets.is_empty() {
            let sections = self.list_by_document(document_id).await?;
            return sections
                .into_iter()
                .find(|s| s.id == id)
                .ok_or_else(|| {
                    DbError::NotFound {
                        entity: "section".into(),
                        id: id_str,
                    }
                    .into()
                });
        }

        let query = format!(
            "UPDATE type::record('section', $id) SET {} \
             WHERE document_id = $document_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("document_id", document_id.to_string()));

        if let Some(header) = input.header {
            builder = builder.bind(("header", header));
        }
        if let Some(body_md) = input.body_md {
            builder = builder.bind(("body_md", body_md));
        }
        if let Some(order) = input.order {
            builder = builder.bind(("position", order));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "section".into(),
            id: id_str,
        })?;

        Ok(Section {
            id,
            document_id,
            header: row.header,
            body_md: row.body_md,
            order: row.position,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, document_id: Uuid, id: Uuid) -> TesseraResult<()> {
        self.db
            .query(
                "DELETE type::record('section', $id) \
                 WHERE document_id = $document_id",
            )
            .bind(("id", id.to_string()))
            .bind(("document_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_document(&self, document_id: Uuid) -> TesseraResult<Vec<Section>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM section \
                 WHERE document_id = $document_id \
                 ORDER BY position ASC, id ASC",
            )
            .bind(("document_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SectionRowWithId> = result.take(0).map_err(DbError::from)?;

        let sections = rows
            .into_iter()
            .map(|row| row.try_into_section())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sections)
    }

    async fn reorder(&self, document_id: Uuid, ordered_ids: &[Uuid]) -> TesseraResult<()> {
        // Listed ids take positions 0..n in order; unlisted sections are
        // pushed after them, keeping their previous relative order.
        let existing = self.list_by_document(document_id).await?;

        let mut position: u32 = 0;
        for id in ordered_ids {
            if !existing.iter().any(|s| s.id == *id) {
                continue;
            }
            self.db
                .query(
                    "UPDATE type::record('section', $id) \
                     SET position = $position \
                     WHERE document_id = $document_id",
                )
                .bind(("id", id.to_string()))
                .bind(("position", position))
                .bind(("document_id", document_id.to_string()))
                .await
                .map_err(DbError::from)?;
            position += 1;
        }

        for section in &existing {
            if ordered_ids.contains(&section.id) {
                continue;
            }
            self.db
                .query(
                    "UPDATE type::record('section', $id) \
                     SET position = $position \
                     WHERE document_id = $document_id",
                )
                .bind(("id", section.id.to_string()))
                .bind(("position", position))
                .bind(("document_id", document_id.to_string()))
                .await
                .map_err(DbError::from)?;
            position += 1;
        }

        Ok(())
    }
}

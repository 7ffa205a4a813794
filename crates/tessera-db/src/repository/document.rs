//! SurrealDB implementation of [`DocumentRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::collection::MembershipDelta;
use tessera_core::models::document::{CreateDocument, Document, DocumentStatus, UpdateDocument};
use tessera_core::models::tag::Tag;
use tessera_core::repository::{DocumentRepository, PaginatedResult, Pagination};
use tessera_core::slugify;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::tag::TagRowWithId;
use crate::repository::{CountRow, IdRow};

fn parse_status(s: &str) -> Result<DocumentStatus, DbError> {
    match s {
        "Draft" => Ok(DocumentStatus::Draft),
        "Published" => Ok(DocumentStatus::Published),
        "Archived" => Ok(DocumentStatus::Archived),
        other => Err(DbError::Decode(format!("unknown document status: {other}"))),
    }
}

#[derive(Debug, SurrealValue)]
struct DocumentRow {
    org_id: String,
    title: String,
    slug: String,
    status: String,
    everyone: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    org_id: String,
    title: String,
    slug: String,
    status: String,
    everyone: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRowWithId {
    fn try_into_document(self) -> Result<Document, DbError> {
        let id = super::parse_uuid(&self.record_id, "document")?;
        let org_id = super::parse_uuid(&self.org_id, "organization")?;
        Ok(Document {
            id,
            org_id,
            title: self.title,
            slug: self.slug,
            status: parse_status(&self.status)?,
            everyone: self.everyone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Document repository.
#[derive(Clone)]
pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Verify a document exists within the given org.
    async fn check_document(&self, org_id: Uuid, document_id: Uuid) -> Result<(), DbError> {
        let id_str = document_id.to_string();
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM document \
                 WHERE id = type::record('document', $id) \
                 AND org_id = $org_id GROUP ALL",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await?;
        let rows: Vec<CountRow> = check.take(0)?;
        if rows.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::NotFound {
                entity: "document".into(),
                id: id_str,
            });
        }
        Ok(())
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn create(&self, input: CreateDocument) -> TesseraResult<Document> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let org_id = input.org_id;
        let slug = input.slug.unwrap_or_else(|| slugify(&input.title));

        let result = self
            .db
            .query(
                "CREATE type::record('document', $id) SET \
                 org_id = $org_id, title = $title, slug = $slug, \
                 status = $status, everyone = $everyone",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .bind(("title", input.title))
            .bind(("slug", slug))
            .bind(("status", input.status.as_str()))
            .bind(("everyone", input.everyone))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(Document {
            id,
            org_id,
            title: row.title,
            slug: row.slug,
            status: parse_status(&row.status)?,
            everyone: row.everyone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> TesseraResult<Document> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('document', $id) \
                 WHERE org_id = $org_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(Document {
            id,
            org_id,
            title: row.title,
            slug: row.slug,
            status: parse_status(&row.status)?,
            everyone: row.everyone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn update(&self, org_id: Uuid, id: Uuid, input: UpdateDocument) -> TesseraResult<Document> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.everyone.is_some() {
            sets.push("everyone = $everyone");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('document', $id) SET {} \
             WHERE org_id = $org_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(everyone) = input.everyone {
            builder = builder.bind(("everyone", everyone));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(Document {
            id,
            org_id,
            title: row.title,
            slug: row.slug,
            status: parse_status(&row.status)?,
            everyone: row.everyone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn delete(&self, org_id: Uuid, id: Uuid) -> TesseraResult<()> {
        let id_str = id.to_string();

        // Drop every edge and child row, then the document itself.
        self.db
            .query(
                "DELETE in_department WHERE \
                 in = type::record('document', $id); \
                 DELETE includes WHERE out = type::record('document', $id); \
                 DELETE tagged_with WHERE \
                 in = type::record('document', $id); \
                 DELETE section WHERE document_id = $id; \
                 DELETE resource_link WHERE document_id = $id; \
                 DELETE type::record('document', $id) \
                 WHERE org_id = $org_id;",
            )
            .bind(("id", id_str))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> TesseraResult<PaginatedResult<Document>> {
        let org_id_str = org_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM document \
                 WHERE org_id = $org_id GROUP ALL",
            )
            .bind(("org_id", org_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document \
                 WHERE org_id = $org_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("org_id", org_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_document())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn add_department(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        department_id: Uuid,
    ) -> TesseraResult<()> {
        let doc_str = document_id.to_string();
        let dept_str = department_id.to_string();

        // Verify both ends exist within the same org.
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM document \
                 WHERE id = type::record('document', $doc_id) \
                 AND org_id = $org_id GROUP ALL; \
                 SELECT count() AS total FROM department \
                 WHERE id = type::record('department', $dept_id) \
                 AND org_id = $org_id GROUP ALL;",
            )
            .bind(("doc_id", doc_str.clone()))
            .bind(("dept_id", dept_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let doc_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if doc_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::NotFound {
                entity: "document".into(),
                id: doc_str,
            }
            .into());
        }

        let dept_count: Vec<CountRow> = check.take(1).map_err(DbError::from)?;
        if dept_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::NotFound {
                entity: "department".into(),
                id: dept_str,
            }
            .into());
        }

        // Delete-then-relate keeps the edge unique under repeats.
        let query = format!(
            "DELETE in_department WHERE in = document:`{doc_str}` \
             AND out = department:`{dept_str}`; \
             RELATE document:`{doc_str}` -> in_department -> \
             department:`{dept_str}`;"
        );

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn remove_department(
        &self,
        _org_id: Uuid,
        document_id: Uuid,
        department_id: Uuid,
    ) -> TesseraResult<()> {
        self.db
            .query(
                "DELETE in_department WHERE \
                 in = type::record('document', $doc_id) AND \
                 out = type::record('department', $dept_id)",
            )
            .bind(("doc_id", document_id.to_string()))
            .bind(("dept_id", department_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn set_departments(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        department_ids: &[Uuid],
    ) -> TesseraResult<MembershipDelta> {
        let current = self.department_ids(org_id, document_id).await?;

        let added: Vec<Uuid> = department_ids
            .iter()
            .filter(|id| !current.contains(id))
            .copied()
            .collect();
        let removed: Vec<Uuid> = current
            .iter()
            .filter(|id| !department_ids.contains(id))
            .copied()
            .collect();

        for dept_id in &removed {
            self.remove_department(org_id, document_id, *dept_id).await?;
        }
        for dept_id in &added {
            self.add_department(org_id, document_id, *dept_id).await?;
        }

        Ok(MembershipDelta { added, removed })
    }

    async fn department_ids(&self, org_id: Uuid, document_id: Uuid) -> TesseraResult<Vec<Uuid>> {
        self.check_document(org_id, document_id).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(out) AS record_id FROM in_department \
                 WHERE in = type::record('document', $doc_id)",
            )
            .bind(("doc_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        Ok(super::parse_id_rows(rows, "department")?)
    }

    async fn tags(&self, org_id: Uuid, document_id: Uuid) -> TesseraResult<Vec<Tag>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE org_id = $org_id \
                 AND id IN (\
                     SELECT VALUE out FROM tagged_with \
                     WHERE in = type::record('document', $doc_id)\
                 )",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("doc_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;

        let tags = rows
            .into_iter()
            .map(|row| row.try_into_tag())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tags)
    }

    async fn attach_tag(&self, org_id: Uuid, document_id: Uuid, tag_id: Uuid) -> TesseraResult<()> {
        let doc_str = document_id.to_string();
        let tag_str = tag_id.to_string();

        // Verify both ends exist within the same org.
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM document \
                 WHERE id = type::record('document', $doc_id) \
                 AND org_id = $org_id GROUP ALL; \
                 SELECT count() AS total FROM tag \
                 WHERE id = type::record('tag', $tag_id) \
                 AND org_id = $org_id GROUP ALL;",
            )
            .bind(("doc_id", doc_str.clone()))
            .bind(("tag_id", tag_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let doc_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if doc_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::NotFound {
                entity: "document".into(),
                id: doc_str,
            }
            .into());
        }

        let tag_count: Vec<CountRow> = check.take(1).map_err(DbError::from)?;
        if tag_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::NotFound {
                entity: "tag".into(),
                id: tag_str,
            }
            .into());
        }

        let query = format!(
            "DELETE tagged_with WHERE in = document:`{doc_str}` \
             AND out = tag:`{tag_str}`; \
             RELATE document:`{doc_str}` -> tagged_with -> tag:`{tag_str}`;"
        );

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn detach_tag(&self, _org_id: Uuid, document_id: Uuid, tag_id: Uuid) -> TesseraResult<()> {
        self.db
            .query(
                "DELETE tagged_with WHERE \
                 in = type::record('document', $doc_id) AND \
                 out = type::record('tag', $tag_id)",
            )
            .bind(("doc_id", document_id.to_string()))
            .bind(("tag_id", tag_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn ids_by_department(
        &self,
        _org_id: Uuid,
        department_id: Uuid,
    ) -> TesseraResult<Vec<Uuid>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(in) AS record_id FROM in_department \
                 WHERE out = type::record('department', $dept_id)",
            )
            .bind(("dept_id", department_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        Ok(super::parse_id_rows(rows, "document")?)
    }
}

//! SurrealDB implementation of [`CollectionRepository`].
//!
//! Two edge tables hang off collections: `includes` (collection ->
//! document membership) and `nests` (parent -> child nesting). The
//! nesting edges are persisted blindly here; acyclicity is the caller's
//! responsibility and is enforced one layer up.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::collection::{
    Collection, CreateCollection, MembershipDelta, UpdateCollection,
};
use tessera_core::repository::{CollectionRepository, PaginatedResult, Pagination};
use tessera_core::slugify;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, IdRow};

#[derive(Debug, SurrealValue)]
struct CollectionRow {
    org_id: String,
    name: String,
    slug: String,
    description: String,
    position: u32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CollectionRowWithId {
    record_id: String,
    org_id: String,
    name: String,
    slug: String,
    description: String,
    position: u32,
    created_at: DateTime<Utc>,
}

impl CollectionRowWithId {
    fn try_into_collection(self) -> Result<Collection, DbError> {
        let id = super::parse_uuid(&self.record_id, "collection")?;
        let org_id = super::parse_uuid(&self.org_id, "organization")?;
        Ok(Collection {
            id,
            org_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            order: self.position,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Collection repository.
#[derive(Clone)]
pub struct SurrealCollectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCollectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Verify a record of `table` exists within the given org.
    async fn check_in_org(
        &self,
        org_id: Uuid,
        table: &'static str,
        id: Uuid,
    ) -> Result<(), DbError> {
        let id_str = id.to_string();
        let mut check = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {table} \
                 WHERE id = type::record('{table}', $id) \
                 AND org_id = $org_id GROUP ALL"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await?;
        let rows: Vec<CountRow> = check.take(0)?;
        if rows.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::NotFound {
                entity: table.into(),
                id: id_str,
            });
        }
        Ok(())
    }
}

impl<C: Connection> CollectionRepository for SurrealCollectionRepository<C> {
    async fn create(&self, input: CreateCollection) -> TesseraResult<Collection> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let org_id = input.org_id;
        let slug = input.slug.unwrap_or_else(|| slugify(&input.name));

        let result = self
            .db
            .query(
                "CREATE type::record('collection', $id) SET \
                 org_id = $org_id, name = $name, slug = $slug, \
                 description = $description, position = $position",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .bind(("name", input.name))
            .bind(("slug", slug))
            .bind(("description", input.description))
            .bind(("position", input.order))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let err = DbError::Surreal(e);
            if err.is_duplicate() {
                TesseraError::AlreadyExists {
                    entity: "collection".into(),
                }
            } else {
                TesseraError::from(err)
            }
        })?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "collection".into(),
            id: id_str,
        })?;

        Ok(Collection {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            order: row.position,
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> TesseraResult<Collection> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('collection', $id) \
                 WHERE org_id = $org_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "collection".into(),
            id: id_str,
        })?;

        Ok(Collection {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            order: row.position,
            created_at: row.created_at,
        })
    }

    async fn get_by_slug(&self, org_id: Uuid, slug: &str) -> TesseraResult<Collection> {
        let slug = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM collection \
                 WHERE org_id = $org_id AND slug = $slug",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("slug", slug.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "collection".into(),
            id: slug,
        })?;

        Ok(row.try_into_collection()?)
    }

    async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateCollection,
    ) -> TesseraResult<Collection> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.order.is_some() {
            sets.push("position = $position");
        }

        if sets.is_empty() {
            return self.get_by_id(org_id, id).await;
        }

        let query = format!(
            "UPDATE type::record('collection', $id) SET {} \
             WHERE org_id = $org_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(order) = input.order {
            builder = builder.bind(("position", order));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "collection".into(),
            id: id_str,
        })?;

        Ok(Collection {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            order: row.position,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, org_id: Uuid, id: Uuid) -> TesseraResult<()> {
        let id_str = id.to_string();

        // Drop membership and nesting edges on both sides, demote the
        // structural tag to a manual one, then delete the row.
        self.db
            .query(
                "DELETE includes WHERE in = type::record('collection', $id); \
                 DELETE nests WHERE \
                 in = type::record('collection', $id) OR \
                 out = type::record('collection', $id); \
                 UPDATE tag SET link_kind = 'none', link_ref = NONE \
                 WHERE org_id = $org_id \
                 AND link_kind = 'collection' AND link_ref = $id; \
                 DELETE type::record('collection', $id) \
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
    ) -> TesseraResult<PaginatedResult<Collection>> {
        let org_id_str = org_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM collection \
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
                "SELECT meta::id(id) AS record_id, * FROM collection \
                 WHERE org_id = $org_id \
                 ORDER BY position ASC, name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("org_id", org_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_collection())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn add_document(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_id: Uuid,
    ) -> TesseraResult<()> {
        self.check_in_org(org_id, "collection", collection_id).await?;
        self.check_in_org(org_id, "document", document_id).await?;

        let coll_str = collection_id.to_string();
        let doc_str = document_id.to_string();

        // Delete-then-relate keeps the edge unique under repeats.
        let query = format!(
            "DELETE includes WHERE in = collection:`{coll_str}` \
             AND out = document:`{doc_str}`; \
             RELATE collection:`{coll_str}` -> includes -> \
             document:`{doc_str}`;"
        );

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn remove_document(
        &self,
        _org_id: Uuid,
        collection_id: Uuid,
        document_id: Uuid,
    ) -> TesseraResult<()> {
        self.db
            .query(
                "DELETE includes WHERE \
                 in = type::record('collection', $coll_id) AND \
                 out = type::record('document', $doc_id)",
            )
            .bind(("coll_id", collection_id.to_string()))
            .bind(("doc_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn set_documents(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_ids: &[Uuid],
    ) -> TesseraResult<MembershipDelta> {
        let current = self.document_ids(org_id, collection_id).await?;

        let added: Vec<Uuid> = document_ids
            .iter()
            .filter(|id| !current.contains(id))
            .copied()
            .collect();
        let removed: Vec<Uuid> = current
            .iter()
            .filter(|id| !document_ids.contains(id))
            .copied()
            .collect();

        for doc_id in &removed {
            self.remove_document(org_id, collection_id, *doc_id).await?;
        }
        for doc_id in &added {
            self.add_document(org_id, collection_id, *doc_id).await?;
        }

        Ok(MembershipDelta { added, removed })
    }

    async fn document_ids(&self, org_id: Uuid, collection_id: Uuid) -> TesseraResult<Vec<Uuid>> {
        self.check_in_org(org_id, "collection", collection_id).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(out) AS record_id FROM includes \
                 WHERE in = type::record('collection', $coll_id)",
            )
            .bind(("coll_id", collection_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        Ok(super::parse_id_rows(rows, "document")?)
    }

    async fn collection_ids_of_document(
        &self,
        _org_id: Uuid,
        document_id: Uuid,
    ) -> TesseraResult<Vec<Uuid>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(in) AS record_id FROM includes \
                 WHERE out = type::record('document', $doc_id)",
            )
            .bind(("doc_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        Ok(super::parse_id_rows(rows, "collection")?)
    }

    async fn add_subcollection(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> TesseraResult<()> {
        self.check_in_org(org_id, "collection", parent_id).await?;
        self.check_in_org(org_id, "collection", child_id).await?;

        let parent_str = parent_id.to_string();
        let child_str = child_id.to_string();

        let query = format!(
            "DELETE nests WHERE in = collection:`{parent_str}` \
             AND out = collection:`{child_str}`; \
             RELATE collection:`{parent_str}` -> nests -> \
             collection:`{child_str}`;"
        );

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn remove_subcollection(
        &self,
        _org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> TesseraResult<()> {
        self.db
            .query(
                "DELETE nests WHERE \
                 in = type::record('collection', $parent_id) AND \
                 out = type::record('collection', $child_id)",
            )
            .bind(("parent_id", parent_id.to_string()))
            .bind(("child_id", child_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn replace_subcollections(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_ids: &[Uuid],
    ) -> TesseraResult<()> {
        let current = self.subcollection_ids(org_id, parent_id).await?;

        for child_id in &current {
            if !child_ids.contains(child_id) {
                self.remove_subcollection(org_id, parent_id, *child_id)
                    .await?;
            }
        }
        for child_id in child_ids {
            if !current.contains(child_id) {
                self.add_subcollection(org_id, parent_id, *child_id).await?;
            }
        }

        Ok(())
    }

    async fn subcollection_ids(&self, org_id: Uuid, collection_id: Uuid) -> TesseraResult<Vec<Uuid>> {
        self.check_in_org(org_id, "collection", collection_id).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(out) AS record_id FROM nests \
                 WHERE in = type::record('collection', $coll_id)",
            )
            .bind(("coll_id", collection_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        Ok(super::parse_id_rows(rows, "collection")?)
    }
}

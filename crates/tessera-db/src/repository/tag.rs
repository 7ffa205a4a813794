//! SurrealDB implementation of [`TagRepository`].
//!
//! The [`TagLink`] variant is stored as a `link_kind` discriminator
//! column plus an optional `link_ref` payload (a UUID string for entity
//! links, the URL itself for URL links).

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::tag::{CreateTag, Tag, TagLink, UpdateTag};
use tessera_core::repository::{PaginatedResult, Pagination, TagRepository};
use tessera_core::slugify;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::CountRow;

pub(crate) fn link_to_columns(link: &TagLink) -> (&'static str, Option<String>) {
    match link {
        TagLink::None => ("none", None),
        TagLink::Department(id) => ("department", Some(id.to_string())),
        TagLink::Collection(id) => ("collection", Some(id.to_string())),
        TagLink::Document(id) => ("document", Some(id.to_string())),
        TagLink::Url(url) => ("url", Some(url.clone())),
    }
}

pub(crate) fn link_from_columns(
    kind: &str,
    link_ref: Option<String>,
) -> Result<TagLink, DbError> {
    let missing = || DbError::Decode(format!("tag link_kind '{kind}' without link_ref"));
    match kind {
        "none" => Ok(TagLink::None),
        "department" => {
            let r = link_ref.ok_or_else(missing)?;
            Ok(TagLink::Department(super::parse_uuid(&r, "department")?))
        }
        "collection" => {
            let r = link_ref.ok_or_else(missing)?;
            Ok(TagLink::Collection(super::parse_uuid(&r, "collection")?))
        }
        "document" => {
            let r = link_ref.ok_or_else(missing)?;
            Ok(TagLink::Document(super::parse_uuid(&r, "document")?))
        }
        "url" => Ok(TagLink::Url(link_ref.ok_or_else(missing)?)),
        other => Err(DbError::Decode(format!("unknown tag link_kind: {other}"))),
    }
}

#[derive(Debug, SurrealValue)]
struct TagRow {
    org_id: String,
    name: String,
    slug: String,
    description: String,
    link_kind: String,
    link_ref: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct TagRowWithId {
    record_id: String,
    org_id: String,
    name: String,
    slug: String,
    description: String,
    link_kind: String,
    link_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl TagRowWithId {
    pub(crate) fn try_into_tag(self) -> Result<Tag, DbError> {
        let id = super::parse_uuid(&self.record_id, "tag")?;
        let org_id = super::parse_uuid(&self.org_id, "organization")?;
        Ok(Tag {
            id,
            org_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            link: link_from_columns(&self.link_kind, self.link_ref)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Tag repository.
#[derive(Clone)]
pub struct SurrealTagRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTagRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Entity links must resolve within the tag's own organization.
    async fn check_link_target(&self, org_id: Uuid, link: &TagLink) -> TesseraResult<()> {
        let (table, target_id) = match link {
            TagLink::Department(id) => ("department", id),
            TagLink::Collection(id) => ("collection", id),
            TagLink::Document(id) => ("document", id),
            TagLink::None | TagLink::Url(_) => return Ok(()),
        };

        let mut check = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {table} \
                 WHERE id = type::record('{table}', $id) \
                 AND org_id = $org_id GROUP ALL"
            ))
            .bind(("id", target_id.to_string()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(TesseraError::CrossOrg {
                entity: table.into(),
            });
        }
        Ok(())
    }
}

impl<C: Connection> TagRepository for SurrealTagRepository<C> {
    async fn create(&self, input: CreateTag) -> TesseraResult<Tag> {
        self.check_link_target(input.org_id, &input.link).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let org_id = input.org_id;
        let slug = input.slug.unwrap_or_else(|| slugify(&input.name));
        let (link_kind, link_ref) = link_to_columns(&input.link);

        let result = self
            .db
            .query(
                "CREATE type::record('tag', $id) SET \
                 org_id = $org_id, name = $name, slug = $slug, \
                 description = $description, \
                 link_kind = $link_kind, link_ref = $link_ref",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .bind(("name", input.name))
            .bind(("slug", slug))
            .bind(("description", input.description))
            .bind(("link_kind", link_kind))
            .bind(("link_ref", link_ref))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let err = DbError::Surreal(e);
            if err.is_duplicate() {
                TesseraError::AlreadyExists {
                    entity: "tag".into(),
                }
            } else {
                TesseraError::from(err)
            }
        })?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(Tag {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            link: link_from_columns(&row.link_kind, row.link_ref)?,
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> TesseraResult<Tag> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('tag', $id) \
                 WHERE org_id = $org_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(Tag {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            link: link_from_columns(&row.link_kind, row.link_ref)?,
            created_at: row.created_at,
        })
    }

    async fn get_by_slug(&self, org_id: Uuid, slug: &str) -> TesseraResult<Tag> {
        let slug = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE org_id = $org_id AND slug = $slug",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("slug", slug.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: slug,
        })?;

        Ok(row.try_into_tag()?)
    }

    async fn update(&self, org_id: Uuid, id: Uuid, input: UpdateTag) -> TesseraResult<Tag> {
        if let Some(link) = &input.link {
            self.check_link_target(org_id, link).await?;
        }

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
        if input.link.is_some() {
            sets.push("link_kind = $link_kind");
            sets.push("link_ref = $link_ref");
        }

        if sets.is_empty() {
            return self.get_by_id(org_id, id).await;
        }

        let query = format!(
            "UPDATE type::record('tag', $id) SET {} \
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
        if let Some(link) = input.link {
            let (link_kind, link_ref) = link_to_columns(&link);
            builder = builder
                .bind(("link_kind", link_kind))
                .bind(("link_ref", link_ref));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(Tag {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            link: link_from_columns(&row.link_kind, row.link_ref)?,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, org_id: Uuid, id: Uuid) -> TesseraResult<()> {
        let id_str = id.to_string();

        // Drop attachment edges first, then the tag record.
        self.db
            .query(
                "DELETE tagged_with WHERE out = type::record('tag', $id); \
                 DELETE type::record('tag', $id) WHERE org_id = $org_id;",
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
    ) -> TesseraResult<PaginatedResult<Tag>> {
        let org_id_str = org_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM tag \
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
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE org_id = $org_id \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("org_id", org_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tag())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_by_link(&self, org_id: Uuid, link: &TagLink) -> TesseraResult<Option<Tag>> {
        let (link_kind, link_ref) = link_to_columns(link);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE org_id = $org_id \
                 AND link_kind = $link_kind AND link_ref = $link_ref \
                 LIMIT 1",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("link_kind", link_kind))
            .bind(("link_ref", link_ref))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_tag()?)),
            None => Ok(None),
        }
    }

    async fn find_structural(
        &self,
        org_id: Uuid,
        department_ids: &[Uuid],
        collection_ids: &[Uuid],
    ) -> TesseraResult<Vec<Tag>> {
        if department_ids.is_empty() && collection_ids.is_empty() {
            return Ok(Vec::new());
        }

        let dept_refs: Vec<String> = department_ids.iter().map(Uuid::to_string).collect();
        let coll_refs: Vec<String> = collection_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE org_id = $org_id AND (\
                     (link_kind = 'department' AND link_ref IN $dept_refs) \
                     OR \
                     (link_kind = 'collection' AND link_ref IN $coll_refs)\
                 )",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("dept_refs", dept_refs))
            .bind(("coll_refs", coll_refs))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;

        let tags = rows
            .into_iter()
            .map(|row| row.try_into_tag())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_columns_round_trip() {
        let dept = Uuid::new_v4();
        let (kind, link_ref) = link_to_columns(&TagLink::Department(dept));
        assert_eq!(kind, "department");
        assert_eq!(
            link_from_columns(kind, link_ref).unwrap(),
            TagLink::Department(dept)
        );

        let (kind, link_ref) = link_to_columns(&TagLink::None);
        assert_eq!(kind, "none");
        assert!(link_ref.is_none());
        assert_eq!(link_from_columns(kind, None).unwrap(), TagLink::None);
    }

    #[test]
    fn link_without_ref_is_rejected() {
        assert!(link_from_columns("collection", None).is_err());
        assert!(link_from_columns("bogus", None).is_err());
    }
}

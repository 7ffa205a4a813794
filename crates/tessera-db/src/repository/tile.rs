//! SurrealDB implementation of [`TileRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::tile::{CreateTile, Tile, TileKind, UpdateTile};
use tessera_core::repository::TileRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::CountRow;

fn parse_kind(s: &str) -> Result<TileKind, DbError> {
    match s {
        "Document" => Ok(TileKind::Document),
        "Department" => Ok(TileKind::Department),
        "Collection" => Ok(TileKind::Collection),
        "Url" => Ok(TileKind::Url),
        other => Err(DbError::Decode(format!("unknown tile kind: {other}"))),
    }
}

fn parse_opt_uuid(value: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    value
        .map(|v| super::parse_uuid(&v, what))
        .transpose()
}

#[derive(Debug, SurrealValue)]
struct TileRow {
    org_id: String,
    title: String,
    kind: String,
    position: u32,
    is_active: bool,
    document_id: Option<String>,
    department_id: Option<String>,
    collection_id: Option<String>,
    href: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TileRowWithId {
    record_id: String,
    org_id: String,
    title: String,
    kind: String,
    position: u32,
    is_active: bool,
    document_id: Option<String>,
    department_id: Option<String>,
    collection_id: Option<String>,
    href: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl TileRowWithId {
    fn try_into_tile(self) -> Result<Tile, DbError> {
        let id = super::parse_uuid(&self.record_id, "tile")?;
        let org_id = super::parse_uuid(&self.org_id, "organization")?;
        Ok(Tile {
            id,
            org_id,
            title: self.title,
            kind: parse_kind(&self.kind)?,
            order: self.position,
            is_active: self.is_active,
            document_id: parse_opt_uuid(self.document_id, "document")?,
            department_id: parse_opt_uuid(self.department_id, "department")?,
            collection_id: parse_opt_uuid(self.collection_id, "collection")?,
            href: self.href,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Tile repository.
#[derive(Clone)]
pub struct SurrealTileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// The tile's target record must exist within the tile's own org.
    async fn check_target(
        &self,
        org_id: Uuid,
        table: &'static str,
        id: Uuid,
    ) -> TesseraResult<()> {
        let mut check = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {table} \
                 WHERE id = type::record('{table}', $id) \
                 AND org_id = $org_id GROUP ALL"
            ))
            .bind(("id", id.to_string()))
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

impl<C: Connection> TileRepository for SurrealTileRepository<C> {
    async fn create(&self, input: CreateTile) -> TesseraResult<Tile> {
        input.validate_target()?;

        let org_id = input.org_id;
        match input.kind {
            TileKind::Document => {
                if let Some(doc_id) = input.document_id {
                    self.check_target(org_id, "document", doc_id).await?;
                }
            }
            TileKind::Department => {
                if let Some(dept_id) = input.department_id {
                    self.check_target(org_id, "department", dept_id).await?;
                }
            }
            TileKind::Collection => {
                if let Some(coll_id) = input.collection_id {
                    self.check_target(org_id, "collection", coll_id).await?;
                }
            }
            TileKind::Url => {}
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tile', $id) SET \
                 org_id = $org_id, title = $title, kind = $kind, \
                 position = $position, is_active = $is_active, \
                 document_id = $document_id, \
                 department_id = $department_id, \
                 collection_id = $collection_id, \
                 href = $href, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .bind(("title", input.title))
            .bind(("kind", input.kind.as_str()))
            .bind(("position", input.order))
            .bind(("is_active", input.is_active))
            .bind(("document_id", input.document_id.map(|v| v.to_string())))
            .bind(("department_id", input.department_id.map(|v| v.to_string())))
            .bind(("collection_id", input.collection_id.map(|v| v.to_string())))
            .bind(("href", input.href))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tile".into(),
            id: id_str.clone(),
        })?;

        Ok(Tile {
            id,
            org_id,
            title: row.title,
            kind: parse_kind(&row.kind)?,
            order: row.position,
            is_active: row.is_active,
            document_id: parse_opt_uuid(row.document_id, "document")?,
            department_id: parse_opt_uuid(row.department_id, "department")?,
            collection_id: parse_opt_uuid(row.collection_id, "collection")?,
            href: row.href,
            description: row.description,
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> TesseraResult<Tile> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('tile', $id) \
                 WHERE org_id = $org_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tile".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tile()?)
    }

    async fn update(&self, org_id: Uuid, id: Uuid, input: UpdateTile) -> TesseraResult<Tile> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.order.is_some() {
            sets.push("position = $position");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }

        if sets.is_empty() {
            return self.get_by_id(org_id, id).await;
        }

        let query = format!(
            "UPDATE type::record('tile', $id) SET {} \
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
        if let Some(order) = input.order {
            builder = builder.bind(("position", order));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tile".into(),
            id: id_str,
        })?;

        Ok(Tile {
            id,
            org_id,
            title: row.title,
            kind: parse_kind(&row.kind)?,
            order: row.position,
            is_active: row.is_active,
            document_id: parse_opt_uuid(row.document_id, "document")?,
            department_id: parse_opt_uuid(row.department_id, "department")?,
            collection_id: parse_opt_uuid(row.collection_id, "collection")?,
            href: row.href,
            description: row.description,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, org_id: Uuid, id: Uuid) -> TesseraResult<()> {
        self.db
            .query("DELETE type::record('tile', $id) WHERE org_id = $org_id")
            .bind(("id", id.to_string()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, org_id: Uuid) -> TesseraResult<Vec<Tile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tile \
                 WHERE org_id = $org_id \
                 ORDER BY is_active DESC, position ASC, title ASC",
            )
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TileRowWithId> = result.take(0).map_err(DbError::from)?;

        let tiles = rows
            .into_iter()
            .map(|row| row.try_into_tile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tiles)
    }
}

//! SurrealDB implementation of [`DepartmentRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::department::{CreateDepartment, Department, UpdateDepartment};
use tessera_core::repository::{DepartmentRepository, PaginatedResult, Pagination};
use tessera_core::slugify;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::CountRow;

#[derive(Debug, SurrealValue)]
struct DepartmentRow {
    org_id: String,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DepartmentRowWithId {
    record_id: String,
    org_id: String,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DepartmentRowWithId {
    fn try_into_department(self) -> Result<Department, DbError> {
        let id = super::parse_uuid(&self.record_id, "department")?;
        let org_id = super::parse_uuid(&self.org_id, "organization")?;
        Ok(Department {
            id,
            org_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Department repository.
#[derive(Clone)]
pub struct SurrealDepartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDepartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DepartmentRepository for SurrealDepartmentRepository<C> {
    async fn create(&self, input: CreateDepartment) -> TesseraResult<Department> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let org_id = input.org_id;
        let org_id_str = org_id.to_string();
        let slug = input.slug.unwrap_or_else(|| slugify(&input.name));

        let result = self
            .db
            .query(
                "CREATE type::record('department', $id) SET \
                 org_id = $org_id, name = $name, slug = $slug, \
                 description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id_str))
            .bind(("name", input.name))
            .bind(("slug", slug))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let err = DbError::Surreal(e);
            if err.is_duplicate() {
                TesseraError::AlreadyExists {
                    entity: "department".into(),
                }
            } else {
                TesseraError::from(err)
            }
        })?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id_str,
        })?;

        Ok(Department {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn get_by_id(&self, org_id: Uuid, id: Uuid) -> TesseraResult<Department> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('department', $id) \
                 WHERE org_id = $org_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id_str,
        })?;

        Ok(Department {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn get_by_slug(&self, org_id: Uuid, slug: &str) -> TesseraResult<Department> {
        let slug = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM department \
                 WHERE org_id = $org_id AND slug = $slug",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("slug", slug.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: slug,
        })?;

        Ok(row.try_into_department()?)
    }

    async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateDepartment,
    ) -> TesseraResult<Department> {
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
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('department', $id) SET {} \
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

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id_str,
        })?;

        Ok(Department {
            id,
            org_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn delete(&self, org_id: Uuid, id: Uuid) -> TesseraResult<()> {
        let id_str = id.to_string();

        // Drop membership edges, demote the structural tag to a manual
        // one, then delete the department record.
        self.db
            .query(
                "DELETE in_department WHERE \
                 out = type::record('department', $id); \
                 UPDATE tag SET link_kind = 'none', link_ref = NONE \
                 WHERE org_id = $org_id \
                 AND link_kind = 'department' AND link_ref = $id; \
                 DELETE type::record('department', $id) \
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
    ) -> TesseraResult<PaginatedResult<Department>> {
        let org_id_str = org_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM department \
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
                "SELECT meta::id(id) AS record_id, * FROM department \
                 WHERE org_id = $org_id \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("org_id", org_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_department())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

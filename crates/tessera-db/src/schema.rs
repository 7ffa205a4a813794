//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Display ordering columns are
//! named `position` because `order` is a SurrealQL keyword.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (global scope)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD slug ON TABLE organization TYPE string;
DEFINE FIELD metadata ON TABLE organization TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_slug ON TABLE organization \
    COLUMNS slug UNIQUE;

-- =======================================================================
-- Departments (org scope)
-- =======================================================================
DEFINE TABLE department SCHEMAFULL;
DEFINE FIELD org_id ON TABLE department TYPE string;
DEFINE FIELD name ON TABLE department TYPE string;
DEFINE FIELD slug ON TABLE department TYPE string;
DEFINE FIELD description ON TABLE department TYPE string;
DEFINE FIELD created_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_department_org_slug ON TABLE department \
    COLUMNS org_id, slug UNIQUE;

-- =======================================================================
-- Collections (org scope, may nest acyclically)
-- =======================================================================
DEFINE TABLE collection SCHEMAFULL;
DEFINE FIELD org_id ON TABLE collection TYPE string;
DEFINE FIELD name ON TABLE collection TYPE string;
DEFINE FIELD slug ON TABLE collection TYPE string;
DEFINE FIELD description ON TABLE collection TYPE string;
DEFINE FIELD position ON TABLE collection TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_collection_org_slug ON TABLE collection \
    COLUMNS org_id, slug UNIQUE;

-- =======================================================================
-- Documents (org scope)
-- =======================================================================
DEFINE TABLE document SCHEMAFULL;
DEFINE FIELD org_id ON TABLE document TYPE string;
DEFINE FIELD title ON TABLE document TYPE string;
DEFINE FIELD slug ON TABLE document TYPE string;
DEFINE FIELD status ON TABLE document TYPE string \
    ASSERT $value IN ['Draft', 'Published', 'Archived'];
DEFINE FIELD everyone ON TABLE document TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_document_org_slug ON TABLE document \
    COLUMNS org_id, slug;

-- =======================================================================
-- Tags (org scope)
-- =======================================================================
DEFINE TABLE tag SCHEMAFULL;
DEFINE FIELD org_id ON TABLE tag TYPE string;
DEFINE FIELD name ON TABLE tag TYPE string;
DEFINE FIELD slug ON TABLE tag TYPE string;
DEFINE FIELD description ON TABLE tag TYPE string;
DEFINE FIELD link_kind ON TABLE tag TYPE string \
    ASSERT $value IN ['none', 'department', 'collection', 'document', \
    'url'];
DEFINE FIELD link_ref ON TABLE tag TYPE option<string>;
DEFINE FIELD created_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tag_org_slug ON TABLE tag COLUMNS org_id, slug UNIQUE;
DEFINE INDEX idx_tag_org_link ON TABLE tag \
    COLUMNS org_id, link_kind, link_ref;

-- =======================================================================
-- Tiles (org scope, landing-page navigation)
-- =======================================================================
DEFINE TABLE tile SCHEMAFULL;
DEFINE FIELD org_id ON TABLE tile TYPE string;
DEFINE FIELD title ON TABLE tile TYPE string;
DEFINE FIELD kind ON TABLE tile TYPE string \
    ASSERT $value IN ['Document', 'Department', 'Collection', 'Url'];
DEFINE FIELD position ON TABLE tile TYPE int DEFAULT 0;
DEFINE FIELD is_active ON TABLE tile TYPE bool DEFAULT true;
DEFINE FIELD document_id ON TABLE tile TYPE option<string>;
DEFINE FIELD department_id ON TABLE tile TYPE option<string>;
DEFINE FIELD collection_id ON TABLE tile TYPE option<string>;
DEFINE FIELD href ON TABLE tile TYPE string DEFAULT '';
DEFINE FIELD description ON TABLE tile TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE tile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tile_org ON TABLE tile COLUMNS org_id;

-- =======================================================================
-- Sections (document scope, ordered content blocks)
-- =======================================================================
DEFINE TABLE section SCHEMAFULL;
DEFINE FIELD document_id ON TABLE section TYPE string;
DEFINE FIELD header ON TABLE section TYPE string;
DEFINE FIELD body_md ON TABLE section TYPE string;
DEFINE FIELD position ON TABLE section TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE section TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_section_document ON TABLE section COLUMNS document_id;

-- =======================================================================
-- Resource links (document scope, external references)
-- =======================================================================
DEFINE TABLE resource_link SCHEMAFULL;
DEFINE FIELD document_id ON TABLE resource_link TYPE string;
DEFINE FIELD title ON TABLE resource_link TYPE string;
DEFINE FIELD url ON TABLE resource_link TYPE string;
DEFINE FIELD note ON TABLE resource_link TYPE string DEFAULT '';
DEFINE INDEX idx_resource_link_document ON TABLE resource_link \
    COLUMNS document_id;

-- =======================================================================
-- Document versions (org scope, append-only snapshots)
-- =======================================================================
DEFINE TABLE document_version SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD document_id ON TABLE document_version TYPE string;
DEFINE FIELD org_id ON TABLE document_version TYPE string;
DEFINE FIELD title ON TABLE document_version TYPE string;
DEFINE FIELD status ON TABLE document_version TYPE string \
    ASSERT $value IN ['Draft', 'Published', 'Archived'];
DEFINE FIELD everyone ON TABLE document_version TYPE bool;
DEFINE FIELD tag_ids ON TABLE document_version TYPE array;
DEFINE FIELD tag_ids.* ON TABLE document_version TYPE string;
DEFINE FIELD collection_ids ON TABLE document_version TYPE array;
DEFINE FIELD collection_ids.* ON TABLE document_version TYPE string;
DEFINE FIELD department_ids ON TABLE document_version TYPE array;
DEFINE FIELD department_ids.* ON TABLE document_version TYPE string;
DEFINE FIELD created_at ON TABLE document_version TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_version_document_time ON TABLE document_version \
    COLUMNS document_id, created_at;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- Document -> Department membership
DEFINE TABLE in_department TYPE RELATION SCHEMAFULL;

-- Collection -> Document membership
DEFINE TABLE includes TYPE RELATION SCHEMAFULL;

-- Collection -> Collection nesting (parent -> child)
DEFINE TABLE nests TYPE RELATION SCHEMAFULL;

-- Document -> Tag attachment
DEFINE TABLE tagged_with TYPE RELATION SCHEMAFULL;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}

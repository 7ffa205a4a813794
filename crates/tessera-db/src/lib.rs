//! Tessera Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - SurrealDB implementations of every `tessera-core` repository trait

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealCollectionRepository, SurrealDepartmentRepository, SurrealDocumentRepository,
    SurrealDocumentVersionRepository, SurrealOrganizationRepository, SurrealResourceLinkRepository,
    SurrealSectionRepository, SurrealTagRepository, SurrealTileRepository,
};
pub use schema::{run_migrations, schema_v1};

//! Domain models for Tessera.
//!
//! These are the core types shared across all crates. Every entity except
//! [`organization::Organization`] carries an owning `org_id`; repository
//! implementations filter all operations by it.

pub mod collection;
pub mod department;
pub mod document;
pub mod document_version;
pub mod organization;
pub mod resource_link;
pub mod section;
pub mod tag;
pub mod tile;

//! Tessera Core — domain models, repository traits, and shared error
//! types for the multi-tenant knowledge-base backend.
//!
//! This crate has no I/O dependencies; persistence lives in
//! `tessera-db` and the structural-tag engine in `tessera-tags`.

pub mod error;
pub mod models;
pub mod repository;
pub mod slug;

pub use error::{TesseraError, TesseraResult};
pub use slug::slugify;

//! Tessera Tags — structural tag provisioning and synchronization,
//! plus the collection nesting cycle guard.

pub mod config;
pub mod error;
pub mod graph;
pub mod provision;
pub mod resolver;
pub mod service;
pub mod sync;

pub use config::EngineConfig;
pub use error::TagEngineError;
pub use graph::{SubcollectionGraph, would_create_cycle};
pub use service::TagEngine;
pub use sync::SyncReport;

//! Department domain model.
//!
//! Departments partition an organization's audience. Document visibility
//! is driven by department membership, and each department is mirrored by
//! a structural tag provisioned through the tag engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    /// Unique within the organization; derived from `name` when absent.
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub org_id: Uuid,
    pub name: String,
    /// Derived from `name` when `None`.
    pub slug: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

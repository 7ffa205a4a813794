//! Resource link domain model — external references attached to a
//! document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLink {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub url: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResourceLink {
    pub document_id: Uuid,
    pub title: String,
    pub url: String,
    pub note: String,
}

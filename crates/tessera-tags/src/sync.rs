//! Structural tag synchronization for a single document.

use std::collections::HashSet;

use tessera_core::error::TesseraResult;
use tessera_core::repository::{CollectionRepository, DocumentRepository, TagRepository};
use tracing::debug;
use uuid::Uuid;

use crate::resolver::desired_structural_tags;

/// What one synchronization pass changed.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Structural tags newly attached to the document.
    pub attached: Vec<Uuid>,
    /// Structural tags detached because membership no longer backs them.
    pub detached: Vec<Uuid>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// Bring a document's structural tags in line with its membership.
///
/// Attaches every missing structural tag the membership calls for and
/// detaches structural tags whose backing membership is gone. Manual
/// tags are never touched, whatever they link to. The pass is
/// idempotent: running it twice in a row yields an empty report the
/// second time.
pub async fn sync_structural_tags<D, C, T>(
    documents: &D,
    collections: &C,
    tags: &T,
    org_id: Uuid,
    document_id: Uuid,
) -> TesseraResult<SyncReport>
where
    D: DocumentRepository,
    C: CollectionRepository,
    T: TagRepository,
{
    let wanted = desired_structural_tags(documents, collections, tags, org_id, document_id).await?;
    let wanted_ids: HashSet<Uuid> = wanted.iter().map(|t| t.id).collect();

    let current = documents.tags(org_id, document_id).await?;

    let mut report = SyncReport::default();

    for tag in &current {
        if tag.is_structural() && !wanted_ids.contains(&tag.id) {
            documents.detach_tag(org_id, document_id, tag.id).await?;
            report.detached.push(tag.id);
        }
    }

    let current_ids: HashSet<Uuid> = current.iter().map(|t| t.id).collect();
    for tag_id in wanted_ids {
        if !current_ids.contains(&tag_id) {
            documents.attach_tag(org_id, document_id, tag_id).await?;
            report.attached.push(tag_id);
        }
    }

    if !report.is_noop() {
        debug!(
            document = %document_id,
            attached = report.attached.len(),
            detached = report.detached.len(),
            "Synchronized structural tags"
        );
    }

    Ok(report)
}

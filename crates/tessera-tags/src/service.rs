//! Tag engine — membership triggers and nesting guards.
//!
//! Every mutation that can change which structural tags a document
//! deserves funnels through here, so the attach/detach rules live in
//! one place instead of being scattered across the request layer.

use tessera_core::error::TesseraResult;
use tessera_core::models::collection::{Collection, MembershipDelta};
use tessera_core::models::department::Department;
use tessera_core::models::tag::{Tag, TagLink};
use tessera_core::repository::{CollectionRepository, DocumentRepository, TagRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::TagEngineError;
use crate::graph::would_create_cycle;
use crate::provision;
use crate::sync::{SyncReport, sync_structural_tags};

/// Tag engine service.
///
/// Generic over repository implementations so that the engine has no
/// dependency on the database crate.
pub struct TagEngine<D, C, T>
where
    D: DocumentRepository,
    C: CollectionRepository,
    T: TagRepository,
{
    documents: D,
    collections: C,
    tags: T,
    config: EngineConfig,
}

impl<D, C, T> TagEngine<D, C, T>
where
    D: DocumentRepository,
    C: CollectionRepository,
    T: TagRepository,
{
    pub fn new(documents: D, collections: C, tags: T, config: EngineConfig) -> Self {
        Self {
            documents,
            collections,
            tags,
            config,
        }
    }

    // -------------------------------------------------------------------
    // Provisioning
    // -------------------------------------------------------------------

    /// Ensure a department's structural tag exists and matches its name.
    /// Call after creating or renaming a department.
    pub async fn ensure_department_tag(&self, department: &Department) -> TesseraResult<Tag> {
        provision::ensure_department_tag(&self.tags, department).await
    }

    /// Ensure a collection's structural tag exists and matches its name.
    /// Call after creating or renaming a collection.
    pub async fn ensure_collection_tag(&self, collection: &Collection) -> TesseraResult<Tag> {
        provision::ensure_collection_tag(&self.tags, collection).await
    }

    /// Sever a deleted department's tag from the department. The tag
    /// lives on as a manual tag; attached documents keep it.
    pub async fn unlink_department_tag(
        &self,
        org_id: Uuid,
        department_id: Uuid,
    ) -> TesseraResult<Option<Tag>> {
        provision::unlink_tag(&self.tags, org_id, &TagLink::Department(department_id)).await
    }

    /// Sever a deleted collection's tag from the collection.
    pub async fn unlink_collection_tag(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
    ) -> TesseraResult<Option<Tag>> {
        provision::unlink_tag(&self.tags, org_id, &TagLink::Collection(collection_id)).await
    }

    // -------------------------------------------------------------------
    // Synchronization
    // -------------------------------------------------------------------

    /// Re-derive one document's structural tags from its membership.
    pub async fn sync_document(&self, org_id: Uuid, document_id: Uuid) -> TesseraResult<SyncReport> {
        sync_structural_tags(
            &self.documents,
            &self.collections,
            &self.tags,
            org_id,
            document_id,
        )
        .await
    }

    /// Replace a document's department set, then re-sync the document.
    pub async fn set_document_departments(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        department_ids: &[Uuid],
    ) -> TesseraResult<SyncReport> {
        self.documents
            .set_departments(org_id, document_id, department_ids)
            .await?;
        self.sync_document(org_id, document_id).await
    }

    /// Add a document to a collection, then re-sync the document.
    pub async fn add_document_to_collection(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_id: Uuid,
    ) -> TesseraResult<SyncReport> {
        self.collections
            .add_document(org_id, collection_id, document_id)
            .await?;
        self.sync_document(org_id, document_id).await
    }

    /// Remove a document from a collection, then re-sync the document.
    pub async fn remove_document_from_collection(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_id: Uuid,
    ) -> TesseraResult<SyncReport> {
        self.collections
            .remove_document(org_id, collection_id, document_id)
            .await?;
        self.sync_document(org_id, document_id).await
    }

    /// Replace a collection's document set wholesale, re-syncing every
    /// document on either side of the change.
    pub async fn set_collection_documents(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_ids: &[Uuid],
    ) -> TesseraResult<(MembershipDelta, Vec<SyncReport>)> {
        let delta = self
            .collections
            .set_documents(org_id, collection_id, document_ids)
            .await?;

        let mut reports = Vec::with_capacity(delta.added.len() + delta.removed.len());
        for document_id in delta.added.iter().chain(delta.removed.iter()) {
            reports.push(self.sync_document(org_id, *document_id).await?);
        }

        Ok((delta, reports))
    }

    // -------------------------------------------------------------------
    // Nesting guards
    // -------------------------------------------------------------------

    /// Whether nesting `child_id` under `parent_id` would close a cycle
    /// in the persisted graph.
    pub async fn would_create_cycle(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> TesseraResult<bool> {
        would_create_cycle(
            &self.collections,
            org_id,
            parent_id,
            child_id,
            self.config.max_graph_nodes,
        )
        .await
    }

    /// Nest one collection under another, rejecting cycles.
    pub async fn add_subcollection(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> TesseraResult<()> {
        if self.would_create_cycle(org_id, parent_id, child_id).await? {
            return Err(TagEngineError::CycleDetected {
                child: child_id.to_string(),
            }
            .into());
        }
        self.collections
            .add_subcollection(org_id, parent_id, child_id)
            .await
    }

    /// Remove one nesting edge. Never fails a cycle check.
    pub async fn remove_subcollection(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> TesseraResult<()> {
        self.collections
            .remove_subcollection(org_id, parent_id, child_id)
            .await
    }

    /// Replace a parent's subcollection set wholesale.
    ///
    /// Every candidate is vetted against the persisted graph before any
    /// edge is written, so one bad candidate rejects the whole request
    /// and leaves the graph untouched.
    pub async fn set_subcollections(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_ids: &[Uuid],
    ) -> TesseraResult<()> {
        for child_id in child_ids {
            if self.would_create_cycle(org_id, parent_id, *child_id).await? {
                return Err(TagEngineError::CycleDetected {
                    child: child_id.to_string(),
                }
                .into());
            }
        }
        self.collections
            .replace_subcollections(org_id, parent_id, child_ids)
            .await
    }

    // -------------------------------------------------------------------
    // Backfill
    // -------------------------------------------------------------------

    /// Provision a department's tag and attach it to every document
    /// already in the department. Returns the number of documents whose
    /// tags changed.
    pub async fn backfill_department(&self, department: &Department) -> TesseraResult<usize> {
        self.ensure_department_tag(department).await?;

        let document_ids = self
            .documents
            .ids_by_department(department.org_id, department.id)
            .await?;

        let mut changed = 0;
        for document_id in document_ids {
            let report = self.sync_document(department.org_id, document_id).await?;
            if !report.is_noop() {
                changed += 1;
            }
        }

        info!(
            department = %department.id,
            changed,
            "Backfilled department tag"
        );
        Ok(changed)
    }

    /// Provision a collection's tag and attach it to every document the
    /// collection already includes.
    pub async fn backfill_collection(&self, collection: &Collection) -> TesseraResult<usize> {
        self.ensure_collection_tag(collection).await?;

        let document_ids = self
            .collections
            .document_ids(collection.org_id, collection.id)
            .await?;

        let mut changed = 0;
        for document_id in document_ids {
            let report = self.sync_document(collection.org_id, document_id).await?;
            if !report.is_noop() {
                changed += 1;
            }
        }

        info!(
            collection = %collection.id,
            changed,
            "Backfilled collection tag"
        );
        Ok(changed)
    }
}

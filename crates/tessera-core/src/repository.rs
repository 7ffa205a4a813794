//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Org-scoped repositories require
//! an `org_id` parameter to enforce tenant isolation. Membership on the
//! many-to-many relations (document↔department, collection↔document,
//! collection↔collection, document↔tag) is exposed as explicit edge
//! operations so the tag engine can observe and react to deltas.

use uuid::Uuid;

use crate::error::TesseraResult;
use crate::models::{
    collection::{Collection, CreateCollection, MembershipDelta, UpdateCollection},
    department::{CreateDepartment, Department, UpdateDepartment},
    document::{CreateDocument, Document, UpdateDocument},
    document_version::{CreateDocumentVersion, DocumentVersion},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    resource_link::{CreateResourceLink, ResourceLink},
    section::{CreateSection, Section, UpdateSection},
    tag::{CreateTag, Tag, TagLink, UpdateTag},
    tile::{CreateTile, Tile, UpdateTile},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organization (global scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = TesseraResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TesseraResult<Organization>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = TesseraResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = TesseraResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Org-scoped repositories
// ---------------------------------------------------------------------------

pub trait DepartmentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDepartment,
    ) -> impl Future<Output = TesseraResult<Department>> + Send;
    fn get_by_id(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<Department>> + Send;
    fn get_by_slug(
        &self,
        org_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = TesseraResult<Department>> + Send;
    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateDepartment,
    ) -> impl Future<Output = TesseraResult<Department>> + Send;
    /// Deleting a department also unlinks its structural tag (the tag
    /// survives as an unlinked manual tag) and drops membership edges.
    fn delete(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Department>>> + Send;
}

pub trait DocumentRepository: Send + Sync {
    fn create(&self, input: CreateDocument)
    -> impl Future<Output = TesseraResult<Document>> + Send;
    fn get_by_id(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<Document>> + Send;
    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateDocument,
    ) -> impl Future<Output = TesseraResult<Document>> + Send;
    fn delete(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Document>>> + Send;

    /// Add one department to the document's membership.
    fn add_department(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        department_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Remove one department from the document's membership.
    fn remove_department(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        department_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Replace the document's department set wholesale, returning the
    /// delta that was applied.
    fn set_departments(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        department_ids: &[Uuid],
    ) -> impl Future<Output = TesseraResult<MembershipDelta>> + Send;

    /// Ids of the departments the document belongs to.
    fn department_ids(
        &self,
        org_id: Uuid,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Uuid>>> + Send;

    /// All tags currently attached to the document.
    fn tags(
        &self,
        org_id: Uuid,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Tag>>> + Send;

    /// Attach a tag. Idempotent: attaching an already-attached tag is a
    /// no-op.
    fn attach_tag(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        tag_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Detach a tag. Detaching an absent tag is a no-op.
    fn detach_tag(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        tag_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Ids of all documents belonging to a department (backfill support).
    fn ids_by_department(
        &self,
        org_id: Uuid,
        department_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Uuid>>> + Send;
}

pub trait CollectionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCollection,
    ) -> impl Future<Output = TesseraResult<Collection>> + Send;
    fn get_by_id(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<Collection>> + Send;
    fn get_by_slug(
        &self,
        org_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = TesseraResult<Collection>> + Send;
    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateCollection,
    ) -> impl Future<Output = TesseraResult<Collection>> + Send;
    /// Deleting a collection also unlinks its structural tag (the tag
    /// survives as an unlinked manual tag) and removes all of its edges.
    fn delete(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Collection>>> + Send;

    /// Add one document to the collection.
    fn add_document(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Remove one document from the collection.
    fn remove_document(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Replace the collection's document set wholesale, returning the
    /// applied delta so callers can re-sync every affected document.
    fn set_documents(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
        document_ids: &[Uuid],
    ) -> impl Future<Output = TesseraResult<MembershipDelta>> + Send;

    /// Ids of the documents in the collection.
    fn document_ids(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Uuid>>> + Send;

    /// Ids of the collections containing a document (reverse membership).
    fn collection_ids_of_document(
        &self,
        org_id: Uuid,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Uuid>>> + Send;

    /// Add one subcollection edge. Callers must run the cycle guard
    /// first; this method persists blindly.
    fn add_subcollection(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Remove one subcollection edge.
    fn remove_subcollection(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Replace the parent's subcollection set wholesale. Callers must
    /// have vetted every candidate through the cycle guard.
    fn replace_subcollections(
        &self,
        org_id: Uuid,
        parent_id: Uuid,
        child_ids: &[Uuid],
    ) -> impl Future<Output = TesseraResult<()>> + Send;

    /// Direct subcollection ids of a collection (adjacency query for the
    /// cycle guard's traversal).
    fn subcollection_ids(
        &self,
        org_id: Uuid,
        collection_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Uuid>>> + Send;
}

pub trait TagRepository: Send + Sync {
    /// Entity links must point at a record of the tag's own
    /// organization; a foreign or missing target is a `CrossOrg` error.
    fn create(&self, input: CreateTag) -> impl Future<Output = TesseraResult<Tag>> + Send;
    fn get_by_id(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<Tag>> + Send;
    fn get_by_slug(
        &self,
        org_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = TesseraResult<Tag>> + Send;
    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateTag,
    ) -> impl Future<Output = TesseraResult<Tag>> + Send;
    fn delete(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    fn list(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<Tag>>> + Send;

    /// Look up the tag pointing at a given link target, if one exists.
    /// Provisioning keys find-or-create on this.
    fn find_by_link(
        &self,
        org_id: Uuid,
        link: &TagLink,
    ) -> impl Future<Output = TesseraResult<Option<Tag>>> + Send;

    /// All structural tags whose linked department is in `department_ids`
    /// or whose linked collection is in `collection_ids`. Callers
    /// short-circuit when both slices are empty.
    fn find_structural(
        &self,
        org_id: Uuid,
        department_ids: &[Uuid],
        collection_ids: &[Uuid],
    ) -> impl Future<Output = TesseraResult<Vec<Tag>>> + Send;
}

pub trait TileRepository: Send + Sync {
    /// Create a tile; rejects targets that are missing for the kind or
    /// that belong to a different organization.
    fn create(&self, input: CreateTile) -> impl Future<Output = TesseraResult<Tile>> + Send;
    fn get_by_id(&self, org_id: Uuid, id: Uuid)
    -> impl Future<Output = TesseraResult<Tile>> + Send;
    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateTile,
    ) -> impl Future<Output = TesseraResult<Tile>> + Send;
    fn delete(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = TesseraResult<()>> + Send;
    /// Tiles ordered by `(order, title)`, active first.
    fn list(&self, org_id: Uuid) -> impl Future<Output = TesseraResult<Vec<Tile>>> + Send;
}

// ---------------------------------------------------------------------------
// Document children (org scope inherited through the document)
// ---------------------------------------------------------------------------

pub trait SectionRepository: Send + Sync {
    fn create(&self, input: CreateSection) -> impl Future<Output = TesseraResult<Section>> + Send;
    fn update(
        &self,
        document_id: Uuid,
        id: Uuid,
        input: UpdateSection,
    ) -> impl Future<Output = TesseraResult<Section>> + Send;
    fn delete(&self, document_id: Uuid, id: Uuid)
    -> impl Future<Output = TesseraResult<()>> + Send;
    /// Sections of a document in `(order, id)` order.
    fn list_by_document(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Section>>> + Send;
    /// Apply a new ordering. Ids not belonging to the document are
    /// ignored; sections missing from the list keep their position after
    /// the listed ones.
    fn reorder(
        &self,
        document_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> impl Future<Output = TesseraResult<()>> + Send;
}

pub trait ResourceLinkRepository: Send + Sync {
    fn create(
        &self,
        input: CreateResourceLink,
    ) -> impl Future<Output = TesseraResult<ResourceLink>> + Send;
    fn delete(&self, document_id: Uuid, id: Uuid)
    -> impl Future<Output = TesseraResult<()>> + Send;
    fn list_by_document(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<ResourceLink>>> + Send;
}

// ---------------------------------------------------------------------------
// Version snapshots (append-only)
// ---------------------------------------------------------------------------

pub trait DocumentVersionRepository: Send + Sync {
    /// Append a snapshot. No update or delete operations exist.
    fn append(
        &self,
        input: CreateDocumentVersion,
    ) -> impl Future<Output = TesseraResult<DocumentVersion>> + Send;
    /// Snapshots for a document, newest first.
    fn list_by_document(
        &self,
        org_id: Uuid,
        document_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = TesseraResult<PaginatedResult<DocumentVersion>>> + Send;
}

//! Resolves the structural tag set a document should carry.

use tessera_core::error::TesseraResult;
use tessera_core::models::tag::Tag;
use tessera_core::repository::{CollectionRepository, DocumentRepository, TagRepository};
use uuid::Uuid;

/// The structural tags a document ought to have, derived from its
/// current department and collection membership.
///
/// A document outside every department and collection wants no
/// structural tags; membership lookup short-circuits to avoid the tag
/// query entirely in that case. Only tags that have actually been
/// provisioned are returned; membership in an entity whose tag does not
/// exist yet contributes nothing.
pub async fn desired_structural_tags<D, C, T>(
    documents: &D,
    collections: &C,
    tags: &T,
    org_id: Uuid,
    document_id: Uuid,
) -> TesseraResult<Vec<Tag>>
where
    D: DocumentRepository,
    C: CollectionRepository,
    T: TagRepository,
{
    let department_ids = documents.department_ids(org_id, document_id).await?;
    let collection_ids = collections
        .collection_ids_of_document(org_id, document_id)
        .await?;

    if department_ids.is_empty() && collection_ids.is_empty() {
        return Ok(Vec::new());
    }

    tags.find_structural(org_id, &department_ids, &collection_ids)
        .await
}

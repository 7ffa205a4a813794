//! Find-or-create provisioning of structural tags.
//!
//! Each department and collection is mirrored by exactly one tag linked
//! to it. Provisioning is keyed on the link, not the name: renaming the
//! entity renames its tag, while editing the tag's name never writes
//! back to the entity.

use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::collection::Collection;
use tessera_core::models::department::Department;
use tessera_core::models::tag::{CreateTag, Tag, TagLink, UpdateTag};
use tessera_core::repository::TagRepository;
use tessera_core::slugify;
use tracing::info;
use uuid::Uuid;

/// Ensure the structural tag mirroring a department exists and carries
/// the department's current name.
pub async fn ensure_department_tag<T: TagRepository>(
    tags: &T,
    department: &Department,
) -> TesseraResult<Tag> {
    ensure_linked_tag(
        tags,
        department.org_id,
        &department.name,
        TagLink::Department(department.id),
        department.id,
    )
    .await
}

/// Ensure the structural tag mirroring a collection exists and carries
/// the collection's current name.
pub async fn ensure_collection_tag<T: TagRepository>(
    tags: &T,
    collection: &Collection,
) -> TesseraResult<Tag> {
    ensure_linked_tag(
        tags,
        collection.org_id,
        &collection.name,
        TagLink::Collection(collection.id),
        collection.id,
    )
    .await
}

/// Sever a structural tag from its entity, if one exists.
///
/// The tag itself survives as an ordinary manual tag so that documents
/// keep their labels when the entity is deleted. Returns the unlinked
/// tag, or `None` when no tag pointed at the entity.
pub async fn unlink_tag<T: TagRepository>(
    tags: &T,
    org_id: Uuid,
    link: &TagLink,
) -> TesseraResult<Option<Tag>> {
    match tags.find_by_link(org_id, link).await? {
        Some(tag) => {
            let unlinked = tags
                .update(
                    org_id,
                    tag.id,
                    UpdateTag {
                        link: Some(TagLink::None),
                        ..Default::default()
                    },
                )
                .await?;
            Ok(Some(unlinked))
        }
        None => Ok(None),
    }
}

async fn ensure_linked_tag<T: TagRepository>(
    tags: &T,
    org_id: Uuid,
    name: &str,
    link: TagLink,
    entity_id: Uuid,
) -> TesseraResult<Tag> {
    if let Some(tag) = tags.find_by_link(org_id, &link).await? {
        if tag.name == name {
            return Ok(tag);
        }
        // One-way rename sync: the entity's name wins. A slug taken by
        // another tag leaves this tag's slug as it was.
        let renamed = tags
            .update(
                org_id,
                tag.id,
                UpdateTag {
                    name: Some(name.to_string()),
                    slug: Some(slugify(name)),
                    ..Default::default()
                },
            )
            .await;
        return match renamed {
            Ok(tag) => Ok(tag),
            Err(TesseraError::AlreadyExists { .. }) => {
                tags.update(
                    org_id,
                    tag.id,
                    UpdateTag {
                        name: Some(name.to_string()),
                        ..Default::default()
                    },
                )
                .await
            }
            Err(e) => Err(e),
        };
    }

    let created = tags
        .create(CreateTag {
            org_id,
            name: name.to_string(),
            slug: None,
            description: String::new(),
            link: link.clone(),
        })
        .await;

    match created {
        Ok(tag) => {
            info!(org = %org_id, tag = %tag.id, "Provisioned structural tag");
            Ok(tag)
        }
        Err(TesseraError::AlreadyExists { .. }) => {
            // Either we lost a race on the link, or an unrelated tag
            // holds the slug. Re-check the link, then retry with a
            // suffixed slug.
            if let Some(tag) = tags.find_by_link(org_id, &link).await? {
                return Ok(tag);
            }
            let suffix = &entity_id.to_string()[..8];
            tags.create(CreateTag {
                org_id,
                name: name.to_string(),
                slug: Some(format!("{}-{}", slugify(name), suffix)),
                description: String::new(),
                link,
            })
            .await
        }
        Err(e) => Err(e),
    }
}

//! Integration tests for collection membership and nesting edges.

use tessera_core::models::collection::{CreateCollection, UpdateCollection};
use tessera_core::models::document::{CreateDocument, DocumentStatus};
use tessera_core::models::organization::CreateOrganization;
use tessera_core::models::tag::{CreateTag, TagLink};
use tessera_core::repository::{
    CollectionRepository, DocumentRepository, OrganizationRepository, Pagination, TagRepository,
};
use tessera_db::repository::{
    SurrealCollectionRepository, SurrealDocumentRepository, SurrealOrganizationRepository,
    SurrealTagRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrganization {
            name: "Acme Corp".into(),
            slug: "acme-corp".into(),
            metadata: None,
        })
        .await
        .unwrap();

    (db, org.id)
}

async fn make_collection(
    repo: &SurrealCollectionRepository<surrealdb::engine::local::Db>,
    org_id: Uuid,
    name: &str,
) -> Uuid {
    repo.create(CreateCollection {
        org_id,
        name: name.into(),
        slug: None,
        description: String::new(),
        order: 0,
    })
    .await
    .unwrap()
    .id
}

async fn make_document(
    repo: &SurrealDocumentRepository<surrealdb::engine::local::Db>,
    org_id: Uuid,
    title: &str,
) -> Uuid {
    repo.create(CreateDocument {
        org_id,
        title: title.into(),
        slug: None,
        status: DocumentStatus::Published,
        everyone: false,
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn collection_crud_and_ordering() {
    let (db, org_id) = setup().await;
    let repo = SurrealCollectionRepository::new(db);

    let first = repo
        .create(CreateCollection {
            org_id,
            name: "Policies".into(),
            slug: None,
            description: String::new(),
            order: 2,
        })
        .await
        .unwrap();
    assert_eq!(first.slug, "policies");
    assert_eq!(first.order, 2);

    repo.create(CreateCollection {
        org_id,
        name: "Guides".into(),
        slug: None,
        description: String::new(),
        order: 1,
    })
    .await
    .unwrap();

    let page = repo.list(org_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].name, "Guides");
    assert_eq!(page.items[1].name, "Policies");

    let renamed = repo
        .update(
            org_id,
            first.id,
            UpdateCollection {
                name: Some("Company Policies".into()),
                order: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Company Policies");
    assert_eq!(renamed.order, 0);
}

#[tokio::test]
async fn collection_document_membership_delta() {
    let (db, org_id) = setup().await;
    let coll_repo = SurrealCollectionRepository::new(db.clone());
    let doc_repo = SurrealDocumentRepository::new(db);

    let coll = make_collection(&coll_repo, org_id, "Handbook").await;
    let doc_a = make_document(&doc_repo, org_id, "Intro").await;
    let doc_b = make_document(&doc_repo, org_id, "Benefits").await;
    let doc_c = make_document(&doc_repo, org_id, "Security").await;

    coll_repo.add_document(org_id, coll, doc_a).await.unwrap();
    coll_repo.add_document(org_id, coll, doc_b).await.unwrap();
    // Repeats do not duplicate the edge.
    coll_repo.add_document(org_id, coll, doc_b).await.unwrap();

    let mut ids = coll_repo.document_ids(org_id, coll).await.unwrap();
    ids.sort();
    let mut expected = vec![doc_a, doc_b];
    expected.sort();
    assert_eq!(ids, expected);

    let delta = coll_repo
        .set_documents(org_id, coll, &[doc_b, doc_c])
        .await
        .unwrap();
    assert_eq!(delta.added, vec![doc_c]);
    assert_eq!(delta.removed, vec![doc_a]);

    // Reverse membership.
    let colls = coll_repo
        .collection_ids_of_document(org_id, doc_c)
        .await
        .unwrap();
    assert_eq!(colls, vec![coll]);
    let colls = coll_repo
        .collection_ids_of_document(org_id, doc_a)
        .await
        .unwrap();
    assert!(colls.is_empty());
}

#[tokio::test]
async fn subcollection_edges_are_directed() {
    let (db, org_id) = setup().await;
    let repo = SurrealCollectionRepository::new(db);

    let parent = make_collection(&repo, org_id, "Parent").await;
    let child = make_collection(&repo, org_id, "Child").await;

    repo.add_subcollection(org_id, parent, child).await.unwrap();

    assert_eq!(
        repo.subcollection_ids(org_id, parent).await.unwrap(),
        vec![child]
    );
    // The edge only points one way.
    assert!(repo.subcollection_ids(org_id, child).await.unwrap().is_empty());

    repo.remove_subcollection(org_id, parent, child)
        .await
        .unwrap();
    assert!(
        repo.subcollection_ids(org_id, parent)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn replace_subcollections_applies_exact_set() {
    let (db, org_id) = setup().await;
    let repo = SurrealCollectionRepository::new(db);

    let parent = make_collection(&repo, org_id, "Root").await;
    let a = make_collection(&repo, org_id, "A").await;
    let b = make_collection(&repo, org_id, "B").await;
    let c = make_collection(&repo, org_id, "C").await;

    repo.add_subcollection(org_id, parent, a).await.unwrap();
    repo.add_subcollection(org_id, parent, b).await.unwrap();

    repo.replace_subcollections(org_id, parent, &[b, c])
        .await
        .unwrap();

    let mut ids = repo.subcollection_ids(org_id, parent).await.unwrap();
    ids.sort();
    let mut expected = vec![b, c];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn collection_delete_cleans_both_edge_sides() {
    let (db, org_id) = setup().await;
    let coll_repo = SurrealCollectionRepository::new(db.clone());
    let doc_repo = SurrealDocumentRepository::new(db);

    let parent = make_collection(&coll_repo, org_id, "Parent").await;
    let middle = make_collection(&coll_repo, org_id, "Middle").await;
    let child = make_collection(&coll_repo, org_id, "Child").await;
    let doc = make_document(&doc_repo, org_id, "Doc").await;

    coll_repo
        .add_subcollection(org_id, parent, middle)
        .await
        .unwrap();
    coll_repo
        .add_subcollection(org_id, middle, child)
        .await
        .unwrap();
    coll_repo.add_document(org_id, middle, doc).await.unwrap();

    coll_repo.delete(org_id, middle).await.unwrap();

    // Both the incoming and outgoing nesting edges are gone.
    assert!(
        coll_repo
            .subcollection_ids(org_id, parent)
            .await
            .unwrap()
            .is_empty()
    );
    // The document no longer reports membership.
    assert!(
        coll_repo
            .collection_ids_of_document(org_id, doc)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn collection_delete_unlinks_structural_tag() {
    let (db, org_id) = setup().await;
    let coll_repo = SurrealCollectionRepository::new(db.clone());
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let tag_repo = SurrealTagRepository::new(db);

    let coll = make_collection(&coll_repo, org_id, "Archive").await;
    let doc = make_document(&doc_repo, org_id, "Old Memo").await;
    coll_repo.add_document(org_id, coll, doc).await.unwrap();

    let tag = tag_repo
        .create(CreateTag {
            org_id,
            name: "Archive".into(),
            slug: None,
            description: String::new(),
            link: TagLink::Collection(coll),
        })
        .await
        .unwrap();
    doc_repo.attach_tag(org_id, doc, tag.id).await.unwrap();

    coll_repo.delete(org_id, coll).await.unwrap();

    // Nothing points at the deleted collection any more.
    assert!(
        tag_repo
            .find_by_link(org_id, &TagLink::Collection(coll))
            .await
            .unwrap()
            .is_none()
    );
    // The tag survives as a manual tag and keeps its attachments.
    let survivor = tag_repo.get_by_id(org_id, tag.id).await.unwrap();
    assert_eq!(survivor.link, TagLink::None);
    let attached = doc_repo.tags(org_id, doc).await.unwrap();
    assert!(attached.iter().any(|t| t.id == tag.id));
}

#[tokio::test]
async fn cross_org_membership_is_rejected() {
    let (db, org_id) = setup().await;

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let other = org_repo
        .create(CreateOrganization {
            name: "Globex".into(),
            slug: "globex".into(),
            metadata: None,
        })
        .await
        .unwrap();

    let coll_repo = SurrealCollectionRepository::new(db.clone());
    let doc_repo = SurrealDocumentRepository::new(db);

    let coll = make_collection(&coll_repo, org_id, "Ours").await;
    let foreign_doc = make_document(&doc_repo, other.id, "Theirs").await;

    let err = coll_repo
        .add_document(org_id, coll, foreign_doc)
        .await
        .unwrap_err();
    assert!(matches!(err, tessera_core::TesseraError::NotFound { .. }));
}

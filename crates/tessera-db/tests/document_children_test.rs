//! Integration tests for sections, tiles, resource links, and version
//! snapshots using in-memory SurrealDB.

use tessera_core::models::document::{CreateDocument, DocumentStatus};
use tessera_core::models::document_version::CreateDocumentVersion;
use tessera_core::models::organization::CreateOrganization;
use tessera_core::models::resource_link::CreateResourceLink;
use tessera_core::models::section::{CreateSection, UpdateSection};
use tessera_core::models::tile::{CreateTile, TileKind};
use tessera_core::repository::{
    DocumentRepository, DocumentVersionRepository, OrganizationRepository, Pagination,
    ResourceLinkRepository, SectionRepository, TileRepository,
};
use tessera_db::repository::{
    SurrealDocumentRepository, SurrealDocumentVersionRepository, SurrealOrganizationRepository,
    SurrealResourceLinkRepository, SurrealSectionRepository, SurrealTileRepository,
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

async fn make_section(
    repo: &SurrealSectionRepository<surrealdb::engine::local::Db>,
    document_id: Uuid,
    header: &str,
    order: u32,
) -> Uuid {
    repo.create(CreateSection {
        document_id,
        header: header.into(),
        body_md: String::new(),
        order,
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn sections_list_in_position_order() {
    let (db, org_id) = setup().await;
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let repo = SurrealSectionRepository::new(db);

    let doc = make_document(&doc_repo, org_id, "Handbook").await;
    make_section(&repo, doc, "Closing", 1).await;
    make_section(&repo, doc, "Opening", 0).await;

    let sections = repo.list_by_document(doc).await.unwrap();
    let headers: Vec<&str> = sections.iter().map(|s| s.header.as_str()).collect();
    assert_eq!(headers, vec!["Opening", "Closing"]);
}

#[tokio::test]
async fn reorder_ignores_unknown_and_pushes_unlisted_last() {
    let (db, org_id) = setup().await;
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let repo = SurrealSectionRepository::new(db);

    let doc = make_document(&doc_repo, org_id, "Playbook").await;
    let a = make_section(&repo, doc, "A", 0).await;
    let b = make_section(&repo, doc, "B", 1).await;
    let c = make_section(&repo, doc, "C", 2).await;

    // An id from outside the document contributes nothing; B is not
    // listed and ends up after the listed sections.
    repo.reorder(doc, &[c, Uuid::new_v4(), a]).await.unwrap();

    let sections = repo.list_by_document(doc).await.unwrap();
    let ids: Vec<Uuid> = sections.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![c, a, b]);
    let positions: Vec<u32> = sections.iter().map(|s| s.order).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn section_update_and_scoped_delete() {
    let (db, org_id) = setup().await;
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let repo = SurrealSectionRepository::new(db);

    let doc = make_document(&doc_repo, org_id, "Notes").await;
    let other_doc = make_document(&doc_repo, org_id, "Decoy").await;
    let section = make_section(&repo, doc, "Draft header", 0).await;

    let updated = repo
        .update(
            doc,
            section,
            UpdateSection {
                header: Some("Final header".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.header, "Final header");

    // Deleting through the wrong document leaves the section alone.
    repo.delete(other_doc, section).await.unwrap();
    assert_eq!(repo.list_by_document(doc).await.unwrap().len(), 1);

    repo.delete(doc, section).await.unwrap();
    assert!(repo.list_by_document(doc).await.unwrap().is_empty());
}

#[tokio::test]
async fn tile_requires_target_matching_kind() {
    let (db, org_id) = setup().await;
    let repo = SurrealTileRepository::new(db);

    let err = repo
        .create(CreateTile {
            org_id,
            title: "Broken".into(),
            kind: TileKind::Url,
            order: 0,
            is_active: true,
            document_id: None,
            department_id: None,
            collection_id: None,
            href: String::new(),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, tessera_core::TesseraError::Validation { .. }));
}

#[tokio::test]
async fn tile_target_must_exist_in_own_org() {
    let (db, org_id) = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let repo = SurrealTileRepository::new(db);

    let other_org = org_repo
        .create(CreateOrganization {
            name: "Globex".into(),
            slug: "globex".into(),
            metadata: None,
        })
        .await
        .unwrap();
    let foreign_doc = make_document(&doc_repo, other_org.id, "Theirs").await;
    let own_doc = make_document(&doc_repo, org_id, "Ours").await;

    let tile = |target: Uuid| CreateTile {
        org_id,
        title: "Start here".into(),
        kind: TileKind::Document,
        order: 0,
        is_active: true,
        document_id: Some(target),
        department_id: None,
        collection_id: None,
        href: String::new(),
        description: String::new(),
    };

    let err = repo.create(tile(foreign_doc)).await.unwrap_err();
    assert!(matches!(err, tessera_core::TesseraError::CrossOrg { .. }));

    let err = repo.create(tile(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, tessera_core::TesseraError::CrossOrg { .. }));

    let created = repo.create(tile(own_doc)).await.unwrap();
    assert_eq!(created.document_id, Some(own_doc));
}

#[tokio::test]
async fn tiles_list_active_first() {
    let (db, org_id) = setup().await;
    let repo = SurrealTileRepository::new(db);

    for (title, order, is_active) in [("Dormant", 0, false), ("Second", 2, true), ("First", 1, true)]
    {
        repo.create(CreateTile {
            org_id,
            title: title.into(),
            kind: TileKind::Url,
            order,
            is_active,
            document_id: None,
            department_id: None,
            collection_id: None,
            href: "https://example.com".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    }

    let tiles = repo.list(org_id).await.unwrap();
    let titles: Vec<&str> = tiles.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Dormant"]);
}

#[tokio::test]
async fn resource_links_sorted_by_title() {
    let (db, org_id) = setup().await;
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let repo = SurrealResourceLinkRepository::new(db);

    let doc = make_document(&doc_repo, org_id, "References").await;
    let zulu = repo
        .create(CreateResourceLink {
            document_id: doc,
            title: "Zoning rules".into(),
            url: "https://example.com/zoning".into(),
            note: String::new(),
        })
        .await
        .unwrap();
    repo.create(CreateResourceLink {
        document_id: doc,
        title: "Archive index".into(),
        url: "https://example.com/archive".into(),
        note: String::new(),
    })
    .await
    .unwrap();

    let links = repo.list_by_document(doc).await.unwrap();
    let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Archive index", "Zoning rules"]);

    repo.delete(doc, zulu.id).await.unwrap();
    let links = repo.list_by_document(doc).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].title, "Archive index");
}

#[tokio::test]
async fn version_snapshots_list_newest_first() {
    let (db, org_id) = setup().await;
    let doc_repo = SurrealDocumentRepository::new(db.clone());
    let repo = SurrealDocumentVersionRepository::new(db);

    let doc = make_document(&doc_repo, org_id, "Policy").await;
    let dept_id = Uuid::new_v4();

    let snapshot = |title: &str, status: DocumentStatus| CreateDocumentVersion {
        document_id: doc,
        org_id,
        title: title.into(),
        status,
        everyone: false,
        tag_ids: Vec::new(),
        collection_ids: Vec::new(),
        department_ids: vec![dept_id],
    };

    let first = repo
        .append(snapshot("Policy", DocumentStatus::Draft))
        .await
        .unwrap();
    assert_eq!(first.department_ids, vec![dept_id]);

    repo.append(snapshot("Policy v2", DocumentStatus::Published))
        .await
        .unwrap();

    let page = repo
        .list_by_document(org_id, doc, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items[0].created_at >= page.items[1].created_at);
    let titles: Vec<&str> = page.items.iter().map(|v| v.title.as_str()).collect();
    assert!(titles.contains(&"Policy") && titles.contains(&"Policy v2"));

    let single = repo
        .list_by_document(
            org_id,
            doc,
            Pagination {
                offset: 0,
                limit: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(single.total, 2);
    assert_eq!(single.items.len(), 1);
}

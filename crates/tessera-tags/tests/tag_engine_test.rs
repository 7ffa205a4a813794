//! Integration tests for the tag engine using in-memory SurrealDB.

use tessera_core::models::collection::CreateCollection;
use tessera_core::models::department::{CreateDepartment, Department, UpdateDepartment};
use tessera_core::models::document::{CreateDocument, DocumentStatus};
use tessera_core::models::organization::CreateOrganization;
use tessera_core::models::tag::{CreateTag, TagLink};
use tessera_core::repository::{
    CollectionRepository, DepartmentRepository, DocumentRepository, OrganizationRepository,
    TagRepository,
};
use tessera_core::TesseraError;
use tessera_db::repository::{
    SurrealCollectionRepository, SurrealDepartmentRepository, SurrealDocumentRepository,
    SurrealOrganizationRepository, SurrealTagRepository,
};
use tessera_tags::{EngineConfig, TagEngine};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Engine = TagEngine<
    SurrealDocumentRepository<Db>,
    SurrealCollectionRepository<Db>,
    SurrealTagRepository<Db>,
>;

struct Fixture {
    db: Surreal<Db>,
    org_id: Uuid,
    engine: Engine,
}

async fn setup() -> Fixture {
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

    let engine = TagEngine::new(
        SurrealDocumentRepository::new(db.clone()),
        SurrealCollectionRepository::new(db.clone()),
        SurrealTagRepository::new(db.clone()),
        EngineConfig::default(),
    );

    Fixture {
        db,
        org_id: org.id,
        engine,
    }
}

impl Fixture {
    fn documents(&self) -> SurrealDocumentRepository<Db> {
        SurrealDocumentRepository::new(self.db.clone())
    }
    fn departments(&self) -> SurrealDepartmentRepository<Db> {
        SurrealDepartmentRepository::new(self.db.clone())
    }
    fn collections(&self) -> SurrealCollectionRepository<Db> {
        SurrealCollectionRepository::new(self.db.clone())
    }
    fn tags(&self) -> SurrealTagRepository<Db> {
        SurrealTagRepository::new(self.db.clone())
    }

    async fn make_department(&self, name: &str) -> Department {
        self.departments()
            .create(CreateDepartment {
                org_id: self.org_id,
                name: name.into(),
                slug: None,
                description: String::new(),
            })
            .await
            .unwrap()
    }

    async fn make_collection(&self, name: &str) -> tessera_core::models::collection::Collection {
        self.collections()
            .create(CreateCollection {
                org_id: self.org_id,
                name: name.into(),
                slug: None,
                description: String::new(),
                order: 0,
            })
            .await
            .unwrap()
    }

    async fn make_document(&self, title: &str) -> Uuid {
        self.documents()
            .create(CreateDocument {
                org_id: self.org_id,
                title: title.into(),
                slug: None,
                status: DocumentStatus::Published,
                everyone: false,
            })
            .await
            .unwrap()
            .id
    }

    async fn tag_names(&self, document_id: Uuid) -> Vec<String> {
        let mut names: Vec<String> = self
            .documents()
            .tags(self.org_id, document_id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        names.sort();
        names
    }
}

// -----------------------------------------------------------------------
// Provisioning
// -----------------------------------------------------------------------

#[tokio::test]
async fn ensure_department_tag_is_find_or_create() {
    let fx = setup().await;
    let dept = fx.make_department("Engineering").await;

    let first = fx.engine.ensure_department_tag(&dept).await.unwrap();
    assert_eq!(first.name, "Engineering");
    assert_eq!(first.slug, "engineering");
    assert_eq!(first.link, TagLink::Department(dept.id));

    // Second call returns the same tag, no duplicate.
    let second = fx.engine.ensure_department_tag(&dept).await.unwrap();
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn renaming_department_renames_its_tag() {
    let fx = setup().await;
    let dept = fx.make_department("Ops").await;
    let tag = fx.engine.ensure_department_tag(&dept).await.unwrap();

    let renamed = fx
        .departments()
        .update(
            fx.org_id,
            dept.id,
            UpdateDepartment {
                name: Some("Operations".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let synced = fx.engine.ensure_department_tag(&renamed).await.unwrap();
    assert_eq!(synced.id, tag.id);
    assert_eq!(synced.name, "Operations");
    assert_eq!(synced.slug, "operations");
}

#[tokio::test]
async fn renaming_tag_does_not_touch_department() {
    let fx = setup().await;
    let dept = fx.make_department("Finance").await;
    let tag = fx.engine.ensure_department_tag(&dept).await.unwrap();

    // Someone edits the tag by hand.
    fx.tags()
        .update(
            fx.org_id,
            tag.id,
            tessera_core::models::tag::UpdateTag {
                name: Some("Money Matters".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The department keeps its own name; the next ensure pass pulls the
    // tag back to the entity's name (entity wins).
    let dept_row = fx.departments().get_by_id(fx.org_id, dept.id).await.unwrap();
    assert_eq!(dept_row.name, "Finance");

    let resynced = fx.engine.ensure_department_tag(&dept_row).await.unwrap();
    assert_eq!(resynced.name, "Finance");
}

#[tokio::test]
async fn slug_collision_falls_back_to_suffixed_slug() {
    let fx = setup().await;

    // A manual tag already owns the slug.
    fx.tags()
        .create(CreateTag {
            org_id: fx.org_id,
            name: "Support".into(),
            slug: None,
            description: String::new(),
            link: TagLink::None,
        })
        .await
        .unwrap();

    let dept = fx.make_department("Support").await;
    let tag = fx.engine.ensure_department_tag(&dept).await.unwrap();

    assert_eq!(tag.name, "Support");
    assert!(tag.slug.starts_with("support-"));
    assert_eq!(tag.link, TagLink::Department(dept.id));
}

#[tokio::test]
async fn unlink_keeps_tag_and_attachments() {
    let fx = setup().await;
    let dept = fx.make_department("Legal").await;
    let tag = fx.engine.ensure_department_tag(&dept).await.unwrap();

    let doc = fx.make_document("Contracts 101").await;
    fx.documents()
        .add_department(fx.org_id, doc, dept.id)
        .await
        .unwrap();
    fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert_eq!(fx.tag_names(doc).await, vec!["Legal"]);

    // Department goes away: unlink first, then delete the row.
    let unlinked = fx
        .engine
        .unlink_department_tag(fx.org_id, dept.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unlinked.id, tag.id);
    assert_eq!(unlinked.link, TagLink::None);
    fx.departments().delete(fx.org_id, dept.id).await.unwrap();

    // The tag is manual now, so a re-sync leaves it attached.
    let report = fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert!(report.is_noop());
    assert_eq!(fx.tag_names(doc).await, vec!["Legal"]);
}

// -----------------------------------------------------------------------
// Synchronization
// -----------------------------------------------------------------------

#[tokio::test]
async fn membership_changes_drive_structural_tags() {
    let fx = setup().await;
    let hr = fx.make_department("HR").await;
    let eng = fx.make_department("Engineering").await;
    fx.engine.ensure_department_tag(&hr).await.unwrap();
    fx.engine.ensure_department_tag(&eng).await.unwrap();

    let doc = fx.make_document("Handbook").await;

    let report = fx
        .engine
        .set_document_departments(fx.org_id, doc, &[hr.id, eng.id])
        .await
        .unwrap();
    assert_eq!(report.attached.len(), 2);
    assert_eq!(fx.tag_names(doc).await, vec!["Engineering", "HR"]);

    // Dropping one department detaches exactly its tag.
    let report = fx
        .engine
        .set_document_departments(fx.org_id, doc, &[hr.id])
        .await
        .unwrap();
    assert_eq!(report.detached.len(), 1);
    assert!(report.attached.is_empty());
    assert_eq!(fx.tag_names(doc).await, vec!["HR"]);
}

#[tokio::test]
async fn sync_is_idempotent() {
    let fx = setup().await;
    let dept = fx.make_department("Sales").await;
    fx.engine.ensure_department_tag(&dept).await.unwrap();

    let doc = fx.make_document("Playbook").await;
    fx.documents()
        .add_department(fx.org_id, doc, dept.id)
        .await
        .unwrap();

    let first = fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert_eq!(first.attached.len(), 1);

    let second = fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert!(second.is_noop());
}

#[tokio::test]
async fn manual_tags_are_never_detached() {
    let fx = setup().await;
    let dept = fx.make_department("IT").await;
    fx.engine.ensure_department_tag(&dept).await.unwrap();

    let manual = fx
        .tags()
        .create(CreateTag {
            org_id: fx.org_id,
            name: "Favorite".into(),
            slug: None,
            description: String::new(),
            link: TagLink::Url("https://intranet.example.com".into()),
        })
        .await
        .unwrap();

    let doc = fx.make_document("Printer Setup").await;
    fx.documents()
        .attach_tag(fx.org_id, doc, manual.id)
        .await
        .unwrap();
    fx.documents()
        .add_department(fx.org_id, doc, dept.id)
        .await
        .unwrap();

    fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert_eq!(fx.tag_names(doc).await, vec!["Favorite", "IT"]);

    // Membership disappears; only the structural tag goes with it.
    let report = fx
        .engine
        .set_document_departments(fx.org_id, doc, &[])
        .await
        .unwrap();
    assert_eq!(report.detached.len(), 1);
    assert_eq!(fx.tag_names(doc).await, vec!["Favorite"]);
}

#[tokio::test]
async fn document_without_membership_wants_nothing() {
    let fx = setup().await;
    let doc = fx.make_document("Orphan").await;

    let report = fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert!(report.is_noop());
    assert!(fx.tag_names(doc).await.is_empty());
}

#[tokio::test]
async fn unprovisioned_membership_contributes_nothing() {
    let fx = setup().await;
    // Department exists but its tag was never provisioned.
    let dept = fx.make_department("Shadow").await;

    let doc = fx.make_document("Unseen").await;
    fx.documents()
        .add_department(fx.org_id, doc, dept.id)
        .await
        .unwrap();

    let report = fx.engine.sync_document(fx.org_id, doc).await.unwrap();
    assert!(report.is_noop());
}

#[tokio::test]
async fn collection_membership_mirrors_like_departments() {
    let fx = setup().await;
    let coll = fx.make_collection("Onboarding").await;
    fx.engine.ensure_collection_tag(&coll).await.unwrap();

    let doc_a = fx.make_document("Week One").await;
    let doc_b = fx.make_document("Week Two").await;

    let report = fx
        .engine
        .add_document_to_collection(fx.org_id, coll.id, doc_a)
        .await
        .unwrap();
    assert_eq!(report.attached.len(), 1);
    assert_eq!(fx.tag_names(doc_a).await, vec!["Onboarding"]);

    // Wholesale replacement syncs both the added and the removed side.
    let (delta, _) = fx
        .engine
        .set_collection_documents(fx.org_id, coll.id, &[doc_b])
        .await
        .unwrap();
    assert_eq!(delta.added, vec![doc_b]);
    assert_eq!(delta.removed, vec![doc_a]);
    assert!(fx.tag_names(doc_a).await.is_empty());
    assert_eq!(fx.tag_names(doc_b).await, vec!["Onboarding"]);
}

#[tokio::test]
async fn backfill_covers_existing_membership() {
    let fx = setup().await;
    let dept = fx.make_department("Research").await;

    // Documents joined the department before any tag existed.
    let doc_a = fx.make_document("Paper A").await;
    let doc_b = fx.make_document("Paper B").await;
    fx.documents()
        .add_department(fx.org_id, doc_a, dept.id)
        .await
        .unwrap();
    fx.documents()
        .add_department(fx.org_id, doc_b, dept.id)
        .await
        .unwrap();

    let changed = fx.engine.backfill_department(&dept).await.unwrap();
    assert_eq!(changed, 2);
    assert_eq!(fx.tag_names(doc_a).await, vec!["Research"]);
    assert_eq!(fx.tag_names(doc_b).await, vec!["Research"]);

    // Running again is a no-op.
    let changed = fx.engine.backfill_department(&dept).await.unwrap();
    assert_eq!(changed, 0);
}

// -----------------------------------------------------------------------
// Nesting guard
// -----------------------------------------------------------------------

#[tokio::test]
async fn self_loop_is_a_cycle() {
    let fx = setup().await;
    let coll = fx.make_collection("Selfie").await;

    let err = fx
        .engine
        .add_subcollection(fx.org_id, coll.id, coll.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TesseraError::CycleDetected { .. }));
}

#[tokio::test]
async fn closing_a_chain_is_rejected() {
    let fx = setup().await;
    let a = fx.make_collection("A").await;
    let b = fx.make_collection("B").await;
    let c = fx.make_collection("C").await;

    fx.engine
        .add_subcollection(fx.org_id, a.id, b.id)
        .await
        .unwrap();
    fx.engine
        .add_subcollection(fx.org_id, b.id, c.id)
        .await
        .unwrap();

    // C -> A would close the loop A -> B -> C -> A.
    let err = fx
        .engine
        .add_subcollection(fx.org_id, c.id, a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TesseraError::CycleDetected { .. }));

    // The graph is untouched.
    assert!(
        fx.collections()
            .subcollection_ids(fx.org_id, c.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn diamonds_are_not_cycles() {
    let fx = setup().await;
    let top = fx.make_collection("Top").await;
    let left = fx.make_collection("Left").await;
    let right = fx.make_collection("Right").await;
    let bottom = fx.make_collection("Bottom").await;

    fx.engine
        .add_subcollection(fx.org_id, top.id, left.id)
        .await
        .unwrap();
    fx.engine
        .add_subcollection(fx.org_id, top.id, right.id)
        .await
        .unwrap();
    fx.engine
        .add_subcollection(fx.org_id, left.id, bottom.id)
        .await
        .unwrap();
    // Two paths to the same node is fine; it is still acyclic.
    fx.engine
        .add_subcollection(fx.org_id, right.id, bottom.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn set_subcollections_rejects_whole_batch_on_one_cycle() {
    let fx = setup().await;
    let a = fx.make_collection("A").await;
    let b = fx.make_collection("B").await;
    let c = fx.make_collection("C").await;

    fx.engine
        .add_subcollection(fx.org_id, b.id, a.id)
        .await
        .unwrap();

    // B is fine on its own, but A under B already exists so nesting B
    // under A closes a loop; the whole batch must fail.
    let err = fx
        .engine
        .set_subcollections(fx.org_id, a.id, &[c.id, b.id])
        .await
        .unwrap_err();
    assert!(matches!(err, TesseraError::CycleDetected { .. }));

    // Nothing was written, including the innocent candidate.
    assert!(
        fx.collections()
            .subcollection_ids(fx.org_id, a.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn set_subcollections_replaces_cleanly() {
    let fx = setup().await;
    let root = fx.make_collection("Root").await;
    let a = fx.make_collection("A").await;
    let b = fx.make_collection("B").await;

    fx.engine
        .set_subcollections(fx.org_id, root.id, &[a.id])
        .await
        .unwrap();
    fx.engine
        .set_subcollections(fx.org_id, root.id, &[b.id])
        .await
        .unwrap();

    assert_eq!(
        fx.collections()
            .subcollection_ids(fx.org_id, root.id)
            .await
            .unwrap(),
        vec![b.id]
    );
}

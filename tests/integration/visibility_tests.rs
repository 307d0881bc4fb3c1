//! End-to-end visibility scenarios against the real redb store.

use std::sync::Arc;

use visor_core::{
    relationship, DomainError, Intent, IntentPatch, IntentRepository, IntentStatus, ScopeId,
};
use visor_directory::StaticScopeDirectory;
use visor_service::{IntentDraft, IntentService};
use visor_store::IntentStore;

struct Harness {
    _tmp: tempfile::TempDir,
    repo: Arc<IntentStore>,
    service: IntentService,
}

fn harness(known_scopes: &[&str]) -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let repo = Arc::new(IntentStore::open(tmp.path().join("intents.redb")).unwrap());
    let directory = Arc::new(StaticScopeDirectory::new(
        known_scopes.iter().map(|s| ScopeId::new(*s).unwrap()),
    ));
    let service = IntentService::new(repo.clone(), directory);
    Harness {
        _tmp: tmp,
        repo,
        service,
    }
}

fn scope(id: &str) -> ScopeId {
    ScopeId::new(id).unwrap()
}

fn labels(intents: &[Intent]) -> Vec<&str> {
    intents.iter().map(|i| i.label()).collect()
}

// === Scenario A: default intent, exclude, re-link ===
#[tokio::test]
async fn default_intent_exclusion_and_relink() {
    let h = harness(&["tenant-1"]);
    let t1 = scope("tenant-1");

    let greeting = h
        .service
        .create_default_intent(IntentDraft::new("greeting", IntentStatus::Active))
        .await
        .unwrap();

    // visible by default, without any link record
    assert_eq!(labels(&h.service.list_for_scope(&t1).await.unwrap()), ["greeting"]);

    h.service.exclude_intent(greeting.id(), &t1).await.unwrap();
    assert!(h.service.list_for_scope(&t1).await.unwrap().is_empty());

    // re-linking a default clears the exclusion and restores visibility
    h.service.link_intent(greeting.id(), &t1).await.unwrap();
    assert_eq!(labels(&h.service.list_for_scope(&t1).await.unwrap()), ["greeting"]);
    // still via default visibility, not a link row
    assert!(!h.repo.is_linked(greeting.id(), &t1).await.unwrap());
}

// === Scenario B: non-default intent is visible only to its scope ===
#[tokio::test]
async fn scoped_intent_is_invisible_elsewhere() {
    let h = harness(&["tenant-1", "tenant-2"]);
    let t1 = scope("tenant-1");
    let t2 = scope("tenant-2");

    h.service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[t1.clone()],
        )
        .await
        .unwrap();

    assert_eq!(labels(&h.service.list_for_scope(&t1).await.unwrap()), ["billing"]);
    assert!(h.service.list_for_scope(&t2).await.unwrap().is_empty());
}

// === Scenario C: unknown scope fails the creation and persists nothing ===
#[tokio::test]
async fn unknown_scope_leaves_no_record() {
    let h = harness(&["tenant-1"]);

    let err = h
        .service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[scope("ghost")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ScopeNotFound(_)));
    assert_eq!(err.http_status(), 404);
    assert!(h.repo.find_by_label("billing").await.unwrap().is_none());
}

// === Scenario D: INACTIVE only reachable via update ===
#[tokio::test]
async fn inactive_is_update_only() {
    let h = harness(&[]);

    let err = h
        .service
        .create_default_intent(IntentDraft::new("dormant", IntentStatus::Inactive))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::StatusNotCreatable(_)));

    let created = h
        .service
        .create_default_intent(IntentDraft::new("dormant", IntentStatus::Active))
        .await
        .unwrap();
    let updated = h
        .service
        .update_intent(
            created.id(),
            IntentPatch {
                status: Some(IntentStatus::Inactive),
                ..IntentPatch::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.status(), IntentStatus::Inactive);

    // status stays orthogonal to visibility
    let anyone = scope("anyone");
    assert_eq!(labels(&h.service.list_for_scope(&anyone).await.unwrap()), ["dormant"]);
}

#[tokio::test]
async fn duplicate_labels_conflict_across_scopes_and_kinds() {
    let h = harness(&["tenant-1"]);
    let t1 = scope("tenant-1");

    h.service
        .create_default_intent(IntentDraft::new("greeting", IntentStatus::Active))
        .await
        .unwrap();

    // same trimmed label, different kind and scope: still a conflict
    let err = h
        .service
        .create_scoped_intent(
            IntentDraft::new("  greeting  ", IntentStatus::Suggested),
            &[t1],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::LabelTaken(_)));
    assert_eq!(err.http_status(), 409);
}

#[tokio::test]
async fn update_keeps_own_label_but_not_anothers() {
    let h = harness(&[]);

    let greeting = h
        .service
        .create_default_intent(IntentDraft::new("greeting", IntentStatus::Active))
        .await
        .unwrap();
    h.service
        .create_default_intent(IntentDraft::new("farewell", IntentStatus::Active))
        .await
        .unwrap();

    // re-submitting the current label is not a conflict
    let same = h
        .service
        .update_intent(
            greeting.id(),
            IntentPatch {
                label: Some("greeting".into()),
                description: Some("says hello".into()),
                ..IntentPatch::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(same.description(), "says hello");

    let err = h
        .service
        .update_intent(
            greeting.id(),
            IntentPatch {
                label: Some("farewell".into()),
                ..IntentPatch::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::LabelTaken(_)));
}

#[tokio::test]
async fn link_is_idempotent_exclude_is_not() {
    let h = harness(&["tenant-1"]);
    let t1 = scope("tenant-1");

    let billing = h
        .service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[t1.clone()],
        )
        .await
        .unwrap();

    // linking again (creation already linked) raises nothing and stores one row
    h.service.link_intent(billing.id(), &t1).await.unwrap();
    h.service.link_intent(billing.id(), &t1).await.unwrap();
    assert_eq!(h.repo.linked_ids(&t1).await.unwrap().len(), 1);

    let greeting = h
        .service
        .create_default_intent(IntentDraft::new("greeting", IntentStatus::Active))
        .await
        .unwrap();
    h.service.exclude_intent(greeting.id(), &t1).await.unwrap();
    let err = h
        .service
        .exclude_intent(greeting.id(), &t1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExcluded { .. }));
    assert_eq!(h.repo.excluded_ids(&t1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn excluding_a_non_default_is_a_business_rule_violation() {
    let h = harness(&["tenant-1"]);
    let t1 = scope("tenant-1");

    let billing = h
        .service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[t1.clone()],
        )
        .await
        .unwrap();

    let err = h
        .service
        .exclude_intent(billing.id(), &t1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ExcludeNonDefault(_)));
}

#[tokio::test]
async fn rebind_applies_the_symmetric_difference() {
    let h = harness(&["a", "b", "c"]);
    let (a, b, c) = (scope("a"), scope("b"), scope("c"));

    let billing = h
        .service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[a.clone(), b.clone()],
        )
        .await
        .unwrap();

    // {a, b} -> {b, c}, with a duplicate in the input
    h.service
        .update_intent(
            billing.id(),
            IntentPatch::default(),
            Some(&[b.clone(), c.clone(), b.clone()]),
        )
        .await
        .unwrap();

    assert!(!h.repo.is_linked(billing.id(), &a).await.unwrap());
    assert!(h.repo.is_linked(billing.id(), &b).await.unwrap());
    assert!(h.repo.is_linked(billing.id(), &c).await.unwrap());
}

#[tokio::test]
async fn rebind_validates_added_scopes() {
    let h = harness(&["a"]);
    let a = scope("a");

    let billing = h
        .service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[a.clone()],
        )
        .await
        .unwrap();

    let err = h
        .service
        .update_intent(
            billing.id(),
            IntentPatch::default(),
            Some(&[a.clone(), scope("ghost")]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ScopeNotFound(_)));
    // the untouched scope is still bound
    assert!(h.repo.is_linked(billing.id(), &a).await.unwrap());
}

#[tokio::test]
async fn linking_clears_an_exclusion() {
    let h = harness(&["tenant-1"]);
    let t1 = scope("tenant-1");

    let greeting = h
        .service
        .create_default_intent(IntentDraft::new("greeting", IntentStatus::Active))
        .await
        .unwrap();
    h.service.exclude_intent(greeting.id(), &t1).await.unwrap();

    // the relationship-level link implicitly un-excludes
    relationship::link(h.repo.as_ref(), greeting.id(), &t1)
        .await
        .unwrap();
    assert!(!h.repo.is_excluded(greeting.id(), &t1).await.unwrap());
    assert_eq!(labels(&h.service.list_for_scope(&t1).await.unwrap()), ["greeting"]);
}

#[tokio::test]
async fn delete_cascades_and_frees_the_label() {
    let h = harness(&["tenant-1"]);
    let t1 = scope("tenant-1");

    let billing = h
        .service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[t1.clone()],
        )
        .await
        .unwrap();

    h.service.delete_intent(billing.id()).await.unwrap();
    assert!(matches!(
        h.service.get_intent(billing.id()).await.unwrap_err(),
        DomainError::IntentNotFound(_)
    ));
    assert!(h.service.list_for_scope(&t1).await.unwrap().is_empty());
    assert!(!h.repo.is_linked(billing.id(), &t1).await.unwrap());

    // deleting again reports the absence
    assert!(matches!(
        h.service.delete_intent(billing.id()).await.unwrap_err(),
        DomainError::IntentNotFound(_)
    ));

    // label is reusable after the cascade
    h.service
        .create_default_intent(IntentDraft::new("billing", IntentStatus::Active))
        .await
        .unwrap();
}

#[tokio::test]
async fn mixed_population_resolves_per_scope() {
    let h = harness(&["tenant-1", "tenant-2"]);
    let t1 = scope("tenant-1");
    let t2 = scope("tenant-2");

    let greeting = h
        .service
        .create_default_intent(IntentDraft::new("greeting", IntentStatus::Active))
        .await
        .unwrap();
    h.service
        .create_default_intent(IntentDraft::new("farewell", IntentStatus::Suggested))
        .await
        .unwrap();
    h.service
        .create_scoped_intent(
            IntentDraft::new("billing", IntentStatus::Active),
            &[t1.clone()],
        )
        .await
        .unwrap();
    h.service
        .create_scoped_intent(
            IntentDraft::new("shipping", IntentStatus::Active),
            &[t2.clone()],
        )
        .await
        .unwrap();
    h.service.exclude_intent(greeting.id(), &t2).await.unwrap();

    let mut seen_t1 = labels(&h.service.list_for_scope(&t1).await.unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    seen_t1.sort();
    assert_eq!(seen_t1, ["billing", "farewell", "greeting"]);

    let mut seen_t2 = labels(&h.service.list_for_scope(&t2).await.unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    seen_t2.sort();
    assert_eq!(seen_t2, ["farewell", "shipping"]);

    // the default listing is unaffected by per-scope state
    assert_eq!(h.service.list_default().await.unwrap().len(), 2);
    assert_eq!(h.service.list_all().await.unwrap().len(), 4);
}

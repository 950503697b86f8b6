use travel_catalog::{
    InMemoryDestinationStore,
    models::DestinationRequest,
    rating::RatingSummary,
    repository::DestinationStore,
};

// --- Test Data Helpers ---

fn req(name: &str, location: &str, description: &str) -> DestinationRequest {
    DestinationRequest {
        name: name.to_string(),
        location: location.to_string(),
        description: description.to_string(),
    }
}

async fn seeded() -> InMemoryDestinationStore {
    let store = InMemoryDestinationStore::new();
    store.create(req("Paris", "France", "desc")).await;
    store.create(req("Lima", "Peru", "coast")).await;
    store
}

// --- Create / Get ---

#[tokio::test]
async fn test_create_assigns_sequential_ids_and_zero_rating() {
    let store = InMemoryDestinationStore::new();

    let paris = store.create(req("Paris", "France", "desc")).await;
    assert_eq!(paris.id, 1);
    assert_eq!(paris.average_rating, 0.0);
    assert_eq!(paris.rating_count, 0);

    let lima = store.create(req("Lima", "Peru", "coast")).await;
    assert_eq!(lima.id, 2);
}

#[tokio::test]
async fn test_ids_never_reused_after_delete() {
    let store = seeded().await;

    assert!(store.delete(2).await);
    let next = store.create(req("Cusco", "Peru", "mountains")).await;

    assert_eq!(next.id, 3);
}

#[tokio::test]
async fn test_get_missing_is_absent() {
    let store = seeded().await;
    assert!(store.get(99).await.is_none());
    assert_eq!(store.get(1).await.unwrap().name, "Paris");
}

// --- List ---

#[tokio::test]
async fn test_list_ascending_by_id() {
    let store = seeded().await;
    store.create(req("Quito", "Ecuador", "")).await;

    let ids: Vec<i64> = store.list().await.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_list_is_a_snapshot() {
    let store = seeded().await;
    let before = store.list().await;

    store.update(1, req("Paris!", "France", "changed")).await.unwrap();
    store.delete(2).await;

    assert_eq!(before.len(), 2);
    assert_eq!(before[0].name, "Paris");
    assert_eq!(before[1].name, "Lima");
    assert_eq!(store.list().await.len(), 1);
}

// --- Search ---

#[tokio::test]
async fn test_search_matches_name_case_insensitively() {
    let store = seeded().await;

    let found = store.search("par").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Paris");

    assert_eq!(store.search("PARIS").await.len(), 1);
}

#[tokio::test]
async fn test_search_matches_location() {
    let store = seeded().await;
    let found = store.search("peru").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Lima");
}

#[tokio::test]
async fn test_search_ignores_description() {
    let store = seeded().await;
    assert!(store.search("coast").await.is_empty());
}

#[tokio::test]
async fn test_empty_query_matches_everything() {
    let store = seeded().await;
    assert_eq!(store.search("").await.len(), 2);
}

#[tokio::test]
async fn test_search_without_hits_is_empty() {
    let store = seeded().await;
    assert!(store.search("atlantis").await.is_empty());
}

// --- Update ---

#[tokio::test]
async fn test_update_replaces_text_fields_only() {
    let store = seeded().await;
    store
        .modify_rating(1, &|mut summary: RatingSummary| {
            summary.average = 7.0;
            summary.count = 3;
            summary
        })
        .await
        .unwrap();

    let updated = store
        .update(1, req("Paris", "Île-de-France", "capital"))
        .await
        .unwrap();

    assert_eq!(updated.location, "Île-de-France");
    assert_eq!(updated.description, "capital");
    assert_eq!(updated.average_rating, 7.0);
    assert_eq!(updated.rating_count, 3);
}

#[tokio::test]
async fn test_update_missing_is_absent() {
    let store = seeded().await;
    assert!(store.update(42, req("x", "y", "z")).await.is_none());
}

// --- Delete ---

#[tokio::test]
async fn test_delete_twice_reports_not_found_second_time() {
    let store = seeded().await;

    assert!(store.delete(1).await);
    assert!(!store.delete(1).await);
    assert!(store.get(1).await.is_none());
}

#[tokio::test]
async fn test_deleted_record_rejects_update_and_rating() {
    let store = seeded().await;
    store.delete(1).await;

    assert!(store.update(1, req("a", "b", "c")).await.is_none());
    assert!(store.modify_rating(1, &|summary: RatingSummary| summary).await.is_none());
}

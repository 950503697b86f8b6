use std::sync::Arc;
use travel_catalog::{
    AppError, InMemoryDestinationStore, RatingAggregator,
    models::DestinationRequest,
    repository::{DestinationState, DestinationStore},
};

// --- Test Context ---

struct RatingTestContext {
    destinations: DestinationState,
    ratings: Arc<RatingAggregator>,
}

impl RatingTestContext {
    fn setup() -> Self {
        let destinations: DestinationState = Arc::new(InMemoryDestinationStore::new());
        let ratings = Arc::new(RatingAggregator::new(destinations.clone()));
        Self { destinations, ratings }
    }

    async fn destination(&self, name: &str) -> i64 {
        self.destinations
            .create(DestinationRequest {
                name: name.to_string(),
                location: "Somewhere".to_string(),
                description: String::new(),
            })
            .await
            .id
    }
}

// --- Sequential Behaviour ---

#[tokio::test]
async fn test_two_ratings_average() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;

    let first = ctx.ratings.evaluate(id, 8).await.unwrap();
    assert_eq!(first.average_rating, 8.0);
    assert_eq!(first.rating_count, 1);

    let second = ctx.ratings.evaluate(id, 4).await.unwrap();
    assert_eq!(second.average_rating, 6.0);
    assert_eq!(second.rating_count, 2);
}

#[tokio::test]
async fn test_out_of_range_ratings_leave_record_unchanged() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;
    ctx.ratings.evaluate(id, 7).await.unwrap();

    for bad in [0, 11, -1, i32::MAX] {
        assert_eq!(
            ctx.ratings.evaluate(id, bad).await,
            Err(AppError::InvalidRating(bad))
        );
    }

    let after = ctx.destinations.get(id).await.unwrap();
    assert_eq!(after.average_rating, 7.0);
    assert_eq!(after.rating_count, 1);
}

#[tokio::test]
async fn test_boundary_ratings_accepted() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;

    ctx.ratings.evaluate(id, 1).await.unwrap();
    let updated = ctx.ratings.evaluate(id, 10).await.unwrap();

    assert_eq!(updated.average_rating, 5.5);
    assert_eq!(updated.rating_count, 2);
}

#[tokio::test]
async fn test_rating_missing_destination_is_not_found() {
    let ctx = RatingTestContext::setup();
    assert!(matches!(
        ctx.ratings.evaluate(404, 5).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_rating_checked_before_existence() {
    let ctx = RatingTestContext::setup();
    assert_eq!(
        ctx.ratings.evaluate(404, 0).await,
        Err(AppError::InvalidRating(0))
    );
}

#[tokio::test]
async fn test_rating_leaves_text_fields_alone() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;

    let rated = ctx.ratings.evaluate(id, 9).await.unwrap();
    assert_eq!(rated.name, "Paris");
    assert_eq!(rated.location, "Somewhere");
}

// --- Concurrency ---

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_ratings_lose_no_updates() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let ratings = ctx.ratings.clone();
            tokio::spawn(async move { ratings.evaluate(id, 5).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let final_state = ctx.destinations.get(id).await.unwrap();
    assert_eq!(final_state.rating_count, 100);
    assert_eq!(final_state.average_rating, 5.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_mixed_ratings_keep_exact_mean() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Lima").await;

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let ratings = ctx.ratings.clone();
            let rating = if i % 2 == 0 { 2 } else { 10 };
            tokio::spawn(async move { ratings.evaluate(id, rating).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let final_state = ctx.destinations.get(id).await.unwrap();
    assert_eq!(final_state.rating_count, 200);
    assert!((final_state.average_rating - 6.0).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_ratings_on_different_ids_are_independent() {
    let ctx = RatingTestContext::setup();
    let paris = ctx.destination("Paris").await;
    let lima = ctx.destination("Lima").await;

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let ratings = ctx.ratings.clone();
            let (id, rating) = if i % 2 == 0 { (paris, 3) } else { (lima, 9) };
            tokio::spawn(async move { ratings.evaluate(id, rating).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let paris = ctx.destinations.get(paris).await.unwrap();
    let lima = ctx.destinations.get(lima).await.unwrap();
    assert_eq!((paris.average_rating, paris.rating_count), (3.0, 50));
    assert_eq!((lima.average_rating, lima.rating_count), (9.0, 50));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_ratings_interleaved_with_updates_keep_both() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let ratings = ctx.ratings.clone();
        handles.push(tokio::spawn(async move {
            ratings.evaluate(id, 4).await.map(|_| ())
        }));

        let destinations = ctx.destinations.clone();
        handles.push(tokio::spawn(async move {
            destinations
                .update(
                    id,
                    DestinationRequest {
                        name: format!("Paris {i}"),
                        location: "France".to_string(),
                        description: String::new(),
                    },
                )
                .await
                .map(|_| ())
                .ok_or(AppError::NotFound(id.to_string()))
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let final_state = ctx.destinations.get(id).await.unwrap();
    assert_eq!(final_state.rating_count, 50);
    assert_eq!(final_state.average_rating, 4.0);
    assert_eq!(final_state.location, "France");
}

#[tokio::test]
async fn test_rating_after_delete_is_not_found() {
    let ctx = RatingTestContext::setup();
    let id = ctx.destination("Paris").await;
    ctx.ratings.evaluate(id, 6).await.unwrap();

    assert!(ctx.destinations.delete(id).await);
    assert!(matches!(
        ctx.ratings.evaluate(id, 6).await,
        Err(AppError::NotFound(_))
    ));
}

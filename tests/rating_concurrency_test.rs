mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use common::{response_json, TestApp};
use facility_finder::logging::discard_logger;
use facility_finder::models::{Facility, FacilityType, GeoPoint, RatingAggregate};
use facility_finder::repositories::{DatabaseFacilityRepository, FacilityRepository};
use facility_finder::services::ratings::SubmitRatingRequest;
use facility_finder::services::RatingService;
use facility_finder::{config::AppConfig, db};
use futures::future::join_all;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_http_ratings_are_all_counted() {
    let app = Arc::new(TestApp::new());
    let id = app
        .create_facility("Busy Fountain", 37.78, -122.41, "water_fountain")
        .await;

    let submissions = (0..40).map(|i| {
        let app = app.clone();
        let id = id.clone();
        async move {
            let rating = if i % 2 == 0 { 4 } else { 2 };
            app.post(
                "/api/v1/ratings",
                json!({"facilityId": id, "rating": rating}),
            )
            .await
            .status()
        }
    });
    let statuses = join_all(submissions).await;
    assert!(statuses.iter().all(|s| *s == StatusCode::OK));

    let body = response_json(app.get(&format!("/api/v1/facilities/{}", id)).await).await;
    assert_eq!(body["ratingCount"], 40);
    assert_eq!(body["ratingSum"], 120.0);
    assert_eq!(body["ratingAverage"], 3.0);
}

// Ignored by default because it needs the sqlite driver and a writable temp dir.
// Run with: cargo test -- --ignored database_rating_concurrency
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn database_rating_concurrency() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("facilities.db");
    let mut cfg = AppConfig::new(
        format!("sqlite://{}?mode=rwc", db_path.display()),
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    cfg.db_max_connections = 4;
    cfg.db_min_connections = 1;

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");

    let repository: Arc<dyn FacilityRepository> =
        Arc::new(DatabaseFacilityRepository::new(Arc::new(pool)));
    repository
        .insert(Facility {
            facility_id: "db-facility".into(),
            facility_type: FacilityType::Bathroom,
            name: "Station Restroom".into(),
            address: String::new(),
            location: GeoPoint::new(dec!(37.7549), dec!(-122.4394)).unwrap(),
            created_by: "system".into(),
            created_at: Utc::now(),
            features: Default::default(),
            rating: RatingAggregate::empty(),
        })
        .await
        .expect("insert facility");

    let service = RatingService::new(repository.clone(), discard_logger());
    let mut tasks = vec![];
    for _ in 0..20 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .submit_rating(SubmitRatingRequest {
                    facility_id: Some("db-facility".into()),
                    rating: Some(json!(5)),
                })
                .await
                .is_ok()
        }));
    }
    let mut success = 0u64;
    for t in tasks {
        if t.await.unwrap_or(false) {
            success += 1;
        }
    }

    let stored = repository
        .get("db-facility")
        .await
        .expect("read back")
        .expect("facility exists");
    assert!(success > 0, "no rating went through");
    assert_eq!(
        stored.rating.count, success,
        "aggregate count must equal successful submissions"
    );
    assert_eq!(stored.rating.average(), dec!(5));
}

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rstest::rstest;
use serde_json::{json, Value};

#[tokio::test]
async fn create_search_and_rate_end_to_end() {
    let app = TestApp::new();

    let facility_id = app
        .create_facility("City Mall Restroom", 37.7749, -122.4194, "bathroom")
        .await;

    let response = app
        .get("/api/v1/facilities/nearby?lat=37.7750&lon=-122.4195&radius=1&limit=5")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["count"], 1);
    assert!((body["userLocation"]["lat"].as_f64().unwrap() - 37.775).abs() < 1e-9);
    assert!((body["userLocation"]["lon"].as_f64().unwrap() + 122.4195).abs() < 1e-9);
    let first = &body["facilities"][0];
    assert_eq!(first["facilityId"], facility_id.as_str());
    assert_eq!(first["facilityType"], "bathroom");
    assert_eq!(first["ratingCount"], 0);
    assert_eq!(first["ratingAverage"], 0.0);
    assert_eq!(first["distance"], 0.01);

    let response = app
        .post(
            "/api/v1/ratings",
            json!({"facilityId": facility_id, "rating": 5}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Rating submitted successfully");
    assert_eq!(body["newAverage"], 5.0);
    assert_eq!(body["totalRatings"], 1);

    let response = app
        .post(
            "/api/v1/ratings",
            json!({"facilityId": facility_id, "rating": 3}),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["newAverage"], 4.0);
    assert_eq!(body["totalRatings"], 2);

    let response = app
        .get(&format!("/api/v1/facilities/{}", facility_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "City Mall Restroom");
    assert_eq!(body["createdBy"], "anonymous");
    assert_eq!(body["ratingCount"], 2);
    assert_eq!(body["ratingSum"], 8.0);
    assert_eq!(body["ratingAverage"], 4.0);
    assert_eq!(body["features"], json!({}));
}

#[tokio::test]
async fn creator_comes_from_identity_header() {
    let app = TestApp::new();
    let response = app
        .request(
            Method::POST,
            "/api/v1/facilities",
            Some(json!({
                "name": "Library Sink",
                "lat": "37.7949",
                "lon": "-122.3994",
                "facilityType": "sink",
                "address": "321 Library St",
                "features": {"soap_available": true}
            })),
            &[("x-user-sub", "user-7")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response_json(response).await["facilityId"]
        .as_str()
        .unwrap()
        .to_string();

    let body = response_json(app.get(&format!("/api/v1/facilities/{}", id)).await).await;
    assert_eq!(body["createdBy"], "user-7");
    assert_eq!(body["address"], "321 Library St");
    assert_eq!(body["features"]["soap_available"], true);
}

#[rstest]
#[case(json!({"lat": 1.0, "lon": 1.0, "facilityType": "sink"}), "Missing name")]
#[case(json!({"name": "x", "lon": 1.0, "facilityType": "sink"}), "Missing lat")]
#[case(json!({"name": "x", "lat": 1.0, "facilityType": "sink"}), "Missing lon")]
#[case(json!({"name": "x", "lat": 1.0, "lon": 1.0}), "Missing facilityType")]
#[tokio::test]
async fn create_rejects_missing_fields(#[case] body: Value, #[case] expected: &str) {
    let app = TestApp::new();
    let response = app.post("/api/v1/facilities", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await, json!({"error": expected}));
}

#[rstest]
#[case(json!({"name": "x", "lat": 1.0, "lon": 1.0, "facilityType": "shower"}))]
#[case(json!({"name": "x", "lat": "north", "lon": 1.0, "facilityType": "sink"}))]
#[case(json!({"name": "x", "lat": 1.0, "lon": 200.0, "facilityType": "sink"}))]
#[case(json!({"name": "x", "lat": 1.0, "lon": 1.0, "facilityType": "sink", "features": {"free": "yes"}}))]
#[tokio::test]
async fn create_rejects_invalid_fields(#[case] body: Value) {
    let app = TestApp::new();
    let response = app.post("/api/v1/facilities", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(body.as_object().map(|o| o.len()), Some(1));
    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_with_error_body() {
    let app = TestApp::new();
    let response = app.post_raw("/api/v1/ratings", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[rstest]
#[case("/api/v1/facilities/nearby?lon=-122.4", StatusCode::BAD_REQUEST, "Missing lat or lon parameters")]
#[case("/api/v1/facilities/nearby?lat=&lon=-122.4", StatusCode::BAD_REQUEST, "Missing lat or lon parameters")]
#[tokio::test]
async fn nearby_requires_coordinates(
    #[case] uri: &str,
    #[case] status: StatusCode,
    #[case] message: &str,
) {
    let app = TestApp::new();
    let response = app.get(uri).await;
    assert_eq!(response.status(), status);
    assert_eq!(response_json(response).await["error"], message);
}

#[rstest]
#[case("lat=abc&lon=1")]
#[case("lat=1&lon=1&radius=0")]
#[case("lat=1&lon=1&radius=-2")]
#[case("lat=1&lon=1&limit=0")]
#[case("lat=1&lon=1&limit=ten")]
#[case("lat=1&lon=1&facilityType=shower")]
#[case("lat=95&lon=1")]
#[tokio::test]
async fn nearby_rejects_invalid_parameters(#[case] query: &str) {
    let app = TestApp::new();
    let response = app
        .get(&format!("/api/v1/facilities/nearby?{}", query))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", query);
}

#[tokio::test]
async fn nearby_type_filter_and_empty_type() {
    let app = TestApp::new();
    app.create_facility("Restroom", 37.7749, -122.4194, "bathroom")
        .await;
    app.create_facility("Fountain", 37.7750, -122.4190, "water_fountain")
        .await;

    let body = response_json(
        app.get("/api/v1/facilities/nearby?lat=37.7749&lon=-122.4194&facilityType=water_fountain")
            .await,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["facilities"][0]["name"], "Fountain");

    let body = response_json(
        app.get("/api/v1/facilities/nearby?lat=37.7749&lon=-122.4194&facilityType=")
            .await,
    )
    .await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["facilities"][0]["name"], "Restroom");
}

#[tokio::test]
async fn unknown_facility_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/api/v1/facilities/no-such-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(response).await,
        json!({"error": "Facility not found"})
    );

    let response = app
        .post(
            "/api/v1/ratings",
            json!({"facilityId": "no-such-id", "rating": 4}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_routes_use_json_error_body() {
    let app = TestApp::new();

    let response = app.get("/api/v1/bathrooms").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await, json!({"error": "Not found"}));

    let response = app
        .request(Method::DELETE, "/api/v1/facilities/abc", None, &[])
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response_json(response).await,
        json!({"error": "Method not allowed"})
    );
}

#[rstest]
#[case(json!({"facilityId": "x"}), "Missing rating")]
#[case(json!({"rating": 4}), "Missing facilityId")]
#[case(json!({"facilityId": "x", "rating": 0}), "Rating must be between 1 and 5")]
#[case(json!({"facilityId": "x", "rating": 6}), "Rating must be between 1 and 5")]
#[case(json!({"facilityId": "x", "rating": "5"}), "Rating must be a number")]
#[tokio::test]
async fn rating_validation_messages(#[case] body: Value, #[case] expected: &str) {
    let app = TestApp::new();
    let response = app.post("/api/v1/ratings", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await, json!({"error": expected}));
}

#[tokio::test]
async fn read_endpoints_carry_cors_headers() {
    let app = TestApp::new();
    let id = app.create_facility("Sink", 1.0, 1.0, "sink").await;

    for uri in [
        "/api/v1/facilities/nearby?lat=1&lon=1".to_string(),
        format!("/api/v1/facilities/{}", id),
    ] {
        let response = app.get(&uri).await;
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    }
}

#[tokio::test]
async fn responses_echo_request_id() {
    let app = TestApp::new();

    let response = app
        .request(
            Method::GET,
            "/api/v1/facilities/nearby?lat=1&lon=1",
            None,
            &[("x-request-id", "trace-abc")],
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "trace-abc");

    let response = app.get("/api/v1/facilities/missing").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn health_endpoints_report_in_memory_store() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "up");

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["details"]["store"]["message"], "in-memory");
}

#[tokio::test]
async fn nearby_defaults_come_from_config() {
    let mut cfg = common::test_config();
    cfg.nearby_default_limit = 1;
    cfg.nearby_default_radius_km = 50.0;
    let app = TestApp::with_config(cfg);

    app.create_facility("Near", 0.0, 0.1, "sink").await;
    app.create_facility("Far", 0.0, 0.3, "sink").await;

    let body = response_json(app.get("/api/v1/facilities/nearby?lat=0&lon=0").await).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["facilities"][0]["name"], "Near");
}

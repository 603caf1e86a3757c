#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use facility_finder::{
    build_cors_layer, build_router, config::AppConfig, logging::discard_logger,
    repositories::{FacilityRepository, InMemoryFacilityRepository},
    AppState,
};

/// Helper harness that drives the full router against an in-memory store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub repository: Arc<InMemoryFacilityRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(cfg: AppConfig) -> Self {
        let repository = Arc::new(InMemoryFacilityRepository::new());
        let (router, state) = router_with_store(cfg, repository.clone());

        Self {
            router,
            state,
            repository,
        }
    }

    /// Routes requests to an arbitrary store; the in-memory handle stays empty.
    pub fn with_store(store: Arc<dyn FacilityRepository>) -> Self {
        let (router, state) = router_with_store(test_config(), store);

        Self {
            router,
            state,
            repository: Arc::new(InMemoryFacilityRepository::new()),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, &[]).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body), &[]).await
    }

    /// Sends raw bytes as a JSON body, for malformed-payload cases.
    pub async fn post_raw(&self, uri: &str, raw: &'static str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a facility through the API and returns its id.
    pub async fn create_facility(&self, name: &str, lat: f64, lon: f64, facility_type: &str) -> String {
        let response = self
            .post(
                "/api/v1/facilities",
                json!({
                    "name": name,
                    "lat": lat,
                    "lon": lon,
                    "facilityType": facility_type,
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "facility creation failed");
        let body = response_json(response).await;
        body["facilityId"]
            .as_str()
            .expect("facilityId missing from response")
            .to_string()
    }
}

fn router_with_store(cfg: AppConfig, store: Arc<dyn FacilityRepository>) -> (Router, AppState) {
    let cors = build_cors_layer(&cfg).expect("test config must allow CORS");
    let state = AppState::new(cfg, store, &discard_logger());
    (build_router(state.clone(), cors), state)
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    cfg.store_backend = "in-memory".to_string();
    cfg.cors_allow_any_origin = true;
    cfg
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

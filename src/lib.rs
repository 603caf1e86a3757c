//! Facility Finder Library
//!
//! Location-based directory of public bathrooms, water fountains, hand
//! sanitizer stations and sinks: registration, nearby search and ratings.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod seed;
pub mod services;
pub mod tracing;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use slog::Logger;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::AppConfig;
use crate::repositories::FacilityRepository;
use crate::services::NearbyDefaults;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Arc<dyn FacilityRepository>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repository: Arc<dyn FacilityRepository>,
        base_logger: &Logger,
    ) -> Self {
        let defaults = NearbyDefaults {
            radius_km: config.nearby_default_radius_km,
            limit: config.nearby_default_limit as usize,
        };
        let services = handlers::AppServices::new(repository.clone(), defaults, base_logger);

        Self {
            config: Arc::new(config),
            repository,
            services,
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/facilities", post(handlers::facilities::create_facility))
        .route("/facilities/nearby", get(handlers::facilities::find_nearby))
        .route(
            "/facilities/:facility_id",
            get(handlers::facilities::get_facility),
        )
        .route("/ratings", post(handlers::ratings::submit_rating))
}

/// CORS policy from config: explicit origins when configured, otherwise
/// permissive where the environment allows it. `None` means misconfigured.
pub fn build_cors_layer(cfg: &AppConfig) -> Option<CorsLayer> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// Full HTTP surface: v1 API, health, Swagger UI and the middleware stack.
pub fn build_router(state: AppState, cors_layer: CorsLayer) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);
    let repository = state.repository.clone();

    Router::<AppState>::new()
        .nest("/api/v1", api_v1_routes())
        .nest("/health", health::health_routes(repository))
        .merge(openapi::swagger_ui())
        .fallback(handlers::common::route_not_found)
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(request_timeout))
        // Timeouts and method mismatches carry the same error body as handlers
        .layer(axum::middleware::map_response(
            middleware_helpers::json_error_body,
        ))
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::errors::*;
    pub use crate::models::*;
    pub use crate::repositories::*;
    pub use crate::services::*;
}

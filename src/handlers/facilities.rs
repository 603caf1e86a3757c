use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    Json,
};

use super::common::{created_response, success_response, with_cors_headers};
use crate::auth::CallerIdentity;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::facilities::{
    CreateFacilityRequest, CreateFacilityResponse, FacilityDetail, NearbyQuery, NearbyResult,
};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/facilities",
    request_body = CreateFacilityRequest,
    params(
        ("x-user-sub" = Option<String>, Header, description = "Verified caller subject forwarded by the identity provider")
    ),
    responses(
        (status = 201, description = "Facility created", body = CreateFacilityResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tag = "facilities"
)]
pub async fn create_facility(
    State(state): State<AppState>,
    identity: CallerIdentity,
    payload: Result<Json<CreateFacilityRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(request) = payload?;

    let facility_id = state
        .services
        .facilities
        .create_facility(request, identity.subject)
        .await?;

    Ok(created_response(CreateFacilityResponse { facility_id }))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Facilities within the radius, nearest first", body = NearbyResult),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tag = "facilities"
)]
pub async fn find_nearby(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Response, ServiceError> {
    let Query(query) = query?;
    let result = state.services.facilities.find_nearby(query).await?;
    Ok(with_cors_headers(success_response(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facilityId}",
    params(
        ("facilityId" = String, Path, description = "Facility ID")
    ),
    responses(
        (status = 200, description = "Facility fetched", body = FacilityDetail),
        (status = 404, description = "Facility not found", body = ErrorResponse)
    ),
    tag = "facilities"
)]
pub async fn get_facility(
    State(state): State<AppState>,
    Path(facility_id): Path<String>,
) -> Result<Response, ServiceError> {
    let detail = state.services.facilities.get_facility(&facility_id).await?;
    Ok(with_cors_headers(success_response(detail)))
}

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::errors::{ErrorResponse, ServiceError};
use crate::services::ratings::{RatingOutcome, SubmitRatingRequest};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/ratings",
    request_body = SubmitRatingRequest,
    responses(
        (status = 200, description = "Rating recorded", body = RatingOutcome),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 404, description = "Facility not found", body = ErrorResponse)
    ),
    tag = "ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRatingRequest>, JsonRejection>,
) -> Result<Json<RatingOutcome>, ServiceError> {
    let Json(request) = payload?;
    let outcome = state.services.ratings.submit_rating(request).await?;
    Ok(Json(outcome))
}

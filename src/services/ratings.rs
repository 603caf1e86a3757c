use metrics::counter;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::models::facility::{decimal_from_json, MAX_RATING, MIN_RATING};
use crate::repositories::FacilityRepository;

pub const RATING_ACCEPTED_MESSAGE: &str = "Rating submitted successfully";

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    #[schema(example = "facility_001")]
    pub facility_id: Option<String>,
    /// Rating between 1 and 5 inclusive
    #[schema(value_type = Option<f64>, example = 4.5)]
    pub rating: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    #[schema(example = "Rating submitted successfully")]
    pub message: String,
    pub new_average: f64,
    pub total_ratings: u64,
}

/// Service that folds user ratings into each facility's running aggregate
#[derive(Clone)]
pub struct RatingService {
    repository: Arc<dyn FacilityRepository>,
    logger: Logger,
}

impl RatingService {
    pub fn new(repository: Arc<dyn FacilityRepository>, logger: Logger) -> Self {
        Self { repository, logger }
    }

    /// Records one rating and returns the facility's new average and count.
    #[instrument(skip(self))]
    pub async fn submit_rating(
        &self,
        request: SubmitRatingRequest,
    ) -> Result<RatingOutcome, ServiceError> {
        let facility_id = request
            .facility_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::missing("facilityId"))?;
        let rating = match request.rating {
            None | Some(Value::Null) => return Err(ServiceError::missing("rating")),
            Some(value) => Self::validate_rating(&value)?,
        };

        let aggregate = self
            .repository
            .apply_rating(facility_id, rating)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Facility not found".to_string()))?;

        counter!("facility.ratings.submitted", 1);
        slog::info!(self.logger, "Rating applied";
            "facility_id" => facility_id,
            "rating" => rating.to_f64().unwrap_or_default(),
            "total_ratings" => aggregate.count
        );

        Ok(RatingOutcome {
            message: RATING_ACCEPTED_MESSAGE.to_string(),
            new_average: aggregate.average_f64(),
            total_ratings: aggregate.count,
        })
    }

    /// Only JSON numbers in [1, 5] are accepted; numeric strings are not.
    fn validate_rating(value: &Value) -> Result<Decimal, ServiceError> {
        if !value.is_number() {
            return Err(ServiceError::invalid("Rating must be a number"));
        }
        let rating = decimal_from_json("rating", value)?;
        if rating < MIN_RATING || rating > MAX_RATING {
            return Err(ServiceError::invalid("Rating must be between 1 and 5"));
        }
        Ok(rating)
    }
}

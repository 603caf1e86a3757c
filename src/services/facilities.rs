use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slog::Logger;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::facility::{decimal_from_json, parse_decimal};
use crate::models::{Facility, FacilityType, GeoPoint, NewFacility, ANONYMOUS_CREATOR};
use crate::repositories::FacilityRepository;
use crate::services::geo;

/// Body of a facility creation request. Every field is optional at the
/// serde level so that absence is reported as a missing parameter.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
    #[schema(example = "City Mall Restroom")]
    pub name: Option<String>,
    /// Latitude as a JSON number or numeric string
    #[schema(value_type = Option<f64>, example = 37.7749)]
    pub lat: Option<Value>,
    /// Longitude as a JSON number or numeric string
    #[schema(value_type = Option<f64>, example = -122.4194)]
    pub lon: Option<Value>,
    #[schema(example = "bathroom")]
    pub facility_type: Option<String>,
    #[schema(example = "123 Main St, Downtown")]
    pub address: Option<String>,
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityResponse {
    pub facility_id: String,
}

/// Raw nearby query string; numeric fields are parsed by the service.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    /// Latitude of the query point
    pub lat: Option<String>,
    /// Longitude of the query point
    pub lon: Option<String>,
    /// Restrict results to one facility type
    pub facility_type: Option<String>,
    /// Maximum number of results (default 10)
    pub limit: Option<String>,
    /// Search radius in kilometres (default 5)
    pub radius: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityResult {
    pub facility_id: String,
    pub facility_type: FacilityType,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub rating_average: f64,
    pub rating_count: u64,
    /// Distance from the query point in km, rounded to 2 places
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct UserLocation {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResult {
    pub facilities: Vec<FacilityResult>,
    pub count: usize,
    pub user_location: UserLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDetail {
    pub facility_id: String,
    pub facility_type: FacilityType,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub features: BTreeMap<String, bool>,
    pub rating_average: f64,
    pub rating_count: u64,
    pub rating_sum: f64,
}

impl From<Facility> for FacilityDetail {
    fn from(facility: Facility) -> Self {
        Self {
            lat: facility.location.lat_f64(),
            lon: facility.location.lon_f64(),
            rating_average: facility.rating.average_f64(),
            rating_count: facility.rating.count,
            rating_sum: facility.rating.sum.to_f64().unwrap_or_default(),
            facility_id: facility.facility_id,
            facility_type: facility.facility_type,
            name: facility.name,
            address: facility.address,
            created_by: facility.created_by,
            created_at: facility.created_at,
            features: facility.features,
        }
    }
}

/// Defaults applied when a nearby query omits radius or limit.
#[derive(Debug, Clone, Copy)]
pub struct NearbyDefaults {
    pub radius_km: f64,
    pub limit: usize,
}

impl Default for NearbyDefaults {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            limit: 10,
        }
    }
}

/// Validated nearby search parameters.
#[derive(Debug, Clone, Copy)]
struct NearbySearch {
    origin: GeoPoint,
    facility_type: Option<FacilityType>,
    radius_km: f64,
    limit: usize,
}

/// Treats empty or whitespace-only query values as absent.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn json_present(value: &Option<Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

/// Service for registering, looking up and searching facilities
#[derive(Clone)]
pub struct FacilityService {
    repository: Arc<dyn FacilityRepository>,
    defaults: NearbyDefaults,
    logger: Logger,
}

impl FacilityService {
    pub fn new(
        repository: Arc<dyn FacilityRepository>,
        defaults: NearbyDefaults,
        logger: Logger,
    ) -> Self {
        Self {
            repository,
            defaults,
            logger,
        }
    }

    /// Registers a facility and returns its generated id.
    #[instrument(skip(self, request))]
    pub async fn create_facility(
        &self,
        request: CreateFacilityRequest,
        created_by: Option<String>,
    ) -> Result<String, ServiceError> {
        let new_facility = Self::validate_new_facility(request, created_by)?;

        let facility_id = Uuid::new_v4().to_string();
        let facility = new_facility.into_facility(facility_id.clone(), Utc::now());
        let facility_type = facility.facility_type;

        self.repository.insert(facility).await?;

        counter!("facility.created", 1);
        slog::info!(self.logger, "Facility created";
            "facility_id" => &facility_id,
            "facility_type" => facility_type.as_ref()
        );
        Ok(facility_id)
    }

    fn validate_new_facility(
        request: CreateFacilityRequest,
        created_by: Option<String>,
    ) -> Result<NewFacility, ServiceError> {
        let name = non_blank(&request.name)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::missing("name"))?;
        let lat = json_present(&request.lat).ok_or_else(|| ServiceError::missing("lat"))?;
        let lon = json_present(&request.lon).ok_or_else(|| ServiceError::missing("lon"))?;
        let facility_type =
            non_blank(&request.facility_type).ok_or_else(|| ServiceError::missing("facilityType"))?;

        let facility_type = FacilityType::parse(facility_type)?;
        let location = GeoPoint::new(decimal_from_json("lat", lat)?, decimal_from_json("lon", lon)?)?;

        let created_by = created_by
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| ANONYMOUS_CREATOR.to_string());

        Ok(NewFacility {
            facility_type,
            name,
            address: request.address.unwrap_or_default(),
            location,
            created_by,
            features: request.features.unwrap_or_default(),
        })
    }

    /// Fetches the full record for one facility.
    #[instrument(skip(self))]
    pub async fn get_facility(&self, facility_id: &str) -> Result<FacilityDetail, ServiceError> {
        let facility_id = facility_id.trim();
        if facility_id.is_empty() {
            return Err(ServiceError::missing("facilityId"));
        }

        self.repository
            .get(facility_id)
            .await?
            .map(FacilityDetail::from)
            .ok_or_else(|| ServiceError::NotFound("Facility not found".to_string()))
    }

    /// Facilities within the radius of a point, nearest first.
    #[instrument(skip(self))]
    pub async fn find_nearby(&self, query: NearbyQuery) -> Result<NearbyResult, ServiceError> {
        let search = self.validate_nearby(&query)?;
        let origin_lat = search.origin.lat_f64();
        let origin_lon = search.origin.lon_f64();

        let facilities = self.repository.scan().await?;
        let scanned = facilities.len();

        let mut matches: Vec<(f64, Facility)> = Vec::new();
        for facility in facilities {
            if search
                .facility_type
                .is_some_and(|wanted| wanted != facility.facility_type)
            {
                continue;
            }
            let distance = geo::distance_km(
                origin_lat,
                origin_lon,
                facility.location.lat_f64(),
                facility.location.lon_f64(),
            )?;
            if distance <= search.radius_km {
                matches.push((distance, facility));
            }
        }

        // sort_by is stable, so equal distances keep scan order
        matches.sort_by(|a, b| a.0.total_cmp(&b.0));
        matches.truncate(search.limit);

        let results: Vec<FacilityResult> = matches
            .into_iter()
            .map(|(distance, facility)| FacilityResult {
                lat: facility.location.lat_f64(),
                lon: facility.location.lon_f64(),
                rating_average: facility.rating.average_f64(),
                rating_count: facility.rating.count,
                distance: geo::round_km(distance),
                facility_id: facility.facility_id,
                facility_type: facility.facility_type,
                name: facility.name,
                address: facility.address,
            })
            .collect();

        histogram!("facility.nearby.scanned", scanned as f64);
        histogram!("facility.nearby.returned", results.len() as f64);
        slog::debug!(self.logger, "Nearby search completed";
            "scanned" => scanned,
            "returned" => results.len(),
            "radius_km" => search.radius_km
        );

        Ok(NearbyResult {
            count: results.len(),
            facilities: results,
            user_location: UserLocation {
                lat: origin_lat,
                lon: origin_lon,
            },
        })
    }

    fn validate_nearby(&self, query: &NearbyQuery) -> Result<NearbySearch, ServiceError> {
        let (lat, lon) = match (non_blank(&query.lat), non_blank(&query.lon)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(ServiceError::MissingParameter(
                    "Missing lat or lon parameters".to_string(),
                ))
            }
        };
        let origin = GeoPoint::new(parse_decimal("lat", lat)?, parse_decimal("lon", lon)?)?;

        let facility_type = non_blank(&query.facility_type)
            .map(FacilityType::parse)
            .transpose()?;

        let radius_km = match non_blank(&query.radius) {
            None => self.defaults.radius_km,
            Some(raw) => {
                let radius = raw.trim().parse::<f64>().map_err(|_| {
                    ServiceError::invalid(format!("radius must be a number, got '{}'", raw))
                })?;
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(ServiceError::invalid(format!(
                        "radius must be a positive number, got '{}'",
                        raw
                    )));
                }
                radius
            }
        };

        let limit = match non_blank(&query.limit) {
            None => self.defaults.limit,
            Some(raw) => match raw.parse::<i64>() {
                Ok(limit) if limit > 0 => usize::try_from(limit).unwrap_or(usize::MAX),
                _ => {
                    return Err(ServiceError::invalid(format!(
                        "limit must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
        };

        Ok(NearbySearch {
            origin,
            facility_type,
            radius_km,
            limit,
        })
    }
}

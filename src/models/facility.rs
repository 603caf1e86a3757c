use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Creator recorded when no authenticated subject is available.
pub const ANONYMOUS_CREATOR: &str = "anonymous";

pub const MIN_RATING: Decimal = Decimal::ONE;
pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Kind of public facility a record describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacilityType {
    Bathroom,
    WaterFountain,
    HandSanitizer,
    Sink,
}

impl FacilityType {
    /// Parses a wire value, rejecting anything outside the fixed set.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        FacilityType::from_str(raw).map_err(|_| {
            let valid: Vec<String> = FacilityType::iter().map(|t| t.to_string()).collect();
            ServiceError::invalid(format!(
                "Invalid facility type. Must be one of: {}",
                valid.join(", ")
            ))
        })
    }
}

/// A validated latitude/longitude pair stored as exact decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Decimal,
    pub lon: Decimal,
}

impl GeoPoint {
    /// Builds a point, enforcing latitude in [-90, 90] and longitude in [-180, 180].
    pub fn new(lat: Decimal, lon: Decimal) -> Result<Self, ServiceError> {
        if lat < Decimal::from(-90) || lat > Decimal::from(90) {
            return Err(ServiceError::invalid(format!(
                "lat must be between -90 and 90, got {}",
                lat
            )));
        }
        if lon < Decimal::from(-180) || lon > Decimal::from(180) {
            return Err(ServiceError::invalid(format!(
                "lon must be between -180 and 180, got {}",
                lon
            )));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat_f64(&self) -> f64 {
        self.lat.to_f64().unwrap_or_default()
    }

    pub fn lon_f64(&self) -> f64 {
        self.lon.to_f64().unwrap_or_default()
    }
}

/// Running (count, sum, average) triple kept per facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub count: u64,
    pub sum: Decimal,
}

impl RatingAggregate {
    pub fn empty() -> Self {
        Self {
            count: 0,
            sum: Decimal::ZERO,
        }
    }

    /// Folds one more rating into the aggregate.
    pub fn with_rating(self, rating: Decimal) -> Self {
        Self {
            count: self.count + 1,
            sum: self.sum + rating,
        }
    }

    /// Mean rating; 0 when nothing has been rated yet.
    pub fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.sum / Decimal::from(self.count)
        }
    }

    pub fn average_f64(&self) -> f64 {
        self.average().to_f64().unwrap_or_default()
    }
}

impl Default for RatingAggregate {
    fn default() -> Self {
        Self::empty()
    }
}

/// Persisted facility record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: String,
    pub facility_type: FacilityType,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub features: BTreeMap<String, bool>,
    pub rating: RatingAggregate,
}

/// Input accepted by the repository insert.
#[derive(Debug, Clone)]
pub struct NewFacility {
    pub facility_type: FacilityType,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub created_by: String,
    pub features: BTreeMap<String, bool>,
}

impl NewFacility {
    pub fn into_facility(self, facility_id: String, created_at: DateTime<Utc>) -> Facility {
        Facility {
            facility_id,
            facility_type: self.facility_type,
            name: self.name,
            address: self.address,
            location: self.location,
            created_by: self.created_by,
            created_at,
            features: self.features,
            rating: RatingAggregate::empty(),
        }
    }
}

/// Parses a numeric coordinate from text, failing on anything non-numeric.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ServiceError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ServiceError::invalid(format!("{} must be a number, got '{}'", field, raw)))
}

/// Parses a JSON value that may be a number or a numeric string.
pub fn decimal_from_json(field: &str, value: &serde_json::Value) -> Result<Decimal, ServiceError> {
    match value {
        serde_json::Value::Number(n) => parse_decimal(field, &n.to_string()),
        serde_json::Value::String(s) => parse_decimal(field, s),
        _ => Err(ServiceError::invalid(format!("{} must be a number", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn facility_type_round_trips_wire_names() {
        assert_eq!(
            FacilityType::parse("water_fountain").unwrap(),
            FacilityType::WaterFountain
        );
        assert_eq!(FacilityType::HandSanitizer.to_string(), "hand_sanitizer");
        assert_eq!(
            serde_json::to_value(FacilityType::Sink).unwrap(),
            serde_json::json!("sink")
        );
    }

    #[test]
    fn unknown_facility_type_is_invalid_argument() {
        assert_matches!(
            FacilityType::parse("shower"),
            Err(ServiceError::InvalidArgument(msg)) if msg.contains("bathroom")
        );
        assert_matches!(
            FacilityType::parse("Bathroom"),
            Err(ServiceError::InvalidArgument(_))
        );
    }

    #[test]
    fn geo_point_enforces_ranges() {
        assert!(GeoPoint::new(dec!(90), dec!(180)).is_ok());
        assert!(GeoPoint::new(dec!(-90), dec!(-180)).is_ok());
        assert_matches!(
            GeoPoint::new(dec!(90.0001), dec!(0)),
            Err(ServiceError::InvalidArgument(_))
        );
        assert_matches!(
            GeoPoint::new(dec!(0), dec!(-180.5)),
            Err(ServiceError::InvalidArgument(_))
        );
    }

    #[test]
    fn aggregate_average_tracks_sum_over_count() {
        let agg = RatingAggregate::empty();
        assert_eq!(agg.average(), Decimal::ZERO);

        let agg = agg.with_rating(dec!(5)).with_rating(dec!(1));
        assert_eq!(agg.count, 2);
        assert_eq!(agg.sum, dec!(6));
        assert_eq!(agg.average(), dec!(3));
    }

    #[test]
    fn numeric_parsing_rejects_text() {
        assert_eq!(parse_decimal("lat", " 37.7749 ").unwrap(), dec!(37.7749));
        assert_eq!(parse_decimal("lat", "1e1").unwrap(), dec!(10));
        assert_matches!(
            parse_decimal("lat", "north"),
            Err(ServiceError::InvalidArgument(msg)) if msg.starts_with("lat")
        );
        assert_matches!(
            decimal_from_json("lon", &serde_json::json!(true)),
            Err(ServiceError::InvalidArgument(_))
        );
        assert_eq!(
            decimal_from_json("lon", &serde_json::json!(-122.4194)).unwrap(),
            dec!(-122.4194)
        );
    }
}

//! Great-circle distance between coordinates.

use crate::errors::ServiceError;
use crate::models::facility::parse_decimal;
use rust_decimal::prelude::ToPrimitive;

/// Mean Earth radius used for every distance computation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1_rad, lon1_rad) = (lat1.to_radians(), lon1.to_radians());
    let (lat2_rad, lon2_rad) = (lat2.to_radians(), lon2.to_radians());
    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;
    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // clamp guards sqrt(1 - a) against a drifting past 1.0
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Checked distance; rejects NaN and infinite coordinates.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, ServiceError> {
    for (name, value) in [("lat1", lat1), ("lon1", lon1), ("lat2", lat2), ("lon2", lon2)] {
        if !value.is_finite() {
            return Err(ServiceError::invalid(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }
    }
    Ok(haversine_km(lat1, lon1, lat2, lon2))
}

/// Parses a textual coordinate into degrees.
pub fn parse_coordinate(field: &str, raw: &str) -> Result<f64, ServiceError> {
    parse_decimal(field, raw)?
        .to_f64()
        .ok_or_else(|| ServiceError::invalid(format!("{} is out of range", field)))
}

/// Rounds a distance to two decimal places for display.
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

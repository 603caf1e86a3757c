use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ServiceError;
use crate::models::{Facility, FacilityType, GeoPoint, RatingAggregate};

/// Facility row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "facilities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub facility_id: String,
    pub facility_type: String,
    pub name: String,
    pub address: String,
    pub lat: Decimal,
    pub lon: Decimal,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[sea_orm(column_type = "Json")]
    pub features: Json,
    pub rating_count: i64,
    pub rating_sum: Decimal,
    pub rating_average: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Facility {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let facility_type = FacilityType::parse(&model.facility_type).map_err(|_| {
            ServiceError::Internal(format!(
                "facility {} has unknown stored type '{}'",
                model.facility_id, model.facility_type
            ))
        })?;
        let features: BTreeMap<String, bool> = match model.features {
            Json::Null => BTreeMap::new(),
            raw => serde_json::from_value(raw).map_err(|e| {
                ServiceError::Internal(format!(
                    "facility {} has malformed features: {}",
                    model.facility_id, e
                ))
            })?,
        };

        Ok(Facility {
            facility_id: model.facility_id,
            facility_type,
            name: model.name,
            address: model.address,
            location: GeoPoint {
                lat: model.lat,
                lon: model.lon,
            },
            created_by: model.created_by,
            created_at: model.created_at,
            features,
            rating: RatingAggregate {
                count: u64::try_from(model.rating_count).unwrap_or_default(),
                sum: model.rating_sum,
            },
        })
    }
}

impl From<&Facility> for ActiveModel {
    fn from(facility: &Facility) -> Self {
        let features = serde_json::to_value(&facility.features).unwrap_or_else(|_| Json::Null);
        ActiveModel {
            facility_id: Set(facility.facility_id.clone()),
            facility_type: Set(facility.facility_type.to_string()),
            name: Set(facility.name.clone()),
            address: Set(facility.address.clone()),
            lat: Set(facility.location.lat),
            lon: Set(facility.location.lon),
            created_by: Set(facility.created_by.clone()),
            created_at: Set(facility.created_at),
            features: Set(features),
            rating_count: Set(i64::try_from(facility.rating.count).unwrap_or(i64::MAX)),
            rating_sum: Set(facility.rating.sum),
            rating_average: Set(facility.rating.average()),
        }
    }
}

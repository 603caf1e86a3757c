//! Sample San Francisco facilities used to populate a fresh store.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tracing::info;

use crate::errors::ServiceError;
use crate::models::{Facility, FacilityType, GeoPoint, RatingAggregate};
use crate::repositories::FacilityRepository;

pub const SEED_CREATOR: &str = "system";

struct SampleFacility {
    id: &'static str,
    facility_type: FacilityType,
    name: &'static str,
    address: &'static str,
    lat: Decimal,
    lon: Decimal,
    features: &'static [(&'static str, bool)],
    rating_count: u64,
    rating_sum: Decimal,
}

const SAMPLES: &[SampleFacility] = &[
    SampleFacility {
        id: "facility_001",
        facility_type: FacilityType::Bathroom,
        name: "City Mall Restroom",
        address: "123 Main St, Downtown",
        lat: dec!(37.7749),
        lon: dec!(-122.4194),
        features: &[
            ("wheelchair", true),
            ("baby-changing", true),
            ("handicap-accessible", true),
            ("free", true),
        ],
        rating_count: 156,
        rating_sum: dec!(655.2),
    },
    SampleFacility {
        id: "facility_002",
        facility_type: FacilityType::WaterFountain,
        name: "Central Park Water Fountain",
        address: "456 Park Ave",
        lat: dec!(37.7849),
        lon: dec!(-122.4094),
        features: &[("filtered-water", true), ("bottle-fill", true), ("free", true)],
        rating_count: 89,
        rating_sum: dec!(400.5),
    },
    SampleFacility {
        id: "facility_003",
        facility_type: FacilityType::HandSanitizer,
        name: "Airport Terminal Sanitizer Station",
        address: "789 Airport Blvd",
        lat: dec!(37.7649),
        lon: dec!(-122.4294),
        features: &[("touchless", true), ("free", true), ("refillable", true)],
        rating_count: 234,
        rating_sum: dec!(1053.0),
    },
    SampleFacility {
        id: "facility_004",
        facility_type: FacilityType::Sink,
        name: "Public Library Hand Washing Station",
        address: "321 Library St",
        lat: dec!(37.7949),
        lon: dec!(-122.3994),
        features: &[
            ("hot-water", true),
            ("soap-dispenser", true),
            ("paper-towels", true),
            ("free", true),
        ],
        rating_count: 67,
        rating_sum: dec!(301.5),
    },
    SampleFacility {
        id: "facility_005",
        facility_type: FacilityType::Bathroom,
        name: "Gas Station Restroom",
        address: "555 Highway 101",
        lat: dec!(37.7549),
        lon: dec!(-122.4394),
        features: &[("24-hours", true), ("free", false), ("coin-operated", true)],
        rating_count: 45,
        rating_sum: dec!(180.0),
    },
    SampleFacility {
        id: "facility_006",
        facility_type: FacilityType::WaterFountain,
        name: "University Campus Fountain",
        address: "999 University Ave",
        lat: dec!(37.8049),
        lon: dec!(-122.3894),
        features: &[
            ("filtered-water", true),
            ("bottle-fill", true),
            ("free", true),
            ("cold-water", true),
        ],
        rating_count: 123,
        rating_sum: dec!(553.5),
    },
];

/// The sample catalog, with creation times one second apart from `base`.
pub fn sample_facilities(base: DateTime<Utc>) -> Vec<Facility> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, sample)| Facility {
            facility_id: sample.id.to_string(),
            facility_type: sample.facility_type,
            name: sample.name.to_string(),
            address: sample.address.to_string(),
            location: GeoPoint {
                lat: sample.lat,
                lon: sample.lon,
            },
            created_by: SEED_CREATOR.to_string(),
            created_at: base + Duration::seconds(i as i64),
            features: sample
                .features
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            rating: RatingAggregate {
                count: sample.rating_count,
                sum: sample.rating_sum,
            },
        })
        .collect()
}

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Inserts each facility whose id is not already present.
pub async fn seed_repository(
    repository: &dyn FacilityRepository,
    facilities: Vec<Facility>,
) -> Result<SeedReport, ServiceError> {
    let mut report = SeedReport::default();
    for facility in facilities {
        if repository.get(&facility.facility_id).await?.is_some() {
            info!(facility_id = %facility.facility_id, "already present, skipping");
            report.skipped += 1;
            continue;
        }
        info!(
            facility_id = %facility.facility_id,
            name = %facility.name,
            "inserting sample facility"
        );
        repository.insert(facility).await?;
        report.inserted += 1;
    }
    Ok(report)
}

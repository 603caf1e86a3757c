use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::FacilityRepository;
use crate::errors::ServiceError;
use crate::models::{Facility, RatingAggregate};

/// Process-local facility store backed by a sharded concurrent map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFacilityRepository {
    facilities: Arc<DashMap<String, Facility>>,
}

impl InMemoryFacilityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

#[async_trait]
impl FacilityRepository for InMemoryFacilityRepository {
    async fn insert(&self, facility: Facility) -> Result<(), ServiceError> {
        use dashmap::mapref::entry::Entry;

        match self.facilities.entry(facility.facility_id.clone()) {
            Entry::Occupied(_) => Err(ServiceError::Internal(format!(
                "facility id {} already exists",
                facility.facility_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(facility);
                Ok(())
            }
        }
    }

    async fn get(&self, facility_id: &str) -> Result<Option<Facility>, ServiceError> {
        Ok(self.facilities.get(facility_id).map(|f| f.value().clone()))
    }

    async fn scan(&self) -> Result<Vec<Facility>, ServiceError> {
        let mut all: Vec<Facility> = self
            .facilities
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.facility_id.cmp(&b.facility_id))
        });
        Ok(all)
    }

    async fn apply_rating(
        &self,
        facility_id: &str,
        rating: Decimal,
    ) -> Result<Option<RatingAggregate>, ServiceError> {
        // get_mut holds the shard write lock for the whole read-modify-write
        Ok(self.facilities.get_mut(facility_id).map(|mut entry| {
            let updated = entry.rating.with_rating(rating);
            entry.rating = updated;
            updated
        }))
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::ServiceError;
use crate::models::{Facility, RatingAggregate};

pub mod database;
pub mod memory;

pub use database::DatabaseFacilityRepository;
pub use memory::InMemoryFacilityRepository;

/// Persistence seam for facility records.
///
/// Implementations must make `apply_rating` a single atomic step: two
/// concurrent ratings on the same facility both land in the aggregate.
#[async_trait]
pub trait FacilityRepository: Send + Sync {
    /// Stores a new facility. Ids are generated upstream and never reused.
    async fn insert(&self, facility: Facility) -> Result<(), ServiceError>;

    async fn get(&self, facility_id: &str) -> Result<Option<Facility>, ServiceError>;

    /// Every stored facility, ordered by creation time then id.
    async fn scan(&self) -> Result<Vec<Facility>, ServiceError>;

    /// Adds one rating to the aggregate and returns the updated values,
    /// or `None` when no facility has that id.
    async fn apply_rating(
        &self,
        facility_id: &str,
        rating: Decimal,
    ) -> Result<Option<RatingAggregate>, ServiceError>;

    /// Cheap liveness probe used by readiness checks.
    async fn ping(&self) -> Result<(), ServiceError>;

    fn backend_name(&self) -> &'static str;
}

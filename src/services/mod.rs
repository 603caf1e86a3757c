pub mod facilities;
pub mod geo;
pub mod ratings;

pub use facilities::{FacilityService, NearbyDefaults};
pub use ratings::RatingService;

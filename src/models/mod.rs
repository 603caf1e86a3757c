pub mod facility;

pub use facility::{
    Facility, FacilityType, GeoPoint, NewFacility, RatingAggregate, ANONYMOUS_CREATOR,
};

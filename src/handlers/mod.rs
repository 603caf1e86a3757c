pub mod common;
pub mod facilities;
pub mod ratings;

use slog::Logger;
use std::sync::Arc;

use crate::logging::component_logger;
use crate::repositories::FacilityRepository;
use crate::services::{FacilityService, NearbyDefaults, RatingService};

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub facilities: Arc<FacilityService>,
    pub ratings: Arc<RatingService>,
}

impl AppServices {
    /// Wires every service to the shared repository, each with its own component logger.
    pub fn new(
        repository: Arc<dyn FacilityRepository>,
        defaults: NearbyDefaults,
        base_logger: &Logger,
    ) -> Self {
        let facilities = Arc::new(FacilityService::new(
            repository.clone(),
            defaults,
            component_logger(base_logger, "facility_service"),
        ));
        let ratings = Arc::new(RatingService::new(
            repository,
            component_logger(base_logger, "rating_service"),
        ));

        Self {
            facilities,
            ratings,
        }
    }
}

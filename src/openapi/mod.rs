use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Facility Finder API",
        version = "0.1.0",
        description = r#"
# Facility Finder API

Directory of public bathrooms, water fountains, hand sanitizer stations and sinks.

- **Register** a facility at a coordinate
- **Search** for facilities within a radius of a point, nearest first
- **Rate** a facility from 1 to 5; the running average is kept per facility

## Identity

The creator of a facility is taken from the `x-user-sub` header set by the
upstream identity provider. Requests without it are recorded as `anonymous`.

## Errors

Every failing request returns a single-field body:

```json
{ "error": "Missing lat or lon parameters" }
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "facilities", description = "Facility registration, lookup and nearby search"),
        (name = "ratings", description = "Facility ratings")
    ),
    paths(
        crate::handlers::facilities::create_facility,
        crate::handlers::facilities::find_nearby,
        crate::handlers::facilities::get_facility,
        crate::handlers::ratings::submit_rating,
    ),
    components(
        schemas(
            crate::models::FacilityType,
            crate::services::facilities::CreateFacilityRequest,
            crate::services::facilities::CreateFacilityResponse,
            crate::services::facilities::FacilityResult,
            crate::services::facilities::FacilityDetail,
            crate::services::facilities::NearbyResult,
            crate::services::facilities::UserLocation,
            crate::services::ratings::SubmitRatingRequest,
            crate::services::ratings::RatingOutcome,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

//! Caller identity supplied by the upstream identity provider.
//!
//! Token verification happens in front of this service; by the time a
//! request arrives the provider has written the verified subject into a
//! header (configurable, `x-user-sub` by default).

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::AppState;

/// Subject of the caller, when one was forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallerIdentity {
    pub subject: Option<String>,
}

impl CallerIdentity {
    pub fn from_parts(parts: &Parts, header_name: &str) -> Self {
        let subject = parts
            .headers
            .get(header_name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self { subject }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, &state.config.identity_header))
    }
}

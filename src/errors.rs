use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "error": "Missing lat or lon parameters" }))]
pub struct ErrorResponse {
    /// Human-readable error description
    #[schema(example = "Facility not found")]
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidArgument(err.to_string())
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidArgument(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::InvalidArgument(format!(
            "Invalid query parameters: {}",
            rejection.body_text()
        ))
    }
}

impl ServiceError {
    pub fn missing(field: &str) -> Self {
        ServiceError::MissingParameter(format!("Missing {}", field))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(message.into())
    }

    /// True when the store could not be reached at all, as opposed to a
    /// statement that reached the store and failed there.
    fn is_connectivity_error(err: &DbErr) -> bool {
        matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError(err) if Self::is_connectivity_error(err) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Internal(_) | Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Store and internal failures return generic messages to avoid leaking details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(err) if Self::is_connectivity_error(err) => {
                "Service unavailable".to_string()
            }
            Self::DatabaseError(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Unavailable(_) => "Service unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = crate::tracing::current_request_id()
            .map(|rid| rid.to_string())
            .unwrap_or_default();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), request_id = %request_id, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), request_id = %request_id, "request rejected");
        }

        let body = ErrorResponse {
            error: self.response_message(),
        };

        (status, Json(body)).into_response()
    }
}

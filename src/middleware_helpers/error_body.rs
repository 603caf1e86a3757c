use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::ErrorResponse;

fn has_json_body(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn message_for(status: StatusCode) -> String {
    match status {
        StatusCode::NOT_FOUND => "Not found".to_string(),
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed".to_string(),
        StatusCode::REQUEST_TIMEOUT => "Request timed out".to_string(),
        other => other
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

/// Rewrites error responses produced outside the handlers (timeouts,
/// method mismatches, extractor rejections) into the `{"error": ...}` body.
pub async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || has_json_body(&response) {
        return response;
    }

    let (parts, _) = response.into_parts();
    let mut normalized = (
        status,
        Json(ErrorResponse {
            error: message_for(status),
        }),
    )
        .into_response();

    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            normalized.headers_mut().append(name.clone(), value.clone());
        }
    }

    tracing::debug!(status = status.as_u16(), "normalized error body");
    normalized
}

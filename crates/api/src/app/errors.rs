use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use nestegg_core::DomainError;

use crate::app::services::ServiceError;

/// Map an operation error onto an HTTP response.
///
/// Domain failures tell the caller to fix their input; store failures tell
/// them to retry later. Nothing is silently swallowed.
pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(DomainError::InvalidAmount(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_amount", msg)
        }
        ServiceError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        ServiceError::Domain(DomainError::Unauthorized) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid password")
        }
        ServiceError::Token(e) => {
            tracing::error!("session token failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
        ServiceError::Store(e) => {
            tracing::error!("store failure: {e}");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_error",
                "storage unavailable, retry later",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

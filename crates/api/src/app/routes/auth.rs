use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::OwnerContext;
use crate::middleware;

/// Verify the shared password and hand out a session token.
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::VerifyPasswordRequest>,
) -> axum::response::Response {
    match services.login(&body.password) {
        Ok(session) => {
            tracing::info!("authentication successful");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "token": session.token,
                    "expiresAt": session.expires_at.to_rfc3339(),
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("authentication failed");
            errors::service_error_to_response(e)
        }
    }
}

/// Report whether the caller holds a valid session. Never errors for an
/// anonymous caller.
pub async fn status(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let claims = middleware::bearer_token(&headers)
        .ok()
        .and_then(|token| services.session_keys().verify(token, Utc::now()).ok());

    match claims {
        Some(claims) => Json(serde_json::json!({
            "authenticated": true,
            "ownerId": claims.sub.to_string(),
        })),
        None => Json(serde_json::json!({
            "authenticated": false,
        })),
    }
}

/// Tokens are stateless, so logout is an acknowledgement: the client
/// discards the token and the session dies with its expiry.
pub async fn logout(Extension(owner): Extension<OwnerContext>) -> impl IntoResponse {
    tracing::info!(owner_id = %owner.owner_id(), "logged out");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
}

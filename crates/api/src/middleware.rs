use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use nestegg_auth::SessionKeys;

use crate::app::errors::json_error;
use crate::context::OwnerContext;

#[derive(Clone)]
pub struct AuthState {
    pub keys: Arc<SessionKeys>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Ok(token) = bearer_token(req.headers()) else {
        return unauthorized();
    };

    let claims = match state.keys.verify(token, Utc::now()) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(),
    };

    req.extensions_mut().insert(OwnerContext::new(claims.sub));

    next.run(req).await
}

// Same wire shape as every other error response.
fn unauthorized() -> Response {
    json_error(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "missing or invalid session token",
    )
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

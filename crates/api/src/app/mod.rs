//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: store selection, owner bootstrap, and the core operations
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(config: Config) -> Router {
    let services = Arc::new(
        services::build_services(&config)
            .await
            .expect("service bootstrap failed"),
    );

    let auth_state = middleware::AuthState {
        keys: services.session_keys(),
    };

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/api/auth/verify", post(routes::auth::verify))
        .route("/api/auth/status", get(routes::auth::status));

    // Protected routes: require a valid session token -> owner context.
    let protected = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        .nest("/api/account", routes::account::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the callback registry
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response bodies that are not domain types
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Connects to the configured store first; see [`services::build_services`].
pub async fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(&config).await?;
    Ok(build_router(config, services))
}

/// Build the router over already-constructed services.
pub fn build_router(config: ApiConfig, services: services::AppServices) -> Router {
    let services = Arc::new(services);
    let config = Arc::new(config);

    let mut callbacks = routes::router().layer(Extension(services.clone()));
    if config.environment.is_development() {
        tracing::warn!("development environment: callback routes accept unauthenticated requests");
    } else {
        let jwt = Arc::new(homepage_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
        let auth_state = middleware::AuthState { jwt };
        callbacks = callbacks.layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));
    }

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/internal/version", get(routes::system::version))
        .layer(Extension(services))
        .layer(Extension(config))
        .merge(callbacks)
        .layer(ServiceBuilder::new())
}

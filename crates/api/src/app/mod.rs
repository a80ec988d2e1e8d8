//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: decoder, gateway and store wiring
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs, query parameters, the non-rejecting body extractor
//! - `errors.rs`: response envelopes and error mapping

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
pub fn build_app(config: &ApiConfig) -> Router {
    build_app_with(Arc::new(services::build_services(config)))
}

/// Build the router around pre-built services (tests inject their own stores).
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    // Protected routes: every handler goes through the gateway.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::bearer_middleware))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/api/v1/ping", get(routes::system::ping))
        .merge(protected)
}

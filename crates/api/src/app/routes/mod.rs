use axum::{Router, routing::get};

pub mod companies;
pub mod rbac;
pub mod system;
pub mod vehicles;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/api/rbac", rbac::router())
        .nest("/api/vehicles", vehicles::router())
        .nest("/api/vehicle-rental/companies", companies::router())
}

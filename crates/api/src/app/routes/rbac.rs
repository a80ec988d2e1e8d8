//! RBAC visibility: the role→action table the policy engine enforces.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    routing::get,
};

use fleetgate_auth::{RoleDefinition, role_definitions};

use crate::app::errors::{ApiError, ApiResult, Success};
use crate::app::services::AppServices;
use crate::context::BearerToken;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/:name", get(get_role))
}

/// GET /api/rbac/roles - every role and what it may do per resource kind
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
) -> ApiResult<Success<Vec<RoleDefinition>>> {
    services.gateway.authenticate(bearer.token())?;
    let roles = role_definitions();
    let message = format!("{} roles retrieved successfully", roles.len());
    Ok(Success::ok(roles, message))
}

/// GET /api/rbac/roles/:name
pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(name): Path<String>,
) -> ApiResult<Success<RoleDefinition>> {
    services.gateway.authenticate(bearer.token())?;
    let role = role_definitions()
        .into_iter()
        .find(|def| def.name.as_str() == name)
        .ok_or_else(|| ApiError::validation(format!("Unknown role: {name}")))?;
    Ok(Success::ok(role, "Role retrieved successfully"))
}

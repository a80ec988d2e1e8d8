use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode};
use chrono::Utc;
use serde_json::json;

use crate::app::errors::{ApiResult, Success};
use crate::app::services::AppServices;
use crate::context::BearerToken;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn ping() -> Success<serde_json::Value> {
    Success::ok(
        json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }),
        "pong",
    )
}

/// The principal decoded from the caller's token.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
) -> ApiResult<Success<serde_json::Value>> {
    let principal = services.gateway.authenticate(bearer.token())?;
    Ok(Success::ok(
        json!({
            "subject_id": principal.subject_id(),
            "role": principal.role(),
            "tenant_id": principal.tenant_id(),
        }),
        "Authenticated",
    ))
}

//! Response envelopes and the API error taxonomy.
//!
//! Every response body is `{ success, data?, message?, error?, code? }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use fleetgate_auth::{Action, AuthError, DecisionReason};
use fleetgate_core::{DomainError, ResourceKind};
use fleetgate_infra::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// Successful response: `{ success: true, data, message }`.
#[derive(Debug)]
pub struct Success<T> {
    status: StatusCode,
    data: T,
    message: String,
}

impl<T: Serialize> Success<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            data,
            message: message.into(),
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            success: true,
            data: Some(self.data),
            message: Some(self.message),
            error: None,
            code: None,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(AuthError),

    #[error("{action} on {kind} denied: {reason}")]
    Denied {
        reason: DecisionReason,
        action: Action,
        kind: ResourceKind,
    },

    #[error("{} not found", .0.label())]
    NotFound(ResourceKind),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Denied {
                reason: DecisionReason::Unauthenticated,
                ..
            } => StatusCode::UNAUTHORIZED,
            ApiError::Denied {
                reason: DecisionReason::ResourceNotFound,
                ..
            } => StatusCode::NOT_FOUND,
            ApiError::Denied { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(err) => err.code.as_str(),
            ApiError::Denied { reason, .. } => reason.as_str(),
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Client-facing message. Tenant denials stay generic so they never
    /// confirm that a resource exists.
    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthenticated(err) => err.message.clone(),
            ApiError::Denied { reason, action, kind } => match reason {
                DecisionReason::Unauthenticated => AuthError::unauthenticated().message,
                DecisionReason::ForbiddenTenant => "Access denied".to_string(),
                DecisionReason::TenantInactive => "Only active rental companies can register vehicles".to_string(),
                DecisionReason::ResourceNotFound => format!("{} not found", kind.label()),
                DecisionReason::ForbiddenRole | DecisionReason::Ok => {
                    format!("Insufficient permissions to {action} {kind}")
                }
            },
            ApiError::NotFound(kind) => format!("{} not found", kind.label()),
            ApiError::Validation(msg) | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }

        let body: Envelope<()> = Envelope {
            success: false,
            data: None,
            message: None,
            error: Some(self.public_message()),
            code: Some(self.code()),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Validation(other.detail().to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Unavailable(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let denied = |reason| ApiError::Denied {
            reason,
            action: Action::Update,
            kind: ResourceKind::Vehicle,
        };

        assert_eq!(ApiError::from(AuthError::expired_token()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(denied(DecisionReason::ForbiddenTenant).status(), StatusCode::FORBIDDEN);
        assert_eq!(denied(DecisionReason::ForbiddenRole).status(), StatusCode::FORBIDDEN);
        assert_eq!(denied(DecisionReason::TenantInactive).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound(ResourceKind::Company).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(StoreError::Conflict("dup".into())).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(StoreError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(DomainError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn tenant_denials_are_generic() {
        let err = ApiError::Denied {
            reason: DecisionReason::ForbiddenTenant,
            action: Action::Read,
            kind: ResourceKind::Vehicle,
        };
        assert_eq!(err.public_message(), "Access denied");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ApiError::Internal("lock poisoned".into());
        assert_eq!(err.public_message(), "Internal server error");
    }
}

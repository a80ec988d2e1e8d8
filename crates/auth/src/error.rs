use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a credential could not be turned into a principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    /// No credential was presented at all.
    Unauthenticated,
    InvalidCredentials,
    ExpiredToken,
    MalformedToken,
    NetworkFailure,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::Unauthenticated => "unauthenticated",
            AuthErrorCode::InvalidCredentials => "invalid_credentials",
            AuthErrorCode::ExpiredToken => "expired_token",
            AuthErrorCode::MalformedToken => "malformed_token",
            AuthErrorCode::NetworkFailure => "network_failure",
        }
    }
}

/// Authentication failure, shared by the server-side decoder and the
/// client-side session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    pub code: AuthErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            field: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(AuthErrorCode::Unauthenticated, "Authentication required")
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::InvalidCredentials, message)
    }

    pub fn expired_token() -> Self {
        Self::new(AuthErrorCode::ExpiredToken, "Token has expired")
    }

    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::MalformedToken, message)
    }

    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::NetworkFailure, message)
    }

    /// Attach the input field the failure relates to (e.g. `"password"`).
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

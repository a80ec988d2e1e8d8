use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleetgate_core::TenantId;

use crate::{AuthError, Principal, PrincipalId, Role};

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims expected once a token has been
/// decoded/verified by whatever transport/security layer is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Single role granted to the subject.
    pub role: Role,

    /// Owning company for tenant-scoped roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    /// Issuer, checked against the configured single issuer when one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl JwtClaims {
    pub fn into_principal(self) -> Principal {
        Principal::new(self.sub, self.role, self.tenant_id)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl From<TokenValidationError> for AuthError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => AuthError::expired_token(),
            TokenValidationError::NotYetValid => AuthError::invalid_credentials(err.to_string()),
            TokenValidationError::InvalidTimeWindow => AuthError::malformed_token(err.to_string()),
        }
    }
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// the decoder.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::AuthErrorCode;

    fn claims(iat: DateTime<Utc>, exp: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new("u-1"),
            role: Role::Manager,
            tenant_id: Some(TenantId::from("co-1")),
            iss: None,
            iat,
            exp,
        }
    }

    #[test]
    fn validates_time_window() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let c = claims(t0, t0 + Duration::minutes(15));

        assert_eq!(validate_claims(&c, t0 - Duration::seconds(1)), Err(TokenValidationError::NotYetValid));
        assert_eq!(validate_claims(&c, t0 + Duration::minutes(5)), Ok(()));
        assert_eq!(validate_claims(&c, t0 + Duration::minutes(15)), Err(TokenValidationError::Expired));

        let inverted = claims(t0, t0);
        assert_eq!(validate_claims(&inverted, t0), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn validation_errors_map_onto_auth_codes() {
        assert_eq!(AuthError::from(TokenValidationError::Expired).code, AuthErrorCode::ExpiredToken);
        assert_eq!(
            AuthError::from(TokenValidationError::InvalidTimeWindow).code,
            AuthErrorCode::MalformedToken
        );
    }

    #[test]
    fn timestamps_serialize_as_epoch_seconds() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(claims(t0, t0 + Duration::seconds(60))).unwrap();
        assert_eq!(json["iat"], 1_735_689_600_i64);
        assert_eq!(json["exp"], 1_735_689_660_i64);
        assert_eq!(json["role"], "manager");
        assert!(json.get("iss").is_none());
    }
}

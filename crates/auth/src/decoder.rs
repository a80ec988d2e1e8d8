//! Credential decoding: opaque bearer token → [`Principal`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use crate::{AuthError, JwtClaims, Principal, validate_claims};

/// Turns an opaque bearer token into a principal.
///
/// Implementations must be pure with respect to the token (aside from the
/// signing key they hold) so callers can evaluate requests concurrently.
pub trait CredentialDecoder: Send + Sync {
    fn decode(&self, token: &str) -> Result<Principal, AuthError>;
}

/// HS256 JWT decoder for the single-issuer bearer scheme.
pub struct Hs256Decoder {
    key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl Hs256Decoder {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks are done by `validate_claims` against an explicit clock.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            issuer: None,
        }
    }

    /// Require tokens to carry this `iss` claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Decode against an explicit clock.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::unauthenticated());
        }
        if !is_compact_jws(token) {
            return Err(AuthError::malformed_token("Token is not a well-formed JWT"));
        }

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        if let Some(expected) = &self.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(AuthError::invalid_credentials("Token was not issued by this service"));
            }
        }

        validate_claims(&claims, now)?;
        Ok(claims.into_principal())
    }
}

impl CredentialDecoder for Hs256Decoder {
    fn decode(&self, token: &str) -> Result<Principal, AuthError> {
        self.decode_at(token, Utc::now())
    }
}

fn is_compact_jws(token: &str) -> bool {
    let mut segments = 0;
    for part in token.split('.') {
        if part.is_empty() {
            return false;
        }
        segments += 1;
    }
    segments == 3
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::expired_token(),
        ErrorKind::InvalidSignature | ErrorKind::InvalidIssuer | ErrorKind::ImmatureSignature => {
            AuthError::invalid_credentials("Invalid token signature or issuer")
        }
        ErrorKind::Json(e) => AuthError::malformed_token(format!("Invalid token claims: {e}")),
        _ => AuthError::malformed_token("Token could not be decoded"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use jsonwebtoken::{EncodingKey, Header};

    use fleetgate_core::TenantId;

    use super::*;
    use crate::{AuthErrorCode, PrincipalId, Role};

    const SECRET: &[u8] = b"test-secret";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn mint(claims: &JwtClaims, secret: &[u8]) -> String {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
            .expect("encode")
    }

    fn manager_claims() -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new("u-42"),
            role: Role::Manager,
            tenant_id: Some(TenantId::from("co-1")),
            iss: Some("fleetgate".to_string()),
            iat: t0(),
            exp: t0() + Duration::minutes(15),
        }
    }

    #[test]
    fn valid_token_yields_principal() {
        let decoder = Hs256Decoder::new(SECRET);
        let token = mint(&manager_claims(), SECRET);

        let principal = decoder.decode_at(&token, t0() + Duration::minutes(1)).unwrap();
        assert_eq!(principal.subject_id().as_str(), "u-42");
        assert_eq!(principal.role(), Role::Manager);
        assert_eq!(principal.tenant_id(), Some(&TenantId::from("co-1")));
    }

    #[test]
    fn empty_token_is_unauthenticated() {
        let decoder = Hs256Decoder::new(SECRET);
        assert_eq!(decoder.decode_at("", t0()).unwrap_err().code, AuthErrorCode::Unauthenticated);
        assert_eq!(decoder.decode_at("   ", t0()).unwrap_err().code, AuthErrorCode::Unauthenticated);
    }

    #[test]
    fn structurally_broken_tokens_are_malformed() {
        let decoder = Hs256Decoder::new(SECRET);
        for token in ["mock_jwt_token_123", "a.b", "a..c", "a.b.c.d", "not.a.jwt"] {
            let err = decoder.decode_at(token, t0()).unwrap_err();
            assert_eq!(err.code, AuthErrorCode::MalformedToken, "{token}");
        }
    }

    #[test]
    fn unknown_role_claim_is_malformed() {
        let decoder = Hs256Decoder::new(SECRET);
        let mut claims = serde_json::to_value(manager_claims()).unwrap();
        claims["role"] = serde_json::json!("superuser");
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let err = decoder.decode_at(&token, t0()).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MalformedToken);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let decoder = Hs256Decoder::new(SECRET);
        let token = mint(&manager_claims(), SECRET);
        let err = decoder.decode_at(&token, t0() + Duration::hours(1)).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::ExpiredToken);
    }

    #[test]
    fn wrong_key_is_invalid_credentials() {
        let decoder = Hs256Decoder::new(SECRET);
        let token = mint(&manager_claims(), b"someone-else");
        let err = decoder.decode_at(&token, t0()).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidCredentials);
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let decoder = Hs256Decoder::new(SECRET).with_issuer("fleetgate");
        let ok = mint(&manager_claims(), SECRET);
        assert!(decoder.decode_at(&ok, t0()).is_ok());

        let mut foreign = manager_claims();
        foreign.iss = Some("elsewhere".to_string());
        let err = decoder.decode_at(&mint(&foreign, SECRET), t0()).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::InvalidCredentials);

        let mut missing = manager_claims();
        missing.iss = None;
        assert!(decoder.decode_at(&mint(&missing, SECRET), t0()).is_err());
    }

    #[test]
    fn admin_tokens_need_no_tenant() {
        let decoder = Hs256Decoder::new(SECRET);
        let claims = JwtClaims {
            sub: PrincipalId::new("root"),
            role: Role::Admin,
            tenant_id: None,
            iss: None,
            iat: t0(),
            exp: t0() + Duration::minutes(5),
        };
        let principal = decoder.decode_at(&mint(&claims, SECRET), t0()).unwrap();
        assert!(principal.is_admin());
        assert_eq!(principal.tenant_id(), None);
    }
}

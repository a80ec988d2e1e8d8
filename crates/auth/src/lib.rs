//! `fleetgate-auth`: pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns bearer
//! tokens into principals and decides whether a principal may act on a resource.

pub mod authorize;
pub mod claims;
pub mod decoder;
pub mod error;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthDecision, AuthorizationExplanation, DecisionReason, Precondition, Target, authorize,
    authorize_with, explain,
};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use decoder::{CredentialDecoder, Hs256Decoder};
pub use error::{AuthError, AuthErrorCode};
pub use permissions::{Action, RoleDefinition, is_permitted, role_definitions};
pub use principal::{Principal, PrincipalId};
pub use roles::Role;

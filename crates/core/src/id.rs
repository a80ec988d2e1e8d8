//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are opaque strings on the wire (`"co-1"`, `"vehicle-…"`), so they
//! are modeled as string newtypes rather than raw UUIDs.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a tenant (an owning rental company).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

/// Identifier of a stored resource (vehicle, company record, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Generate a fresh identifier of the form `<prefix>-<uuidv7>`.
            ///
            /// Prefer passing IDs explicitly in tests for determinism.
            pub fn generate(prefix: &str) -> Self {
                Self(format!("{}-{}", prefix, Uuid::now_v7().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: must not be empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_newtype!(TenantId, "TenantId");
impl_string_newtype!(ResourceId, "ResourceId");

impl From<&ResourceId> for TenantId {
    /// A tenant resource (company record) is addressed by its tenant id.
    fn from(value: &ResourceId) -> Self {
        Self(value.0.clone())
    }
}

impl From<&TenantId> for ResourceId {
    fn from(value: &TenantId) -> Self {
        Self(value.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_rejects_blank() {
        let id: TenantId = "  co-1 ".parse().unwrap();
        assert_eq!(id.as_str(), "co-1");

        let err = "   ".parse::<ResourceId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn generated_ids_carry_prefix_and_differ() {
        let a = ResourceId::generate("vehicle");
        let b = ResourceId::generate("vehicle");
        assert!(a.as_str().starts_with("vehicle-"));
        assert_ne!(a, b);
    }

    #[test]
    fn tenant_and_resource_ids_convert_losslessly() {
        let tenant = TenantId::from("co-7");
        let rid = ResourceId::from(&tenant);
        assert_eq!(TenantId::from(&rid), tenant);
        assert_eq!(serde_json::to_string(&tenant).unwrap(), "\"co-7\"");
    }
}

use serde::{Deserialize, Serialize};

use fleetgate_core::TenantId;

use crate::Role;

/// Identity of an authenticated principal (the token subject).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A decoded principal for authorization decisions.
///
/// Immutable once decoded from a token and discarded when the request
/// completes. `tenant_id` is present only for roles scoped to one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject_id: PrincipalId,
    role: Role,
    tenant_id: Option<TenantId>,
}

impl Principal {
    pub fn new(subject_id: PrincipalId, role: Role, tenant_id: Option<TenantId>) -> Self {
        Self {
            subject_id,
            role,
            tenant_id,
        }
    }

    pub fn admin(subject_id: impl Into<String>) -> Self {
        Self::new(PrincipalId::new(subject_id), Role::Admin, None)
    }

    pub fn scoped(subject_id: impl Into<String>, role: Role, tenant_id: impl Into<TenantId>) -> Self {
        Self::new(PrincipalId::new(subject_id), role, Some(tenant_id.into()))
    }

    pub fn subject_id(&self) -> &PrincipalId {
        &self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

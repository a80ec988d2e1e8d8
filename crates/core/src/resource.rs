//! Tenant-owned resource descriptors.
//!
//! Authorization never looks at full records; it looks at the [`Resource`]
//! descriptor a record projects (id, kind, owning tenant).

use serde::{Deserialize, Serialize};

use crate::{ResourceId, TenantId};

/// Resource types known to the authorization layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vehicle,
    Company,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Vehicle, ResourceKind::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vehicle => "vehicle",
            ResourceKind::Company => "company",
        }
    }

    /// Display label used in user-facing messages ("Vehicle not found").
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Vehicle => "Vehicle",
            ResourceKind::Company => "Company",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization view of a stored entity.
///
/// # Invariants
/// - Every mutable resource declares its owning tenant; `None` is reserved for
///   tenant-free resources (e.g. global listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub owning_tenant_id: Option<TenantId>,
}

impl Resource {
    pub fn new(id: ResourceId, kind: ResourceKind, owning_tenant_id: Option<TenantId>) -> Self {
        Self {
            id,
            kind,
            owning_tenant_id,
        }
    }
}

/// A record that can be authorized against.
pub trait OwnedResource {
    const KIND: ResourceKind;

    fn resource_id(&self) -> &ResourceId;

    fn owning_tenant_id(&self) -> Option<&TenantId>;

    fn descriptor(&self) -> Resource {
        Resource::new(
            self.resource_id().clone(),
            Self::KIND,
            self.owning_tenant_id().cloned(),
        )
    }
}

/// A record that *is* a tenant (e.g. a rental company), under which dependent
/// resources are created.
pub trait TenantResource: OwnedResource {
    fn tenant_id(&self) -> TenantId;

    /// Whether dependent resources may currently be created under this tenant.
    fn is_active(&self) -> bool;
}

//! Static role→action table.
//!
//! Permissions are evaluated per resource kind. Admin is handled by the policy
//! engine before this table is consulted, but the table still lists it so the
//! full matrix can be displayed.

use serde::{Deserialize, Serialize};

use fleetgate_core::ResourceKind;

use crate::Role;

/// Operation requested on a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Reassigning a resource's owning tenant.
    ChangeOwnership,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::ChangeOwnership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ChangeOwnership => "change_ownership",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

const CRUD: &[Action] = &[Action::Read, Action::Create, Action::Update, Action::Delete];
const READ: &[Action] = &[Action::Read];
const READ_UPDATE: &[Action] = &[Action::Read, Action::Update];
const NONE: &[Action] = &[];

/// Actions a role may perform on a resource kind.
pub fn granted_actions(role: Role, kind: ResourceKind) -> &'static [Action] {
    match (role, kind) {
        (Role::Admin, _) => &Action::ALL,
        (Role::Manager, ResourceKind::Vehicle) => CRUD,
        (Role::Manager, ResourceKind::Company) => READ,
        (Role::Accountant, ResourceKind::Vehicle) => READ,
        (Role::Accountant, ResourceKind::Company) => READ,
        (Role::ServiceAdvisor, ResourceKind::Vehicle) => READ_UPDATE,
        (Role::ServiceAdvisor, ResourceKind::Company) => READ,
        (Role::Mechanic, ResourceKind::Vehicle) => READ_UPDATE,
        (Role::Mechanic, ResourceKind::Company) => NONE,
        (Role::Driver, ResourceKind::Vehicle) => READ,
        (Role::Driver, ResourceKind::Company) => NONE,
    }
}

pub fn is_permitted(role: Role, kind: ResourceKind, action: Action) -> bool {
    granted_actions(role, kind).contains(&action)
}

/// Role definition with its granted actions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub description: &'static str,
    pub tenant_scoped: bool,
    pub grants: Vec<KindGrant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindGrant {
    pub kind: ResourceKind,
    pub actions: Vec<Action>,
}

/// The complete RBAC matrix, one entry per role.
pub fn role_definitions() -> Vec<RoleDefinition> {
    Role::ALL
        .into_iter()
        .map(|role| RoleDefinition {
            name: role,
            description: role.description(),
            tenant_scoped: !role.is_admin(),
            grants: ResourceKind::ALL
                .into_iter()
                .map(|kind| KindGrant {
                    kind,
                    actions: granted_actions(role, kind).to_vec(),
                })
                .collect(),
        })
        .collect()
}

//! Authorization policy engine.
//!
//! A pure decision function over `(principal, action, target)`. It never
//! fails: every outcome is an [`AuthDecision`], and nothing is cached across
//! requests.

use serde::Serialize;

use fleetgate_core::{Resource, ResourceKind, TenantId};

use crate::permissions::granted_actions;
use crate::{Action, Principal, PrincipalId, Role, is_permitted};

/// Why a decision was reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Ok,
    Unauthenticated,
    ForbiddenRole,
    ForbiddenTenant,
    /// The target tenant exists and matches, but is not active.
    TenantInactive,
    /// Only produced after authorization cleared (see [`AuthDecision::not_found`]).
    ResourceNotFound,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::Ok => "ok",
            DecisionReason::Unauthenticated => "unauthenticated",
            DecisionReason::ForbiddenRole => "forbidden_role",
            DecisionReason::ForbiddenTenant => "forbidden_tenant",
            DecisionReason::TenantInactive => "tenant_inactive",
            DecisionReason::ResourceNotFound => "resource_not_found",
        }
    }

    /// The taxonomy class a reason belongs to. Precondition failures are
    /// reported as role-class denials.
    pub fn class(&self) -> DecisionReason {
        match self {
            DecisionReason::TenantInactive => DecisionReason::ForbiddenRole,
            other => *other,
        }
    }
}

impl core::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct AuthDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl AuthDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Ok,
        }
    }

    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    pub fn not_found() -> Self {
        Self::deny(DecisionReason::ResourceNotFound)
    }
}

/// What the request targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    /// No concrete resource (list, create-without-target, or a lookup miss).
    Kind(ResourceKind),
    Resource(&'a Resource),
}

impl Target<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Target::Kind(kind) => *kind,
            Target::Resource(resource) => resource.kind,
        }
    }
}

/// Resource-type-specific precondition checked once scope and role pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Dependent resources may only be created under an active tenant.
    TenantActive { tenant_id: TenantId, active: bool },
}

impl Precondition {
    fn holds(&self) -> bool {
        match self {
            Precondition::TenantActive { active, .. } => *active,
        }
    }
}

/// Authorize `action` on `target` without preconditions.
pub fn authorize(principal: Option<&Principal>, action: Action, target: Target<'_>) -> AuthDecision {
    authorize_with(principal, action, target, &[])
}

/// Authorize `action` on `target`.
///
/// Ordered, first match wins:
/// 1. no principal → `unauthenticated`
/// 2. admin → allowed (tenant scoping bypassed)
/// 3. `change_ownership` by a non-admin → `forbidden_role`
/// 4. no concrete resource → role table decides
/// 5. foreign owning tenant → `forbidden_tenant` (before any role check, so a
///    foreign resource is denied the same way for every action)
/// 6. role table decides for the concrete resource
///
/// Preconditions are evaluated only for otherwise allowed requests.
pub fn authorize_with(
    principal: Option<&Principal>,
    action: Action,
    target: Target<'_>,
    preconditions: &[Precondition],
) -> AuthDecision {
    let scope = evaluate_scope(principal, action, target);
    if !scope.allowed {
        return scope;
    }

    if preconditions.iter().any(|p| !p.holds()) {
        return AuthDecision::deny(DecisionReason::TenantInactive);
    }

    scope
}

fn evaluate_scope(principal: Option<&Principal>, action: Action, target: Target<'_>) -> AuthDecision {
    let Some(principal) = principal else {
        return AuthDecision::deny(DecisionReason::Unauthenticated);
    };

    if principal.is_admin() {
        return AuthDecision::allow();
    }

    if action == Action::ChangeOwnership {
        return AuthDecision::deny(DecisionReason::ForbiddenRole);
    }

    let resource = match target {
        Target::Kind(kind) => {
            return if is_permitted(principal.role(), kind, action) {
                AuthDecision::allow()
            } else {
                AuthDecision::deny(DecisionReason::ForbiddenRole)
            };
        }
        Target::Resource(resource) => resource,
    };

    if let Some(owner) = &resource.owning_tenant_id {
        if principal.tenant_id() != Some(owner) {
            return AuthDecision::deny(DecisionReason::ForbiddenTenant);
        }
    }

    if !is_permitted(principal.role(), resource.kind, action) {
        return AuthDecision::deny(DecisionReason::ForbiddenRole);
    }

    AuthDecision::allow()
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// This structure provides transparent, debuggable information about why
/// a request was allowed or denied.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub action: Action,
    pub kind: ResourceKind,
    pub decision: AuthDecision,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// `None` when no principal was presented.
    pub principal: Option<PrincipalState>,

    pub resource_tenant_id: Option<TenantId>,
}

/// Current state of the principal being checked.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub subject_id: PrincipalId,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub granted_actions: Vec<Action>,
}

/// Explain why an authorization decision was made (or would be made).
///
/// Answers the question: "Why was this request allowed/denied?"
pub fn explain(
    principal: Option<&Principal>,
    action: Action,
    target: Target<'_>,
    preconditions: &[Precondition],
) -> AuthorizationExplanation {
    let decision = authorize_with(principal, action, target, preconditions);
    let kind = target.kind();
    let resource_tenant_id = match target {
        Target::Resource(r) => r.owning_tenant_id.clone(),
        Target::Kind(_) => None,
    };

    let reason = match (decision.reason, principal) {
        (_, None) => "No principal was presented".to_string(),
        (DecisionReason::Ok, Some(p)) if p.is_admin() => {
            format!("Role 'admin' may {action} any {kind}")
        }
        (DecisionReason::Ok, Some(p)) => format!("Role '{}' may {action} {kind} within its tenant", p.role()),
        (DecisionReason::ForbiddenRole, Some(p)) if action == Action::ChangeOwnership => {
            format!("Role '{}' may not reassign ownership; only admins can", p.role())
        }
        (DecisionReason::ForbiddenRole, Some(p)) => {
            format!("Role '{}' is not granted '{action}' on {kind}", p.role())
        }
        (DecisionReason::ForbiddenTenant, Some(p)) => format!(
            "Resource belongs to tenant {} but principal is scoped to {}",
            resource_tenant_id.as_ref().map(|t| t.as_str()).unwrap_or("-"),
            p.tenant_id().map(|t| t.as_str()).unwrap_or("no tenant"),
        ),
        (DecisionReason::TenantInactive, Some(_)) => {
            let tenant = preconditions
                .iter()
                .find(|p| !p.holds())
                .map(|p| match p {
                    Precondition::TenantActive { tenant_id, .. } => tenant_id.as_str(),
                })
                .unwrap_or("-");
            format!("Tenant {tenant} is not active")
        }
        (other, Some(_)) => format!("Denied: {other}"),
    };

    AuthorizationExplanation {
        action,
        kind,
        decision,
        reason,
        principal: principal.map(|p| PrincipalState {
            subject_id: p.subject_id().clone(),
            role: p.role(),
            tenant_id: p.tenant_id().cloned(),
            granted_actions: granted_actions(p.role(), kind).to_vec(),
        }),
        resource_tenant_id,
    }
}

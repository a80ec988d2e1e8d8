//! Resource gateway: the single path every protected request takes.
//!
//! decode token → look up target → authorize → run the operation.
//!
//! Lookup misses are authorized against the bare resource kind before the
//! 404 is returned, so a principal who may not touch the kind at all is
//! denied rather than told the record is missing.

use std::future::Future;
use std::sync::Arc;

use fleetgate_auth::{
    Action, AuthDecision, CredentialDecoder, Precondition, Principal, Target, authorize_with, explain,
};
use fleetgate_core::{OwnedResource, Resource, ResourceId, ResourceKind, TenantId, TenantResource};
use fleetgate_infra::ResourceStore;

use crate::app::errors::{ApiError, ApiResult};

/// How the target of a request is found.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// The resource type as a whole (list, create).
    Collection,
    Record(&'a ResourceId),
}

/// Authorization passed; carries what the operation may act on.
#[derive(Debug)]
pub struct Granted<R> {
    pub principal: Principal,
    record: Option<R>,
}

impl<R: OwnedResource> Granted<R> {
    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    /// The looked-up record. Collection lookups have none.
    pub fn into_record(self) -> ApiResult<(Principal, R)> {
        match self.record {
            Some(record) => Ok((self.principal, record)),
            None => Err(ApiError::NotFound(R::KIND)),
        }
    }

    /// Whether the same principal may also perform `action` on `other`
    /// (used to filter listings down to visible records).
    pub fn can<T: OwnedResource>(&self, action: Action, other: &T) -> bool {
        authorize_with(Some(&self.principal), action, Target::Resource(&other.descriptor()), &[]).allowed
    }
}

/// Authorization passed for an action under a tenant resource.
#[derive(Debug)]
pub struct Scoped<C> {
    pub principal: Principal,
    pub tenant: C,
}

#[derive(Clone)]
pub struct Gateway {
    decoder: Arc<dyn CredentialDecoder>,
}

impl Gateway {
    pub fn new(decoder: Arc<dyn CredentialDecoder>) -> Self {
        Self { decoder }
    }

    /// Decode the bearer credential. A missing header decodes as an empty
    /// token (`unauthenticated`).
    pub fn authenticate(&self, token: Option<&str>) -> ApiResult<Principal> {
        self.decoder.decode(token.unwrap_or_default()).map_err(|err| {
            tracing::debug!(code = err.code.as_str(), "credential rejected");
            ApiError::Unauthenticated(err)
        })
    }

    pub fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        target: Target<'_>,
        preconditions: &[Precondition],
    ) -> ApiResult<()> {
        let decision: AuthDecision = authorize_with(Some(principal), action, target, preconditions);
        if decision.allowed {
            return Ok(());
        }

        let explanation = explain(Some(principal), action, target, preconditions);
        tracing::info!(
            subject = %principal.subject_id(),
            role = %principal.role(),
            tenant = ?principal.tenant_id().map(|t| t.as_str()),
            action = %action,
            kind = %target.kind(),
            reason = decision.reason.as_str(),
            explanation = %explanation.reason,
            "authorization denied"
        );

        Err(ApiError::Denied {
            reason: decision.reason,
            action,
            kind: target.kind(),
        })
    }

    /// Authenticate, resolve `lookup` in `store`, authorize, then run `op`.
    pub async fn handle<R, T, F, Fut>(
        &self,
        token: Option<&str>,
        action: Action,
        store: &dyn ResourceStore<R>,
        lookup: Lookup<'_>,
        op: F,
    ) -> ApiResult<T>
    where
        R: OwnedResource + Send + Sync,
        F: FnOnce(Granted<R>) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let principal = self.authenticate(token)?;

        let record = match lookup {
            Lookup::Collection => {
                self.authorize(&principal, action, Target::Kind(R::KIND), &[])?;
                None
            }
            Lookup::Record(id) => match store.get(id).await? {
                Some(record) => {
                    self.authorize(&principal, action, Target::Resource(&record.descriptor()), &[])?;
                    Some(record)
                }
                None => {
                    self.authorize(&principal, action, Target::Kind(R::KIND), &[])?;
                    return Err(ApiError::NotFound(R::KIND));
                }
            },
        };

        op(Granted { principal, record }).await
    }

    /// Authenticate and authorize `action` on a `kind` resource owned by
    /// `tenant_id`, then run `op` with the tenant record.
    ///
    /// Scope is checked against the requested tenant id before the tenant is
    /// looked up, so a foreign tenant is denied identically whether or not it
    /// exists. `Create` additionally requires the tenant to be active.
    pub async fn handle_scoped<C, T, F, Fut>(
        &self,
        token: Option<&str>,
        action: Action,
        kind: ResourceKind,
        tenants: &dyn ResourceStore<C>,
        tenant_id: &TenantId,
        op: F,
    ) -> ApiResult<T>
    where
        C: TenantResource + Send + Sync,
        F: FnOnce(Scoped<C>) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let principal = self.authenticate(token)?;

        let prospective = Resource::new(ResourceId::from(tenant_id), kind, Some(tenant_id.clone()));
        self.authorize(&principal, action, Target::Resource(&prospective), &[])?;

        let tenant = tenants
            .get(&ResourceId::from(tenant_id))
            .await?
            .ok_or(ApiError::NotFound(C::KIND))?;

        if action == Action::Create {
            let active = Precondition::TenantActive {
                tenant_id: tenant.tenant_id(),
                active: tenant.is_active(),
            };
            self.authorize(&principal, action, Target::Resource(&prospective), &[active])?;
        }

        op(Scoped { principal, tenant }).await
    }
}

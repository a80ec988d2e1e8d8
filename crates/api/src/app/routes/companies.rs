//! Rental company endpoints under `/api/vehicle-rental/companies`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query},
    routing::{get, patch},
};
use chrono::Utc;
use serde_json::json;

use fleetgate_auth::Action;
use fleetgate_core::{ResourceId, ResourceKind};
use fleetgate_fleet::{NewCompany, PartnershipStatus, RentalCompany};
use fleetgate_infra::ResourceStore;

use crate::app::dto::{CompanyListQuery, Payload, StatusRequest};
use crate::app::errors::{ApiError, ApiResult, Success};
use crate::app::services::AppServices;
use crate::context::BearerToken;
use crate::gateway::{Granted, Lookup};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/:id", get(get_company).put(update_company).delete(delete_company))
        .route("/:id/status", patch(update_status))
}

/// GET /api/vehicle-rental/companies?search=&status=
pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Query(query): Query<CompanyListQuery>,
) -> ApiResult<Success<Vec<RentalCompany>>> {
    let store = services.companies.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Read, store, Lookup::Collection, |granted| {
            visible(store, granted, query)
        })
        .await
}

/// POST /api/vehicle-rental/companies
pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    payload: Payload<NewCompany>,
) -> ApiResult<Success<RentalCompany>> {
    let store = services.companies.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Create, store, Lookup::Collection, |_granted| async move {
            let input = payload.into_inner()?;
            let status = input.validate()?;
            let company = store.insert(input.into_company(status, Utc::now())).await?;
            tracing::info!(company_id = %company.id, "company registered");
            Ok(Success::created(company, "Company created successfully"))
        })
        .await
}

/// GET /api/vehicle-rental/companies/:id
pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
) -> ApiResult<Success<RentalCompany>> {
    let id = ResourceId::from(id);
    services
        .gateway
        .handle(
            bearer.token(),
            Action::Read,
            services.companies.as_ref(),
            Lookup::Record(&id),
            |granted| async move {
                let (_, company) = granted.into_record()?;
                Ok(Success::ok(company, "Company retrieved successfully"))
            },
        )
        .await
}

/// PUT /api/vehicle-rental/companies/:id
pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
    payload: Payload<NewCompany>,
) -> ApiResult<Success<RentalCompany>> {
    let id = ResourceId::from(id);
    let store = services.companies.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Update, store, Lookup::Record(&id), |granted| async move {
            let (_, mut company) = granted.into_record()?;
            let input = payload.into_inner()?;
            let status_given = input.status.is_some();
            let status = input.validate()?;
            let now = Utc::now();
            company.apply(input, now);
            if status_given {
                company.set_status(status, now);
            }
            let company = save(store, company).await?;
            Ok(Success::ok(company, "Company updated successfully"))
        })
        .await
}

/// DELETE /api/vehicle-rental/companies/:id
pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
) -> ApiResult<Success<serde_json::Value>> {
    let id = ResourceId::from(id);
    let store = services.companies.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Delete, store, Lookup::Record(&id), |granted| async move {
            let (_, company) = granted.into_record()?;
            let removed = store
                .delete(&company.id)
                .await?
                .ok_or(ApiError::NotFound(ResourceKind::Company))?;
            Ok(Success::ok(json!({ "id": removed.id }), "Company deleted successfully"))
        })
        .await
}

/// PATCH /api/vehicle-rental/companies/:id/status
pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
    payload: Payload<StatusRequest>,
) -> ApiResult<Success<RentalCompany>> {
    let id = ResourceId::from(id);
    let store = services.companies.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Update, store, Lookup::Record(&id), |granted| async move {
            let (_, mut company) = granted.into_record()?;
            let status: PartnershipStatus = payload.into_inner()?.status.parse()?;
            company.set_status(status, Utc::now());
            let company = save(store, company).await?;
            Ok(Success::ok(company, format!("Company status updated to {status} successfully")))
        })
        .await
}

async fn visible(
    store: &dyn ResourceStore<RentalCompany>,
    granted: Granted<RentalCompany>,
    query: CompanyListQuery,
) -> ApiResult<Success<Vec<RentalCompany>>> {
    let status = query.status.as_deref().map(str::parse::<PartnershipStatus>).transpose()?;
    let companies: Vec<RentalCompany> = store
        .list()
        .await?
        .into_iter()
        .filter(|c| granted.can(Action::Read, c))
        .filter(|c| status.is_none_or(|s| c.partnership.status == s))
        .filter(|c| query.search.as_deref().is_none_or(|q| c.matches(q)))
        .collect();
    let message = format!("{} companies retrieved successfully", companies.len());
    Ok(Success::ok(companies, message))
}

async fn save(store: &dyn ResourceStore<RentalCompany>, company: RentalCompany) -> ApiResult<RentalCompany> {
    store
        .update(company)
        .await?
        .ok_or(ApiError::NotFound(ResourceKind::Company))
}

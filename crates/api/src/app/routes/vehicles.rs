//! Vehicle endpoints under `/api/vehicles`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query},
    routing::{get, patch},
};
use chrono::Utc;
use serde_json::json;

use fleetgate_auth::{Action, Target};
use fleetgate_core::{OwnedResource, ResourceId, ResourceKind, TenantId, TenantResource};
use fleetgate_fleet::{NewVehicle, RentalCompany, Vehicle, VehicleStatus};
use fleetgate_infra::ResourceStore;

use crate::app::dto::{
    AvailabilityRequest, Payload, SearchQuery, StatusRequest, UpdateVehicleRequest, VehicleListQuery,
};
use crate::app::errors::{ApiError, ApiResult, Success};
use crate::app::services::AppServices;
use crate::context::BearerToken;
use crate::gateway::{Granted, Lookup, Scoped};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/search", get(search_vehicles))
        .route("/company/:company_id", get(list_company_vehicles))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route("/:id/status", patch(update_status))
        .route("/:id/availability", patch(update_availability))
}

/// GET /api/vehicles?company_id=&search=
pub async fn list_vehicles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Query(query): Query<VehicleListQuery>,
) -> ApiResult<Success<Vec<Vehicle>>> {
    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Read, store, Lookup::Collection, |granted| async move {
            let vehicles = visible(store, &granted, |v| {
                query.company_id.as_deref().is_none_or(|c| v.company_id.as_str() == c)
                    && query.search.as_deref().is_none_or(|q| v.matches(q))
            })
            .await?;
            let message = format!("{} vehicles retrieved successfully", vehicles.len());
            Ok(Success::ok(vehicles, message))
        })
        .await
}

/// GET /api/vehicles/search?q=
pub async fn search_vehicles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Success<Vec<Vehicle>>> {
    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Read, store, Lookup::Collection, |granted| async move {
            let q = query.required()?;
            let vehicles = visible(store, &granted, |v| v.matches(q)).await?;
            let message = format!("{} vehicles found matching \"{q}\"", vehicles.len());
            Ok(Success::ok(vehicles, message))
        })
        .await
}

/// GET /api/vehicles/company/:company_id
pub async fn list_company_vehicles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(company_id): Path<String>,
) -> ApiResult<Success<Vec<Vehicle>>> {
    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle_scoped(
            bearer.token(),
            Action::Read,
            ResourceKind::Vehicle,
            services.companies.as_ref(),
            &TenantId::from(company_id),
            |scoped| company_vehicles(store, scoped),
        )
        .await
}

/// POST /api/vehicles
pub async fn create_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    payload: Payload<NewVehicle>,
) -> ApiResult<Success<Vehicle>> {
    let token = bearer.token();
    // The owning company comes from the body, so authenticate before reading it.
    services.gateway.authenticate(token)?;

    let input = payload.into_inner()?;
    let company_id = input.company_id.trim();
    if company_id.is_empty() {
        return Err(ApiError::validation("Missing required field: company_id"));
    }
    let tenant_id = TenantId::from(company_id);

    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle_scoped(
            token,
            Action::Create,
            ResourceKind::Vehicle,
            services.companies.as_ref(),
            &tenant_id,
            |scoped| register_vehicle(store, scoped, input),
        )
        .await
}

/// GET /api/vehicles/:id
pub async fn get_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
) -> ApiResult<Success<Vehicle>> {
    let id = ResourceId::from(id);
    services
        .gateway
        .handle(
            bearer.token(),
            Action::Read,
            services.vehicles.as_ref(),
            Lookup::Record(&id),
            |granted| async move {
                let (_, vehicle) = granted.into_record()?;
                Ok(Success::ok(vehicle, "Vehicle retrieved successfully"))
            },
        )
        .await
}

/// PUT /api/vehicles/:id
///
/// Requires `update`; a changed `company_id` additionally requires
/// `change_ownership` and an existing target company.
pub async fn update_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
    payload: Payload<UpdateVehicleRequest>,
) -> ApiResult<Success<Vehicle>> {
    let id = ResourceId::from(id);
    services
        .gateway
        .handle(
            bearer.token(),
            Action::Update,
            services.vehicles.as_ref(),
            Lookup::Record(&id),
            |granted| apply_update(&services, granted, payload),
        )
        .await
}

/// DELETE /api/vehicles/:id
pub async fn delete_vehicle(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
) -> ApiResult<Success<serde_json::Value>> {
    let id = ResourceId::from(id);
    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Delete, store, Lookup::Record(&id), |granted| {
            remove(store, granted)
        })
        .await
}

/// PATCH /api/vehicles/:id/status
pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
    payload: Payload<StatusRequest>,
) -> ApiResult<Success<Vehicle>> {
    let id = ResourceId::from(id);
    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Update, store, Lookup::Record(&id), |granted| async move {
            let (_, mut vehicle) = granted.into_record()?;
            let status: VehicleStatus = payload.into_inner()?.status.parse()?;
            vehicle.set_status(status, Utc::now());
            let vehicle = save(store, vehicle).await?;
            Ok(Success::ok(vehicle, format!("Vehicle status updated to {status} successfully")))
        })
        .await
}

/// PATCH /api/vehicles/:id/availability
pub async fn update_availability(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
    Path(id): Path<String>,
    payload: Payload<AvailabilityRequest>,
) -> ApiResult<Success<Vehicle>> {
    let id = ResourceId::from(id);
    let store = services.vehicles.as_ref();
    services
        .gateway
        .handle(bearer.token(), Action::Update, store, Lookup::Record(&id), |granted| async move {
            let (_, mut vehicle) = granted.into_record()?;
            let request = payload.into_inner()?;
            let available = request.available()?;
            vehicle.set_availability(available, request.available_from, Utc::now());
            let vehicle = save(store, vehicle).await?;
            let label = if available { "available" } else { "unavailable" };
            Ok(Success::ok(vehicle, format!("Vehicle availability updated to {label} successfully")))
        })
        .await
}

// ─────────────────────────────────────────────────────────────────────────────
// Operations (run only after the gateway has authorized the request)
// ─────────────────────────────────────────────────────────────────────────────

/// Stored vehicles the caller may read, narrowed by `keep`.
async fn visible(
    store: &dyn ResourceStore<Vehicle>,
    granted: &Granted<Vehicle>,
    keep: impl Fn(&Vehicle) -> bool,
) -> ApiResult<Vec<Vehicle>> {
    Ok(store
        .list()
        .await?
        .into_iter()
        .filter(|v| granted.can(Action::Read, v) && keep(v))
        .collect())
}

async fn company_vehicles(
    store: &dyn ResourceStore<Vehicle>,
    scoped: Scoped<RentalCompany>,
) -> ApiResult<Success<Vec<Vehicle>>> {
    let tenant = scoped.tenant.tenant_id();
    let vehicles: Vec<Vehicle> = store
        .list()
        .await?
        .into_iter()
        .filter(|v| v.company_id == tenant)
        .collect();
    let message = format!("{} vehicles found for company {}", vehicles.len(), scoped.tenant.name);
    Ok(Success::ok(vehicles, message))
}

async fn register_vehicle(
    store: &dyn ResourceStore<Vehicle>,
    scoped: Scoped<RentalCompany>,
    input: NewVehicle,
) -> ApiResult<Success<Vehicle>> {
    input.validate()?;
    let company = scoped.tenant;
    let vehicle = input.into_vehicle(company.tenant_id(), company.name.clone(), Utc::now());
    let vehicle = store.insert(vehicle).await?;
    tracing::info!(
        vehicle_id = %vehicle.id,
        company_id = %vehicle.company_id,
        subject = %scoped.principal.subject_id(),
        "vehicle registered"
    );
    Ok(Success::created(vehicle, "Vehicle created successfully"))
}

async fn apply_update(
    services: &AppServices,
    granted: Granted<Vehicle>,
    payload: Payload<UpdateVehicleRequest>,
) -> ApiResult<Success<Vehicle>> {
    let (principal, mut vehicle) = granted.into_record()?;
    let changes = payload.into_inner()?;
    let now = Utc::now();

    let new_owner = changes
        .company_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != vehicle.company_id.as_str());
    if let Some(target) = new_owner {
        services.gateway.authorize(
            &principal,
            Action::ChangeOwnership,
            Target::Resource(&vehicle.descriptor()),
            &[],
        )?;
        let company = services
            .companies
            .get(&ResourceId::from(target))
            .await?
            .ok_or(ApiError::NotFound(ResourceKind::Company))?;
        tracing::info!(
            vehicle_id = %vehicle.id,
            from = %vehicle.company_id,
            to = %company.id,
            "vehicle ownership changed"
        );
        vehicle.reassign(company.tenant_id(), company.name.clone(), now);
    }

    if let Some(code) = changes.fleet_code {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::validation("Missing required field: fleet_code"));
        }
        vehicle.fleet_code = code.to_string();
    }
    if let Some(info) = changes.info {
        if info.plate_number.trim().is_empty() {
            return Err(ApiError::validation("Missing required field: info.plate_number"));
        }
        vehicle.info = info;
    }
    if let Some(rental) = changes.rental {
        vehicle.rental = rental;
    }
    if let Some(status) = changes.status {
        vehicle.status = status.parse()?;
    }
    vehicle.last_updated = now;

    let vehicle = save(services.vehicles.as_ref(), vehicle).await?;
    Ok(Success::ok(vehicle, "Vehicle updated successfully"))
}

async fn remove(store: &dyn ResourceStore<Vehicle>, granted: Granted<Vehicle>) -> ApiResult<Success<serde_json::Value>> {
    let (_, vehicle) = granted.into_record()?;
    // A concurrent delete may have won since the lookup.
    let removed = store
        .delete(vehicle.resource_id())
        .await?
        .ok_or(ApiError::NotFound(ResourceKind::Vehicle))?;
    Ok(Success::ok(json!({ "id": removed.id }), "Vehicle deleted successfully"))
}

async fn save(store: &dyn ResourceStore<Vehicle>, vehicle: Vehicle) -> ApiResult<Vehicle> {
    store
        .update(vehicle)
        .await?
        .ok_or(ApiError::NotFound(ResourceKind::Vehicle))
}

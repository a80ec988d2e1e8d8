use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};

use fleetgate_fleet::{RentalTerms, VehicleInfo};

use crate::app::errors::{ApiError, ApiResult};

/// JSON body that never rejects the request by itself.
///
/// Axum's `Json` rejects before the handler runs, which would let a malformed
/// body answer 400 ahead of the 401/403 the gateway owes. The parse outcome is
/// carried into the handler and surfaced after authorization instead.
#[derive(Debug)]
pub struct Payload<T>(Result<T, String>);

impl<T> Payload<T> {
    pub fn into_inner(self) -> ApiResult<T> {
        self.0.map_err(ApiError::Validation)
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| value)
            .map_err(|rejection| rejection.body_text());
        Ok(Payload(parsed))
    }
}

// -------------------------
// Request DTOs
// -------------------------

/// Partial vehicle update. A `company_id` different from the current owner
/// is an ownership change.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVehicleRequest {
    pub company_id: Option<String>,
    pub fleet_code: Option<String>,
    pub info: Option<VehicleInfo>,
    pub rental: Option<RentalTerms>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    /// Kept untyped so a non-boolean gets a specific message.
    pub available: Option<serde_json::Value>,
    pub available_from: Option<DateTime<Utc>>,
}

impl AvailabilityRequest {
    pub fn available(&self) -> ApiResult<bool> {
        self.available
            .as_ref()
            .and_then(serde_json::Value::as_bool)
            .ok_or_else(|| ApiError::validation("Availability must be a boolean value"))
    }
}

// -------------------------
// Query parameters
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    pub company_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn required(&self) -> ApiResult<&str> {
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(ApiError::validation("Search query is required")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

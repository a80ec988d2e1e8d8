//! Fleet vehicle records.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetgate_core::{DomainError, DomainResult, OwnedResource, ResourceId, ResourceKind, TenantId};

use crate::required;

/// Operational status of a vehicle (closed set).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Available,
    Rented,
    Maintenance,
    Reserved,
    Unavailable,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 5] = [
        VehicleStatus::Available,
        VehicleStatus::Rented,
        VehicleStatus::Maintenance,
        VehicleStatus::Reserved,
        VehicleStatus::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Rented => "rented",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Unavailable => "unavailable",
        }
    }
}

impl core::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(
                    "Invalid status. Must be one of: available, rented, maintenance, reserved, unavailable",
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub category: String,
    pub plate_number: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub mileage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalTerms {
    pub daily_rate: f64,
    pub currency: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,
    pub location: String,
}

impl Default for RentalTerms {
    fn default() -> Self {
        Self {
            daily_rate: 0.0,
            currency: "USD".to_string(),
            available: true,
            available_from: None,
            location: String::new(),
        }
    }
}

/// A vehicle owned by one rental company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: ResourceId,
    pub company_id: TenantId,
    pub company_name: String,
    /// Company-assigned fleet code (e.g. `"RC-0042"`).
    pub fleet_code: String,
    pub info: VehicleInfo,
    pub rental: RentalTerms,
    pub status: VehicleStatus,
    pub rental_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Vehicle {
    /// Case-insensitive match across the searchable text fields.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        [
            self.fleet_code.as_str(),
            self.company_name.as_str(),
            self.info.make.as_str(),
            self.info.model.as_str(),
            self.info.plate_number.as_str(),
            self.rental.location.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&q))
    }

    pub fn set_status(&mut self, status: VehicleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.last_updated = now;
    }

    pub fn set_availability(&mut self, available: bool, available_from: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.rental.available = available;
        if available_from.is_some() {
            self.rental.available_from = available_from;
        }
        self.last_updated = now;
    }

    /// Move the vehicle to another company.
    pub fn reassign(&mut self, company_id: TenantId, company_name: String, now: DateTime<Utc>) {
        self.company_id = company_id;
        self.company_name = company_name;
        self.last_updated = now;
    }
}

impl OwnedResource for Vehicle {
    const KIND: ResourceKind = ResourceKind::Vehicle;

    fn resource_id(&self) -> &ResourceId {
        &self.id
    }

    fn owning_tenant_id(&self) -> Option<&TenantId> {
        Some(&self.company_id)
    }
}

/// Validated input for registering a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub company_id: String,
    pub fleet_code: String,
    pub info: VehicleInfo,
    #[serde(default)]
    pub rental: RentalTerms,
}

impl NewVehicle {
    pub fn validate(&self) -> DomainResult<()> {
        required("company_id", &self.company_id)?;
        required("fleet_code", &self.fleet_code)?;
        required("info.make", &self.info.make)?;
        required("info.model", &self.info.model)?;
        required("info.plate_number", &self.info.plate_number)?;
        if self.rental.daily_rate < 0.0 {
            return Err(DomainError::validation("rental.daily_rate must not be negative"));
        }
        Ok(())
    }

    /// Build the stored record under the given company.
    pub fn into_vehicle(self, company_id: TenantId, company_name: String, now: DateTime<Utc>) -> Vehicle {
        Vehicle {
            id: ResourceId::generate("vehicle"),
            company_id,
            company_name,
            fleet_code: self.fleet_code.trim().to_string(),
            info: VehicleInfo {
                plate_number: self.info.plate_number.trim().to_string(),
                ..self.info
            },
            rental: self.rental,
            status: VehicleStatus::default(),
            rental_count: 0,
            created_at: now,
            last_updated: now,
        }
    }
}

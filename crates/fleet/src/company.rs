//! Rental company records. A company is a tenant: it owns itself and every
//! vehicle registered under it.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetgate_core::{
    DomainError, DomainResult, OwnedResource, ResourceId, ResourceKind, TenantId, TenantResource,
};

use crate::required;

/// Partnership status of a rental company (closed set).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

impl PartnershipStatus {
    pub const ALL: [PartnershipStatus; 3] = [
        PartnershipStatus::Pending,
        PartnershipStatus::Active,
        PartnershipStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartnershipStatus::Pending => "pending",
            PartnershipStatus::Active => "active",
            PartnershipStatus::Inactive => "inactive",
        }
    }
}

impl core::fmt::Display for PartnershipStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnershipStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartnershipStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DomainError::validation("Invalid status. Must be one of: pending, active, inactive"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Partnership {
    #[serde(default)]
    pub status: PartnershipStatus,
    #[serde(default)]
    pub commission_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalCompany {
    pub id: ResourceId,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub partnership: Partnership,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentalCompany {
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.name.to_lowercase().contains(&q)
            || self.contact_person.to_lowercase().contains(&q)
            || self.email.to_lowercase().contains(&q)
            || self.address.city.to_lowercase().contains(&q)
    }

    /// Emails are compared case-insensitively for uniqueness.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    pub fn set_status(&mut self, status: PartnershipStatus, now: DateTime<Utc>) {
        self.partnership.status = status;
        self.updated_at = now;
    }

    pub fn apply(&mut self, details: NewCompany, now: DateTime<Utc>) {
        self.name = details.name.trim().to_string();
        self.contact_person = details.contact_person.trim().to_string();
        self.email = details.email.trim().to_string();
        self.phone = details.phone.trim().to_string();
        self.address = details.address;
        self.partnership.commission_rate = details.commission_rate;
        self.updated_at = now;
    }
}

impl OwnedResource for RentalCompany {
    const KIND: ResourceKind = ResourceKind::Company;

    fn resource_id(&self) -> &ResourceId {
        &self.id
    }

    // The owning tenant is the company's own id; `descriptor` projects it.
    fn owning_tenant_id(&self) -> Option<&TenantId> {
        None
    }

    fn descriptor(&self) -> fleetgate_core::Resource {
        fleetgate_core::Resource::new(self.id.clone(), Self::KIND, Some(self.tenant_id()))
    }
}

impl TenantResource for RentalCompany {
    fn tenant_id(&self) -> TenantId {
        TenantId::from(&self.id)
    }

    fn is_active(&self) -> bool {
        self.partnership.status == PartnershipStatus::Active
    }
}

/// Input for registering or editing a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub commission_rate: f64,
}

impl NewCompany {
    pub fn validate(&self) -> DomainResult<PartnershipStatus> {
        required("name", &self.name)?;
        required("contact_person", &self.contact_person)?;
        let email = required("email", &self.email)?;
        if !email.contains('@') {
            return Err(DomainError::validation("email must be a valid address"));
        }
        if !(0.0..=100.0).contains(&self.commission_rate) {
            return Err(DomainError::validation("commission_rate must be between 0 and 100"));
        }
        match &self.status {
            Some(s) => s.parse(),
            None => Ok(PartnershipStatus::default()),
        }
    }

    pub fn into_company(self, status: PartnershipStatus, now: DateTime<Utc>) -> RentalCompany {
        RentalCompany {
            id: ResourceId::generate("company"),
            name: self.name.trim().to_string(),
            contact_person: self.contact_person.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address,
            partnership: Partnership {
                status,
                commission_rate: self.commission_rate,
            },
            created_at: now,
            updated_at: now,
        }
    }
}

//! Rental fleet records: the tenant-owned resources the API protects.

pub mod company;
pub mod vehicle;

pub use company::{Address, NewCompany, Partnership, PartnershipStatus, RentalCompany};
pub use vehicle::{NewVehicle, RentalTerms, Vehicle, VehicleInfo, VehicleStatus};

/// Trim a required text field, rejecting blanks.
pub(crate) fn required(field: &str, value: &str) -> fleetgate_core::DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(fleetgate_core::DomainError::validation(format!(
            "Missing required field: {field}"
        )));
    }
    Ok(trimmed.to_string())
}

//! Demo fleet used by the dev server and the black-box tests.
//!
//! `co-1` and `co-2` are active partners, `co-3` is inactive. Vehicle ids
//! are stable (`veh-1` ..) so tests can address them directly.

use chrono::{DateTime, TimeZone, Utc};

use fleetgate_core::{ResourceId, TenantId};
use fleetgate_fleet::{
    Address, Partnership, PartnershipStatus, RentalCompany, RentalTerms, Vehicle, VehicleInfo, VehicleStatus,
};

/// Fixed creation time for seeded records.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn demo_companies(now: DateTime<Utc>) -> Vec<RentalCompany> {
    let company = |id: &str, name: &str, email: &str, city: &str, status: PartnershipStatus| RentalCompany {
        id: ResourceId::from(id),
        name: name.to_string(),
        contact_person: "Fleet Desk".to_string(),
        email: email.to_string(),
        phone: "+254 700 000 000".to_string(),
        address: Address {
            street: String::new(),
            city: city.to_string(),
            country: "Kenya".to_string(),
        },
        partnership: Partnership {
            status,
            commission_rate: 10.0,
        },
        created_at: now,
        updated_at: now,
    };

    vec![
        company("co-1", "Savannah Car Hire", "ops@savannah.test", "Nairobi", PartnershipStatus::Active),
        company("co-2", "Coastline Rentals", "desk@coastline.test", "Mombasa", PartnershipStatus::Active),
        company("co-3", "Highland Motors", "info@highland.test", "Nyeri", PartnershipStatus::Inactive),
    ]
}

pub fn demo_vehicles(now: DateTime<Utc>) -> Vec<Vehicle> {
    let vehicle = |id: &str, company: (&str, &str), code: &str, make: &str, model: &str, plate: &str, rate: f64| {
        Vehicle {
            id: ResourceId::from(id),
            company_id: TenantId::from(company.0),
            company_name: company.1.to_string(),
            fleet_code: code.to_string(),
            info: VehicleInfo {
                make: make.to_string(),
                model: model.to_string(),
                year: 2022,
                category: "suv".to_string(),
                plate_number: plate.to_string(),
                vin: String::new(),
                color: "white".to_string(),
                mileage: 18_500,
            },
            rental: RentalTerms {
                daily_rate: rate,
                currency: "KES".to_string(),
                available: true,
                available_from: None,
                location: company.1.split(' ').next().unwrap_or_default().to_string(),
            },
            status: VehicleStatus::Available,
            rental_count: 0,
            created_at: now,
            last_updated: now,
        }
    };

    let savannah = ("co-1", "Savannah Car Hire");
    let coastline = ("co-2", "Coastline Rentals");
    let highland = ("co-3", "Highland Motors");

    vec![
        vehicle("veh-1", savannah, "SCH-001", "Toyota", "Land Cruiser", "KDA 101A", 12_000.0),
        vehicle("veh-2", savannah, "SCH-002", "Subaru", "Forester", "KDA 102B", 7_500.0),
        vehicle("veh-3", coastline, "CLR-001", "Nissan", "X-Trail", "KDB 201C", 8_000.0),
        vehicle("veh-4", coastline, "CLR-002", "Mazda", "CX-5", "KDB 202D", 8_500.0),
        vehicle("veh-5", highland, "HLM-001", "Mitsubishi", "Pajero", "KDC 301E", 9_000.0),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fleetgate_core::TenantResource;

    use super::*;

    #[test]
    fn every_vehicle_belongs_to_a_seeded_company() {
        let companies: HashSet<TenantId> = demo_companies(epoch()).iter().map(|c| c.tenant_id()).collect();
        for v in demo_vehicles(epoch()) {
            assert!(companies.contains(&v.company_id), "{} has unknown company", v.id);
        }
    }

    #[test]
    fn only_co_3_is_inactive() {
        let inactive: Vec<_> = demo_companies(epoch())
            .into_iter()
            .filter(|c| !c.is_active())
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(inactive, vec!["co-3".to_string()]);
    }
}

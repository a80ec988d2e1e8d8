//! Service wiring: decoder, gateway and record stores.

use std::sync::Arc;

use chrono::Utc;

use fleetgate_auth::{CredentialDecoder, Hs256Decoder};
use fleetgate_fleet::{RentalCompany, Vehicle};
use fleetgate_infra::{InMemoryStore, ResourceStore, seed};

use crate::config::ApiConfig;
use crate::gateway::Gateway;

pub struct AppServices {
    pub gateway: Gateway,
    pub vehicles: Arc<dyn ResourceStore<Vehicle>>,
    pub companies: Arc<dyn ResourceStore<RentalCompany>>,
}

impl AppServices {
    pub fn new(
        decoder: Arc<dyn CredentialDecoder>,
        vehicles: Arc<dyn ResourceStore<Vehicle>>,
        companies: Arc<dyn ResourceStore<RentalCompany>>,
    ) -> Self {
        Self {
            gateway: Gateway::new(decoder),
            vehicles,
            companies,
        }
    }
}

/// Build the in-memory services described by `config`.
pub fn build_services(config: &ApiConfig) -> AppServices {
    let mut decoder = Hs256Decoder::new(config.jwt_secret.as_bytes());
    if let Some(issuer) = &config.jwt_issuer {
        decoder = decoder.with_issuer(issuer.clone());
    }

    let (vehicles, companies) = if config.seed_demo_data {
        let now = Utc::now();
        tracing::info!("seeding demo fleet");
        (
            InMemoryStore::with_records(seed::demo_vehicles(now)),
            InMemoryStore::with_records(seed::demo_companies(now)),
        )
    } else {
        (InMemoryStore::new(), InMemoryStore::new())
    };

    AppServices::new(Arc::new(decoder), Arc::new(vehicles), Arc::new(companies))
}

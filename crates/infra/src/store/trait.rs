use async_trait::async_trait;
use thiserror::Error;

use fleetgate_core::{OwnedResource, ResourceId};
use fleetgate_fleet::{RentalCompany, Vehicle};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field (plate number, email) or id collides with a stored record.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A record with a natural key that must be unique within its store.
///
/// Keys are normalized by the implementor; the store compares them verbatim.
pub trait UniqueKey {
    fn unique_key(&self) -> String;

    /// Message used when two records share a key.
    fn conflict_message() -> &'static str;
}

impl UniqueKey for Vehicle {
    fn unique_key(&self) -> String {
        self.info
            .plate_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }

    fn conflict_message() -> &'static str {
        "Vehicle with this plate number already exists"
    }
}

impl UniqueKey for RentalCompany {
    fn unique_key(&self) -> String {
        self.email.trim().to_lowercase()
    }

    fn conflict_message() -> &'static str {
        "Company with this email already exists"
    }
}

/// Async CRUD boundary for tenant-owned records.
///
/// Stores know nothing about principals: every call is made by the gateway
/// after authorization has succeeded.
#[async_trait]
pub trait ResourceStore<R>: Send + Sync
where
    R: OwnedResource + Send + Sync,
{
    async fn get(&self, id: &ResourceId) -> Result<Option<R>, StoreError>;

    /// All records, ordered by id.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Replace an existing record. `Ok(None)` when the id is unknown.
    async fn update(&self, record: R) -> Result<Option<R>, StoreError>;

    /// Remove a record, returning it. `Ok(None)` when the id is unknown.
    async fn delete(&self, id: &ResourceId) -> Result<Option<R>, StoreError>;
}

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use fleetgate_core::{OwnedResource, ResourceId};

use super::r#trait::{ResourceStore, StoreError, UniqueKey};

/// In-memory record store, ordered by id.
///
/// Intended for tests/dev. Unique keys are checked under the write lock, so
/// two concurrent inserts of the same plate cannot both succeed.
#[derive(Debug)]
pub struct InMemoryStore<R> {
    records: RwLock<BTreeMap<ResourceId, R>>,
}

impl<R> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<R> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> InMemoryStore<R>
where
    R: OwnedResource + UniqueKey,
{
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.resource_id().clone(), r))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    fn ensure_unique(map: &BTreeMap<ResourceId, R>, record: &R) -> Result<(), StoreError> {
        let key = record.unique_key();
        let taken = map
            .values()
            .any(|other| other.resource_id() != record.resource_id() && other.unique_key() == key);
        if taken {
            return Err(StoreError::Conflict(R::conflict_message().to_string()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl<R> ResourceStore<R> for InMemoryStore<R>
where
    R: OwnedResource + UniqueKey + Clone + Send + Sync + 'static,
{
    async fn get(&self, id: &ResourceId) -> Result<Option<R>, StoreError> {
        let map = self.records.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let map = self.records.read().map_err(poisoned)?;
        Ok(map.values().cloned().collect())
    }

    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut map = self.records.write().map_err(poisoned)?;
        if map.contains_key(record.resource_id()) {
            return Err(StoreError::Conflict(format!(
                "{} {} already exists",
                R::KIND.label(),
                record.resource_id()
            )));
        }
        Self::ensure_unique(&map, &record)?;
        map.insert(record.resource_id().clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, record: R) -> Result<Option<R>, StoreError> {
        let mut map = self.records.write().map_err(poisoned)?;
        if !map.contains_key(record.resource_id()) {
            return Ok(None);
        }
        Self::ensure_unique(&map, &record)?;
        map.insert(record.resource_id().clone(), record.clone());
        Ok(Some(record))
    }

    async fn delete(&self, id: &ResourceId) -> Result<Option<R>, StoreError> {
        let mut map = self.records.write().map_err(poisoned)?;
        Ok(map.remove(id))
    }
}

//! Infrastructure layer: record stores and demo data.

pub mod seed;
pub mod store;

pub use store::{InMemoryStore, ResourceStore, StoreError, UniqueKey};

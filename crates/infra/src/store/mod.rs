//! Record storage boundary for vehicles and rental companies.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use r#trait::{ResourceStore, StoreError, UniqueKey};

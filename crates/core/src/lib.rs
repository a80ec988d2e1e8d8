//! `fleetgate-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod resource;

pub use error::{DomainError, DomainResult};
pub use id::{ResourceId, TenantId};
pub use resource::{OwnedResource, Resource, ResourceKind, TenantResource};

//! # CMS Core
//!
//! Domain entities, repository traits, and the RBAC services: permission and
//! role stores, module registry, menu tree, menu composer, and the path
//! authorization guard.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;

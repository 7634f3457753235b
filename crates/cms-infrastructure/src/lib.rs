//! # CMS Infrastructure
//!
//! Repository adapters: PostgreSQL for deployments, an in-memory store for
//! tests and local tooling.

pub mod database;
pub mod memory;

pub use database::{
    check_health, create_pool, run_migrations, PgMenuItemRepository, PgModuleRepository,
    PgPermissionRepository, PgRoleRepository, PgUserRepository,
};
pub use memory::InMemoryStore;

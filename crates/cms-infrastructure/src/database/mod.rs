//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;

pub use connection::{check_health, create_pool, run_migrations};
pub use postgres::{
    PgMenuItemRepository, PgModuleRepository, PgPermissionRepository, PgRoleRepository, PgUserRepository,
};

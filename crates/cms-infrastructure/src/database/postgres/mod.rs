//! PostgreSQL repository implementations

mod rows;

pub mod permission_repo_impl;
pub mod role_repo_impl;
pub mod module_repo_impl;
pub mod menu_item_repo_impl;
pub mod user_repo_impl;

pub use permission_repo_impl::PgPermissionRepository;
pub use role_repo_impl::PgRoleRepository;
pub use module_repo_impl::PgModuleRepository;
pub use menu_item_repo_impl::PgMenuItemRepository;
pub use user_repo_impl::PgUserRepository;

use cms_core::error::DomainError;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a sqlx error to a domain error, logging it under `action`.
/// Unique violations surface as a duplicate on `field`.
pub(crate) fn db_error(action: &'static str, field: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e: sqlx::Error| {
        let code = e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => DomainError::duplicate(field),
            Some(FOREIGN_KEY_VIOLATION) => {
                error!("Foreign key violation {}: {}", action, e);
                DomainError::Conflict(format!("Cannot complete {}: the record is still referenced", action))
            }
            _ => {
                error!("Database error {}: {}", action, e);
                DomainError::DatabaseError(e.to_string())
            }
        }
    }
}

/// `%term%` for ILIKE filters, with LIKE wildcards in `term` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("manage"), "%manage%");
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
    }
}

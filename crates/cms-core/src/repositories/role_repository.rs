//! Role repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Guard, Permission, Role};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, DomainError>;
    async fn find_by_name(&self, name: &str, guard: Guard) -> Result<Option<Role>, DomainError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Role>, DomainError>;
    async fn list(&self, search: Option<String>) -> Result<Vec<Role>, DomainError>;
    async fn permissions_of(&self, id: &Uuid) -> Result<Vec<Permission>, DomainError>;
    /// Inserts the role and links `permission_ids` in one transaction.
    async fn create_with_permissions(&self, role: &Role, permission_ids: &[Uuid]) -> Result<Role, DomainError>;
    /// Updates the role row; when `permission_ids` is `Some`, the permission
    /// set is replaced by exactly that set in the same transaction.
    async fn update_with_permissions(
        &self,
        role: &Role,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<Role, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn count_users(&self, id: &Uuid) -> Result<i64, DomainError>;
}

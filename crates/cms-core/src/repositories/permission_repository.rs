//! Permission repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Guard, Permission};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Permission>, DomainError>;
    async fn find_by_name(&self, name: &str, guard: Guard) -> Result<Option<Permission>, DomainError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Permission>, DomainError>;
    /// Ordered by name; `search` is a substring filter on the name.
    async fn list(&self, search: Option<String>) -> Result<Vec<Permission>, DomainError>;
    async fn create(&self, permission: &Permission) -> Result<Permission, DomainError>;
    async fn update(&self, permission: &Permission) -> Result<Permission, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    /// Names of the roles currently holding the permission.
    async fn role_names(&self, id: &Uuid) -> Result<Vec<String>, DomainError>;
    /// Names of the menu items gated by the permission.
    async fn menu_item_names(&self, id: &Uuid) -> Result<Vec<String>, DomainError>;
}

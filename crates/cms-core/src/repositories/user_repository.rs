//! User repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Guard, Role, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn list(&self, search: Option<String>) -> Result<Vec<User>, DomainError>;
    async fn create(&self, user: &User) -> Result<User, DomainError>;
    async fn roles_of(&self, id: &Uuid) -> Result<Vec<Role>, DomainError>;
    /// Names of the roles the user holds under `guard`.
    async fn role_names(&self, id: &Uuid, guard: Guard) -> Result<Vec<String>, DomainError>;
    /// Union of the permission names of every role held under `guard`.
    async fn permission_names(&self, id: &Uuid, guard: Guard) -> Result<Vec<String>, DomainError>;
    /// Replaces the user's roles with exactly `role_ids`, atomically.
    async fn sync_roles(&self, id: &Uuid, role_ids: &[Uuid]) -> Result<(), DomainError>;
    /// Adds one role; holding it already is not an error.
    async fn assign_role(&self, id: &Uuid, role_id: &Uuid) -> Result<(), DomainError>;
    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), DomainError>;
}

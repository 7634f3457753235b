//! Module repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Module;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Module>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Module>, DomainError>;
    /// Ordered by `order`, then creation.
    async fn list(&self, search: Option<String>, is_active: Option<bool>) -> Result<Vec<Module>, DomainError>;
    async fn create(&self, module: &Module) -> Result<Module, DomainError>;
    async fn update(&self, module: &Module) -> Result<Module, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn count_menu_items(&self, id: &Uuid) -> Result<i64, DomainError>;
}

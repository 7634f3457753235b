//! Menu item repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{MenuItem, MenuItemFilter, MenuItemNode, Permission};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError>;
    /// Ordered by `order`, then creation.
    async fn list(&self, filter: &MenuItemFilter) -> Result<Vec<MenuItem>, DomainError>;
    async fn children_of(&self, id: &Uuid) -> Result<Vec<MenuItem>, DomainError>;
    async fn permissions_of(&self, id: &Uuid) -> Result<Vec<Permission>, DomainError>;
    /// Inserts the item and links `permission_ids` in one transaction.
    async fn create_with_permissions(&self, item: &MenuItem, permission_ids: &[Uuid]) -> Result<MenuItem, DomainError>;
    /// Updates the item row; `Some` replaces the permission links exactly.
    async fn update_with_permissions(
        &self,
        item: &MenuItem,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<MenuItem, DomainError>;
    /// Removes the item together with its subtree.
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    /// Every active item with its required permission names, ordered by
    /// `order`, then creation.
    async fn active_nodes(&self) -> Result<Vec<MenuItemNode>, DomainError>;
    /// Items whose url contains `path`, or whose url is a segment prefix of
    /// `path`, with their required permission names.
    async fn nodes_matching_path(&self, path: &str) -> Result<Vec<MenuItemNode>, DomainError>;
}

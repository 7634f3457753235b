// ============================================================================
// CMS Core - Menu Item Service
// File: crates/cms-core/src/services/menu_item_service.rs
// ============================================================================
//! Menu tree maintenance. Items reference their module and parent by id;
//! writes keep the parent chain acyclic.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{MenuItem, MenuItemDetail, MenuItemFilter, Permission};
use crate::error::DomainError;
use crate::repositories::{MenuItemRepository, ModuleRepository, PermissionRepository};

/// Fields accepted by create and update. On update, `None` for `order` and
/// `is_active` keeps the stored value, and `None` for `permission_ids`
/// leaves the permission links untouched.
#[derive(Debug, Clone)]
pub struct MenuItemInput {
    pub module_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub permission_ids: Option<Vec<Uuid>>,
}

pub struct MenuItemService {
    menu_items: Arc<dyn MenuItemRepository>,
    modules: Arc<dyn ModuleRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl MenuItemService {
    pub fn new(
        menu_items: Arc<dyn MenuItemRepository>,
        modules: Arc<dyn ModuleRepository>,
        permissions: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self { menu_items, modules, permissions }
    }

    pub async fn list(&self, filter: &MenuItemFilter) -> Result<Vec<MenuItemDetail>, DomainError> {
        let items = self.menu_items.list(filter).await?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(self.detail(item).await?);
        }
        Ok(result)
    }

    pub async fn get(&self, id: &Uuid) -> Result<MenuItemDetail, DomainError> {
        let item = self.find(id).await?;
        self.detail(item).await
    }

    pub async fn create(&self, input: MenuItemInput) -> Result<MenuItemDetail, DomainError> {
        let item = MenuItem::new(
            input.module_id,
            input.parent_id,
            input.name,
            input.url,
            input.icon,
            input.order.unwrap_or(0),
            input.is_active.unwrap_or(true),
        )?;

        self.require_module(&item.module_id).await?;
        if let Some(parent_id) = item.parent_id {
            self.require_parent(&parent_id).await?;
        }
        let permission_ids = self
            .resolve_permissions(input.permission_ids.as_deref().unwrap_or_default())
            .await?;

        let created = self.menu_items.create_with_permissions(&item, &permission_ids).await?;
        info!("Menu item created: {} ({:?})", created.name, created.url);
        self.detail(created).await
    }

    pub async fn update(&self, id: &Uuid, input: MenuItemInput) -> Result<MenuItemDetail, DomainError> {
        let current = self.find(id).await?;

        if input.parent_id == Some(*id) {
            return Err(DomainError::validation("parent_id", "A menu item cannot be its own parent"));
        }

        let mut item = MenuItem::new(
            input.module_id,
            input.parent_id,
            input.name,
            input.url,
            input.icon,
            input.order.unwrap_or(current.order),
            input.is_active.unwrap_or(current.is_active),
        )?;
        item.id = current.id;
        item.timestamps.created_at = current.timestamps.created_at;

        self.require_module(&item.module_id).await?;
        if let Some(parent_id) = item.parent_id {
            self.require_parent(&parent_id).await?;
            self.reject_descendant_parent(id, parent_id).await?;
        }

        let permission_ids = match input.permission_ids {
            Some(ids) => Some(self.resolve_permissions(&ids).await?),
            None => None,
        };

        let updated = self.menu_items.update_with_permissions(&item, permission_ids).await?;
        info!("Menu item updated: {}", updated.name);
        self.detail(updated).await
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let item = self.find(id).await?;
        self.menu_items.delete(id).await?;
        info!("Menu item deleted: {}", item.name);
        Ok(())
    }

    async fn detail(&self, item: MenuItem) -> Result<MenuItemDetail, DomainError> {
        let permissions: Vec<Permission> = self.menu_items.permissions_of(&item.id).await?;
        let children = self.menu_items.children_of(&item.id).await?;
        Ok(MenuItemDetail { item, permissions, children })
    }

    async fn require_module(&self, module_id: &Uuid) -> Result<(), DomainError> {
        match self.modules.find_by_id(module_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Module")),
        }
    }

    async fn require_parent(&self, parent_id: &Uuid) -> Result<(), DomainError> {
        match self.menu_items.find_by_id(parent_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Parent menu item")),
        }
    }

    /// Walks up from `parent_id`; reaching `id` means the move would make the
    /// item its own ancestor.
    async fn reject_descendant_parent(&self, id: &Uuid, parent_id: Uuid) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);

        while let Some(current) = cursor {
            if current == *id {
                warn!("Rejected menu item move creating a cycle: {} under {}", id, parent_id);
                return Err(DomainError::validation(
                    "parent_id",
                    "A menu item cannot be moved beneath one of its own descendants",
                ));
            }
            if !seen.insert(current) {
                break;
            }
            cursor = self
                .menu_items
                .find_by_id(&current)
                .await?
                .and_then(|item| item.parent_id);
        }
        Ok(())
    }

    async fn resolve_permissions(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, DomainError> {
        let mut wanted: Vec<Uuid> = ids.to_vec();
        wanted.sort();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(wanted);
        }

        let found = self.permissions.find_by_ids(&wanted).await?;
        if found.len() != wanted.len() {
            return Err(DomainError::validation(
                "permission_ids",
                "The selected permission_ids is invalid.",
            ));
        }
        Ok(wanted)
    }

    async fn find(&self, id: &Uuid) -> Result<MenuItem, DomainError> {
        self.menu_items
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Menu item"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::Module;
    use crate::repositories::{MockMenuItemRepository, MockModuleRepository, MockPermissionRepository};

    fn input(module_id: Uuid, parent_id: Option<Uuid>) -> MenuItemInput {
        MenuItemInput {
            module_id,
            parent_id,
            name: "Press Releases".to_string(),
            url: Some("/admin/press-releases".to_string()),
            icon: None,
            order: Some(1),
            is_active: None,
            permission_ids: None,
        }
    }

    fn item(module_id: Uuid, parent_id: Option<Uuid>) -> MenuItem {
        MenuItem::new(module_id, parent_id, "Item".into(), None, None, 0, true).unwrap()
    }

    fn known_module() -> MockModuleRepository {
        let mut modules = MockModuleRepository::new();
        modules
            .expect_find_by_id()
            .returning(|_| Ok(Some(Module::new("Content".into(), None, None, 2, true).unwrap())));
        modules
    }

    fn with_detail_lookups(repo: &mut MockMenuItemRepository) {
        repo.expect_permissions_of().returning(|_| Ok(vec![]));
        repo.expect_children_of().returning(|_| Ok(vec![]));
    }

    #[tokio::test]
    async fn test_create_requires_existing_module() {
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(|_| Ok(None));
        let mut items = MockMenuItemRepository::new();
        items.expect_create_with_permissions().never();

        let service = MenuItemService::new(Arc::new(items), Arc::new(modules), Arc::new(MockPermissionRepository::new()));
        let err = service.create(input(Uuid::new_v4(), None)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "Module not found"));
    }

    #[tokio::test]
    async fn test_create_requires_existing_parent() {
        let mut items = MockMenuItemRepository::new();
        items.expect_find_by_id().returning(|_| Ok(None));
        items.expect_create_with_permissions().never();

        let service = MenuItemService::new(Arc::new(items), Arc::new(known_module()), Arc::new(MockPermissionRepository::new()));
        let err = service.create(input(Uuid::new_v4(), Some(Uuid::new_v4()))).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "Parent menu item not found"));
    }

    #[tokio::test]
    async fn test_create_with_unknown_permission() {
        let mut items = MockMenuItemRepository::new();
        items.expect_create_with_permissions().never();
        let mut permissions = MockPermissionRepository::new();
        permissions.expect_find_by_ids().returning(|_| Ok(vec![]));

        let service = MenuItemService::new(Arc::new(items), Arc::new(known_module()), Arc::new(permissions));
        let mut request = input(Uuid::new_v4(), None);
        request.permission_ids = Some(vec![Uuid::new_v4()]);
        assert!(matches!(service.create(request).await, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let mut items = MockMenuItemRepository::new();
        items.expect_create_with_permissions().returning(|i, _| Ok(i.clone()));
        with_detail_lookups(&mut items);

        let service = MenuItemService::new(Arc::new(items), Arc::new(known_module()), Arc::new(MockPermissionRepository::new()));
        let mut request = input(Uuid::new_v4(), None);
        request.order = None;
        let created = service.create(request).await.unwrap();
        assert_eq!(created.item.order, 0);
        assert!(created.item.is_active);
    }

    #[tokio::test]
    async fn test_update_self_parent_fails_regardless_of_other_fields() {
        let current = item(Uuid::new_v4(), None);
        let id = current.id;
        let mut items = MockMenuItemRepository::new();
        items.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        items.expect_update_with_permissions().never();

        // Module lookup would fail too, but self-parenting is reported first.
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(|_| Ok(None));

        let service = MenuItemService::new(Arc::new(items), Arc::new(modules), Arc::new(MockPermissionRepository::new()));
        let mut request = input(Uuid::new_v4(), Some(id));
        request.name = String::new();
        let err = service.update(&id, request).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "parent_id"));
    }

    #[tokio::test]
    async fn test_update_rejects_descendant_as_parent() {
        let module_id = Uuid::new_v4();
        let root = item(module_id, None);
        let child = item(module_id, Some(root.id));
        let grandchild = item(module_id, Some(child.id));
        let root_id = root.id;
        let grandchild_id = grandchild.id;

        let store: HashMap<Uuid, MenuItem> = [root, child, grandchild]
            .into_iter()
            .map(|i| (i.id, i))
            .collect();
        let mut items = MockMenuItemRepository::new();
        items
            .expect_find_by_id()
            .returning(move |id| Ok(store.get(id).cloned()));
        items.expect_update_with_permissions().never();

        let service = MenuItemService::new(Arc::new(items), Arc::new(known_module()), Arc::new(MockPermissionRepository::new()));
        let err = service
            .update(&root_id, input(module_id, Some(grandchild_id)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "parent_id"));
    }

    #[tokio::test]
    async fn test_update_to_sibling_parent_succeeds() {
        let module_id = Uuid::new_v4();
        let a = item(module_id, None);
        let b = item(module_id, None);
        let (a_id, b_id) = (a.id, b.id);
        let store: HashMap<Uuid, MenuItem> = [a, b].into_iter().map(|i| (i.id, i)).collect();

        let mut items = MockMenuItemRepository::new();
        items.expect_find_by_id().returning(move |id| Ok(store.get(id).cloned()));
        items
            .expect_update_with_permissions()
            .withf(|_, ids| ids.is_none())
            .returning(|i, _| Ok(i.clone()));
        with_detail_lookups(&mut items);

        let service = MenuItemService::new(Arc::new(items), Arc::new(known_module()), Arc::new(MockPermissionRepository::new()));
        let updated = service.update(&a_id, input(module_id, Some(b_id))).await.unwrap();
        assert_eq!(updated.item.parent_id, Some(b_id));
        assert_eq!(updated.item.id, a_id);
    }
}

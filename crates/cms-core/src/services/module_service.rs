// ============================================================================
// CMS Core - Module Service
// File: crates/cms-core/src/services/module_service.rs
// ============================================================================
//! Module registry CRUD. Deleting a module that still owns menu items is
//! refused, mirroring the role and permission deletion guards.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{MenuItemFilter, Module, ModuleWithMenuItems};
use crate::error::DomainError;
use crate::repositories::{MenuItemRepository, ModuleRepository};

/// Fields accepted by create and update.
#[derive(Debug, Clone)]
pub struct ModuleInput {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

pub struct ModuleService {
    modules: Arc<dyn ModuleRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
}

impl ModuleService {
    pub fn new(modules: Arc<dyn ModuleRepository>, menu_items: Arc<dyn MenuItemRepository>) -> Self {
        Self { modules, menu_items }
    }

    pub async fn list(&self, search: Option<String>, is_active: Option<bool>) -> Result<Vec<ModuleWithMenuItems>, DomainError> {
        let modules = self.modules.list(search, is_active).await?;
        let mut result = Vec::with_capacity(modules.len());
        for module in modules {
            result.push(self.with_menu_items(module).await?);
        }
        Ok(result)
    }

    pub async fn get(&self, id: &Uuid) -> Result<ModuleWithMenuItems, DomainError> {
        let module = self.find(id).await?;
        self.with_menu_items(module).await
    }

    pub async fn create(&self, input: ModuleInput) -> Result<Module, DomainError> {
        let module = Module::new(
            input.name,
            input.description,
            input.icon,
            input.order.unwrap_or(0),
            input.is_active.unwrap_or(true),
        )?;

        if self.modules.find_by_name(&module.name).await?.is_some() {
            return Err(DomainError::duplicate("name"));
        }

        let created = self.modules.create(&module).await?;
        info!("Module created: {}", created.name);
        Ok(created)
    }

    /// Absent `order` and `is_active` keep their current values.
    pub async fn update(&self, id: &Uuid, input: ModuleInput) -> Result<Module, DomainError> {
        let current = self.find(id).await?;

        let mut module = Module::new(
            input.name,
            input.description,
            input.icon,
            input.order.unwrap_or(current.order),
            input.is_active.unwrap_or(current.is_active),
        )?;
        module.id = current.id;
        module.timestamps.created_at = current.timestamps.created_at;

        if let Some(existing) = self.modules.find_by_name(&module.name).await? {
            if existing.id != module.id {
                return Err(DomainError::duplicate("name"));
            }
        }

        self.modules.update(&module).await
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let module = self.find(id).await?;

        let owned = self.modules.count_menu_items(id).await?;
        if owned > 0 {
            warn!("Refusing to delete module {} owning {} menu items", module.name, owned);
            return Err(DomainError::Conflict(
                "Cannot delete module because it still has menu items".to_string(),
            ));
        }

        self.modules.delete(id).await?;
        info!("Module deleted: {}", module.name);
        Ok(())
    }

    async fn with_menu_items(&self, module: Module) -> Result<ModuleWithMenuItems, DomainError> {
        let filter = MenuItemFilter {
            module_id: Some(module.id),
            ..Default::default()
        };
        let menu_items = self.menu_items.list(&filter).await?;
        Ok(ModuleWithMenuItems { module, menu_items })
    }

    async fn find(&self, id: &Uuid) -> Result<Module, DomainError> {
        self.modules
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Module"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockMenuItemRepository, MockModuleRepository};

    fn input(name: &str) -> ModuleInput {
        ModuleInput {
            name: name.to_string(),
            description: None,
            icon: None,
            order: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_order_and_active() {
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_name().returning(|_| Ok(None));
        modules.expect_create().returning(|m| Ok(m.clone()));

        let service = ModuleService::new(Arc::new(modules), Arc::new(MockMenuItemRepository::new()));
        let created = service.create(input("Settings")).await.unwrap();
        assert_eq!(created.order, 0);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let mut modules = MockModuleRepository::new();
        modules
            .expect_find_by_name()
            .returning(|name| Ok(Some(Module::new(name.to_string(), None, None, 1, true).unwrap())));

        let service = ModuleService::new(Arc::new(modules), Arc::new(MockMenuItemRepository::new()));
        assert!(matches!(service.create(input("Settings")).await, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_keeps_unspecified_fields() {
        let current = Module::new("Products".into(), None, None, 3, false).unwrap();
        let id = current.id;
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        modules.expect_find_by_name().returning(|_| Ok(None));
        modules.expect_update().returning(|m| Ok(m.clone()));

        let service = ModuleService::new(Arc::new(modules), Arc::new(MockMenuItemRepository::new()));
        let updated = service.update(&id, input("Catalogue")).await.unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.order, 3);
        assert!(!updated.is_active);
        assert_eq!(updated.name, "Catalogue");
    }

    #[tokio::test]
    async fn test_delete_blocked_while_menu_items_exist() {
        let current = Module::new("Products".into(), None, None, 3, true).unwrap();
        let id = current.id;
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        modules.expect_count_menu_items().returning(|_| Ok(2));
        modules.expect_delete().never();

        let service = ModuleService::new(Arc::new(modules), Arc::new(MockMenuItemRepository::new()));
        assert!(matches!(service.delete(&id).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_empty_module() {
        let current = Module::new("Products".into(), None, None, 3, true).unwrap();
        let id = current.id;
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        modules.expect_count_menu_items().returning(|_| Ok(0));
        modules.expect_delete().times(1).returning(|_| Ok(()));

        let service = ModuleService::new(Arc::new(modules), Arc::new(MockMenuItemRepository::new()));
        assert!(service.delete(&id).await.is_ok());
    }
}

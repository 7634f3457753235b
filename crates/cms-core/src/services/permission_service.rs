// ============================================================================
// CMS Core - Permission Service
// File: crates/cms-core/src/services/permission_service.rs
// ============================================================================
//! Permission store: CRUD with `(name, guard)` uniqueness and the
//! in-use deletion guard.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{group_by_prefix, Guard, Permission, PermissionDetail};
use crate::error::DomainError;
use crate::repositories::PermissionRepository;

pub struct PermissionService {
    permissions: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    pub fn new(permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { permissions }
    }

    pub async fn list(&self, search: Option<String>) -> Result<Vec<Permission>, DomainError> {
        self.permissions.list(search).await
    }

    pub async fn get(&self, id: &Uuid) -> Result<PermissionDetail, DomainError> {
        let permission = self.find(id).await?;
        let roles = self.permissions.role_names(id).await?;
        Ok(PermissionDetail { permission, roles })
    }

    pub async fn create(&self, name: String, guard: Guard) -> Result<Permission, DomainError> {
        let permission = Permission::new(name, guard)?;

        if self.permissions.find_by_name(&permission.name, guard).await?.is_some() {
            warn!("Permission already exists: {} ({})", permission.name, guard);
            return Err(DomainError::duplicate("name"));
        }

        let created = self.permissions.create(&permission).await?;
        info!("Permission created: {} ({})", created.name, created.guard);
        Ok(created)
    }

    /// Renames a permission; `guard` of `None` keeps the current guard.
    pub async fn update(&self, id: &Uuid, name: String, guard: Option<Guard>) -> Result<Permission, DomainError> {
        let mut permission = self.find(id).await?;
        let guard = guard.unwrap_or(permission.guard);
        permission.rename(name, guard)?;

        if let Some(existing) = self.permissions.find_by_name(&permission.name, guard).await? {
            if existing.id != permission.id {
                return Err(DomainError::duplicate("name"));
            }
        }

        self.permissions.update(&permission).await
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let permission = self.find(id).await?;

        if !self.permissions.role_names(id).await?.is_empty() {
            warn!("Refusing to delete permission {} still held by roles", permission.name);
            return Err(DomainError::Conflict(
                "Cannot delete permission because it is assigned to roles".to_string(),
            ));
        }

        let gated = self.permissions.menu_item_names(id).await?;
        if !gated.is_empty() {
            warn!(
                "Permission {} still gates menu items {:?}; their links go with it",
                permission.name, gated
            );
        }

        self.permissions.delete(id).await?;
        info!("Permission deleted: {} ({})", permission.name, permission.guard);
        Ok(())
    }

    pub async fn grouped(&self) -> Result<BTreeMap<String, Vec<Permission>>, DomainError> {
        Ok(group_by_prefix(self.permissions.list(None).await?))
    }

    async fn find(&self, id: &Uuid) -> Result<Permission, DomainError> {
        self.permissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Permission"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockPermissionRepository;

    fn permission(name: &str) -> Permission {
        Permission::new(name.to_string(), Guard::Web).unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_pair() {
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_name()
            .returning(|name, _| Ok(Some(Permission::new(name.to_string(), Guard::Web).unwrap())));
        repo.expect_create().never();

        let service = PermissionService::new(Arc::new(repo));
        let err = service.create("manage-products".into(), Guard::Web).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn test_same_name_on_other_guard_is_allowed() {
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_name()
            .withf(|_, guard| *guard == Guard::Api)
            .returning(|_, _| Ok(None));
        repo.expect_create().returning(|p| Ok(p.clone()));

        let service = PermissionService::new(Arc::new(repo));
        let created = service.create("manage-products".into(), Guard::Api).await.unwrap();
        assert_eq!(created.guard, Guard::Api);
    }

    #[tokio::test]
    async fn test_update_collision_with_other_permission() {
        let current = permission("manage-partners");
        let current_id = current.id;
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        repo.expect_find_by_name()
            .returning(|name, _| Ok(Some(Permission::new(name.to_string(), Guard::Web).unwrap())));
        repo.expect_update().never();

        let service = PermissionService::new(Arc::new(repo));
        let err = service.update(&current_id, "manage-products".into(), None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_succeeds() {
        let current = permission("manage-partners");
        let current_id = current.id;
        let same = current.clone();
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        repo.expect_find_by_name().returning(move |_, _| Ok(Some(same.clone())));
        repo.expect_update().returning(|p| Ok(p.clone()));

        let service = PermissionService::new(Arc::new(repo));
        let updated = service.update(&current_id, "manage-partners".into(), Some(Guard::Web)).await.unwrap();
        assert_eq!(updated.id, current_id);
    }

    #[tokio::test]
    async fn test_delete_blocked_while_role_holds_it() {
        let current = permission("manage-roles");
        let id = current.id;
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        repo.expect_role_names().returning(|_| Ok(vec!["admin".to_string()]));
        repo.expect_delete().never();

        let service = PermissionService::new(Arc::new(repo));
        assert!(matches!(service.delete(&id).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_unused_permission() {
        let current = permission("manage-roles");
        let id = current.id;
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        repo.expect_role_names().returning(|_| Ok(vec![]));
        repo.expect_menu_item_names().returning(|_| Ok(vec![]));
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let service = PermissionService::new(Arc::new(repo));
        assert!(service.delete(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_permission_still_gating_menu_items() {
        let current = permission("manage-settings");
        let id = current.id;
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        repo.expect_role_names().returning(|_| Ok(vec![]));
        repo.expect_menu_item_names()
            .times(1)
            .returning(|_| Ok(vec!["Settings".to_string()]));
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let service = PermissionService::new(Arc::new(repo));
        assert!(service.delete(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_permission_is_not_found() {
        let mut repo = MockPermissionRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = PermissionService::new(Arc::new(repo));
        assert!(matches!(service.get(&Uuid::new_v4()).await, Err(DomainError::NotFound(_))));
    }
}

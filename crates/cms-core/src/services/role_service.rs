// ============================================================================
// CMS Core - Role Service
// File: crates/cms-core/src/services/role_service.rs
// ============================================================================
//! Role store: roles are permission bundles scoped to a guard. Permission
//! sets are always written as a whole, inside one repository transaction.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Guard, Permission, Role, RoleWithPermissions};
use crate::error::DomainError;
use crate::repositories::{PermissionRepository, RoleRepository};

pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>, permissions: Arc<dyn PermissionRepository>) -> Self {
        Self { roles, permissions }
    }

    pub async fn list(&self, search: Option<String>) -> Result<Vec<RoleWithPermissions>, DomainError> {
        let roles = self.roles.list(search).await?;
        let mut result = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = self.roles.permissions_of(&role.id).await?;
            result.push(RoleWithPermissions { role, permissions });
        }
        Ok(result)
    }

    pub async fn get(&self, id: &Uuid) -> Result<RoleWithPermissions, DomainError> {
        let role = self.find(id).await?;
        let permissions = self.roles.permissions_of(id).await?;
        Ok(RoleWithPermissions { role, permissions })
    }

    pub async fn create(
        &self,
        name: String,
        guard: Guard,
        permission_ids: Vec<Uuid>,
    ) -> Result<RoleWithPermissions, DomainError> {
        let role = Role::new(name, guard)?;

        if self.roles.find_by_name(&role.name, guard).await?.is_some() {
            warn!("Role already exists: {} ({})", role.name, guard);
            return Err(DomainError::duplicate("name"));
        }

        let permissions = self.resolve_permissions(&permission_ids, guard).await?;
        let ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        let created = self.roles.create_with_permissions(&role, &ids).await?;

        info!("Role created: {} ({}) with {} permissions", created.name, created.guard, ids.len());
        Ok(RoleWithPermissions { role: created, permissions })
    }

    /// Renames the role; `Some(permission_ids)` replaces its permission set
    /// with exactly that set.
    pub async fn update(
        &self,
        id: &Uuid,
        name: String,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<RoleWithPermissions, DomainError> {
        let mut role = self.find(id).await?;
        role.rename(name)?;

        if let Some(existing) = self.roles.find_by_name(&role.name, role.guard).await? {
            if existing.id != role.id {
                return Err(DomainError::duplicate("name"));
            }
        }

        let replacement = match permission_ids {
            Some(ids) => {
                let permissions = self.resolve_permissions(&ids, role.guard).await?;
                Some(permissions.iter().map(|p| p.id).collect::<Vec<_>>())
            }
            None => None,
        };

        let updated = self.roles.update_with_permissions(&role, replacement).await?;
        let permissions = self.roles.permissions_of(id).await?;
        info!("Role updated: {} ({})", updated.name, updated.guard);
        Ok(RoleWithPermissions { role: updated, permissions })
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let role = self.find(id).await?;

        if self.roles.count_users(id).await? > 0 {
            warn!("Refusing to delete role {} still held by users", role.name);
            return Err(DomainError::Conflict(
                "Cannot delete role because it is assigned to users".to_string(),
            ));
        }

        self.roles.delete(id).await?;
        info!("Role deleted: {} ({})", role.name, role.guard);
        Ok(())
    }

    /// Loads every requested permission, rejecting unknown ids and
    /// permissions that belong to another guard.
    async fn resolve_permissions(&self, ids: &[Uuid], guard: Guard) -> Result<Vec<Permission>, DomainError> {
        let wanted: BTreeSet<Uuid> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: Vec<Uuid> = wanted.into_iter().collect();
        let found = self.permissions.find_by_ids(&wanted).await?;
        if found.len() != wanted.len() {
            return Err(DomainError::validation(
                "permission_ids",
                "The selected permission_ids is invalid.",
            ));
        }
        if let Some(foreign) = found.iter().find(|p| p.guard != guard) {
            return Err(DomainError::validation(
                "permission_ids",
                format!(
                    "The permission {} belongs to the {} guard, not {}.",
                    foreign.name, foreign.guard, guard
                ),
            ));
        }
        Ok(found)
    }

    async fn find(&self, id: &Uuid) -> Result<Role, DomainError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Role"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockPermissionRepository, MockRoleRepository};

    fn role(name: &str) -> Role {
        Role::new(name.to_string(), Guard::Web).unwrap()
    }

    fn permission(name: &str, guard: Guard) -> Permission {
        Permission::new(name.to_string(), guard).unwrap()
    }

    #[tokio::test]
    async fn test_create_attaches_all_permissions_at_once() {
        let perms = vec![permission("manage-products", Guard::Web), permission("view-dashboard", Guard::Web)];
        let ids: Vec<Uuid> = perms.iter().map(|p| p.id).collect();
        let expected = ids.clone();

        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_name().returning(|_, _| Ok(None));
        roles
            .expect_create_with_permissions()
            .withf(move |_, ids| {
                let mut got = ids.to_vec();
                got.sort();
                let mut want = expected.clone();
                want.sort();
                got == want
            })
            .times(1)
            .returning(|r, _| Ok(r.clone()));

        let mut permissions = MockPermissionRepository::new();
        permissions.expect_find_by_ids().returning(move |_| Ok(perms.clone()));

        let service = RoleService::new(Arc::new(roles), Arc::new(permissions));
        let created = service.create("editor".into(), Guard::Web, ids).await.unwrap();
        assert_eq!(created.permissions.len(), 2);
    }

    #[tokio::test]
    async fn test_create_with_unknown_permission_writes_nothing() {
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_name().returning(|_, _| Ok(None));
        roles.expect_create_with_permissions().never();

        let mut permissions = MockPermissionRepository::new();
        permissions.expect_find_by_ids().returning(|_| Ok(vec![]));

        let service = RoleService::new(Arc::new(roles), Arc::new(permissions));
        let err = service
            .create("editor".into(), Guard::Web, vec![Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "permission_ids"));
    }

    #[tokio::test]
    async fn test_create_rejects_permission_of_other_guard() {
        let api_permission = permission("manage-products", Guard::Api);
        let id = api_permission.id;

        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_name().returning(|_, _| Ok(None));
        roles.expect_create_with_permissions().never();

        let mut permissions = MockPermissionRepository::new();
        permissions.expect_find_by_ids().returning(move |_| Ok(vec![api_permission.clone()]));

        let service = RoleService::new(Arc::new(roles), Arc::new(permissions));
        assert!(service.create("editor".into(), Guard::Web, vec![id]).await.is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_permission_set() {
        let current = role("editor");
        let id = current.id;
        let only = permission("view-dashboard", Guard::Web);
        let only_id = only.id;
        let listed = only.clone();

        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        roles.expect_find_by_name().returning(|_, _| Ok(None));
        roles
            .expect_update_with_permissions()
            .withf(move |_, ids| ids.as_deref() == Some(&[only_id][..]))
            .times(1)
            .returning(|r, _| Ok(r.clone()));
        roles.expect_permissions_of().returning(move |_| Ok(vec![listed.clone()]));

        let mut permissions = MockPermissionRepository::new();
        permissions.expect_find_by_ids().returning(move |_| Ok(vec![only.clone()]));

        let service = RoleService::new(Arc::new(roles), Arc::new(permissions));
        let updated = service.update(&id, "editor".into(), Some(vec![only_id])).await.unwrap();
        assert_eq!(updated.permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_update_without_permission_ids_keeps_set() {
        let current = role("editor");
        let id = current.id;

        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        roles.expect_find_by_name().returning(|_, _| Ok(None));
        roles
            .expect_update_with_permissions()
            .withf(|_, ids| ids.is_none())
            .returning(|r, _| Ok(r.clone()));
        roles.expect_permissions_of().returning(|_| Ok(vec![]));

        let service = RoleService::new(Arc::new(roles), Arc::new(MockPermissionRepository::new()));
        let updated = service.update(&id, "publisher".into(), None).await.unwrap();
        assert_eq!(updated.role.name, "publisher");
    }

    #[tokio::test]
    async fn test_delete_blocked_while_users_hold_role() {
        let current = role("editor");
        let id = current.id;
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        roles.expect_count_users().returning(|_| Ok(1));
        roles.expect_delete().never();

        let service = RoleService::new(Arc::new(roles), Arc::new(MockPermissionRepository::new()));
        assert!(matches!(service.delete(&id).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_unheld_role() {
        let current = role("viewer");
        let id = current.id;
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        roles.expect_count_users().returning(|_| Ok(0));
        roles.expect_delete().times(1).returning(|_| Ok(()));

        let service = RoleService::new(Arc::new(roles), Arc::new(MockPermissionRepository::new()));
        assert!(service.delete(&id).await.is_ok());
    }
}

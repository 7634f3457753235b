// ============================================================================
// CMS Infrastructure - In-Memory Store
// File: crates/cms-infrastructure/src/memory.rs
// ============================================================================
//! One lock-guarded set of tables implementing every repository port, with
//! the same ordering, uniqueness and cascade rules as the PostgreSQL schema.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use cms_core::domain::{Guard, MenuItem, MenuItemFilter, MenuItemNode, Module, Permission, Role, User};
use cms_core::error::DomainError;
use cms_core::repositories::{
    MenuItemRepository, ModuleRepository, PermissionRepository, RoleRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    role_permissions: HashSet<(Uuid, Uuid)>,
    modules: Vec<Module>,
    menu_items: Vec<MenuItem>,
    menu_item_permissions: HashSet<(Uuid, Uuid)>,
    users: Vec<User>,
    user_roles: HashSet<(Uuid, Uuid)>,
}

impl Tables {
    fn permission_names(&self, ids: impl Iterator<Item = Uuid>) -> Vec<String> {
        let ids: HashSet<Uuid> = ids.collect();
        let names: BTreeSet<String> = self
            .permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| p.name.clone())
            .collect();
        names.into_iter().collect()
    }

    fn node(&self, item: &MenuItem) -> MenuItemNode {
        let linked = self
            .menu_item_permissions
            .iter()
            .filter(|(item_id, _)| *item_id == item.id)
            .map(|(_, permission_id)| *permission_id);
        MenuItemNode {
            item: item.clone(),
            permissions: self.permission_names(linked),
        }
    }

    fn sorted_items<'a>(&'a self, keep: impl Fn(&MenuItem) -> bool) -> Vec<&'a MenuItem> {
        let mut items: Vec<&MenuItem> = self.menu_items.iter().filter(|i| keep(i)).collect();
        items.sort_by_key(|i| i.order);
        items
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Permission>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.permissions.iter().find(|p| p.id == *id).cloned())
    }

    async fn find_by_name(&self, name: &str, guard: Guard) -> Result<Option<Permission>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.permissions.iter().find(|p| p.name == name && p.guard == guard).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Permission>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Permission> = t.permissions.iter().filter(|p| ids.contains(&p.id)).cloned().collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Permission>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Permission> = t
            .permissions
            .iter()
            .filter(|p| search.as_deref().map_or(true, |s| contains_ci(&p.name, s)))
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.name, a.guard.as_str()).cmp(&(&b.name, b.guard.as_str())));
        Ok(found)
    }

    async fn create(&self, permission: &Permission) -> Result<Permission, DomainError> {
        let mut t = self.tables.write().await;
        if t.permissions.iter().any(|p| p.name == permission.name && p.guard == permission.guard) {
            return Err(DomainError::duplicate("name"));
        }
        t.permissions.push(permission.clone());
        Ok(permission.clone())
    }

    async fn update(&self, permission: &Permission) -> Result<Permission, DomainError> {
        let mut t = self.tables.write().await;
        if t.permissions
            .iter()
            .any(|p| p.id != permission.id && p.name == permission.name && p.guard == permission.guard)
        {
            return Err(DomainError::duplicate("name"));
        }
        let stored = t
            .permissions
            .iter_mut()
            .find(|p| p.id == permission.id)
            .ok_or_else(|| DomainError::not_found("Permission"))?;
        stored.name = permission.name.clone();
        stored.guard = permission.guard;
        stored.timestamps.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        let before = t.permissions.len();
        t.permissions.retain(|p| p.id != *id);
        if t.permissions.len() == before {
            return Err(DomainError::not_found("Permission"));
        }
        t.role_permissions.retain(|(_, p)| p != id);
        t.menu_item_permissions.retain(|(_, p)| p != id);
        Ok(())
    }

    async fn role_names(&self, id: &Uuid) -> Result<Vec<String>, DomainError> {
        let t = self.tables.read().await;
        let mut names: Vec<String> = t
            .roles
            .iter()
            .filter(|r| t.role_permissions.contains(&(r.id, *id)))
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn menu_item_names(&self, id: &Uuid) -> Result<Vec<String>, DomainError> {
        let t = self.tables.read().await;
        let mut names: Vec<String> = t
            .menu_items
            .iter()
            .filter(|i| t.menu_item_permissions.contains(&(i.id, *id)))
            .map(|i| i.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.roles.iter().find(|r| r.id == *id).cloned())
    }

    async fn find_by_name(&self, name: &str, guard: Guard) -> Result<Option<Role>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.roles.iter().find(|r| r.name == name && r.guard == guard).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Role>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Role> = t.roles.iter().filter(|r| ids.contains(&r.id)).cloned().collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Role>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Role> = t
            .roles
            .iter()
            .filter(|r| search.as_deref().map_or(true, |s| contains_ci(&r.name, s)))
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.name, a.guard.as_str()).cmp(&(&b.name, b.guard.as_str())));
        Ok(found)
    }

    async fn permissions_of(&self, id: &Uuid) -> Result<Vec<Permission>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Permission> = t
            .permissions
            .iter()
            .filter(|p| t.role_permissions.contains(&(*id, p.id)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn create_with_permissions(&self, role: &Role, permission_ids: &[Uuid]) -> Result<Role, DomainError> {
        let mut t = self.tables.write().await;
        if t.roles.iter().any(|r| r.name == role.name && r.guard == role.guard) {
            return Err(DomainError::duplicate("name"));
        }
        if permission_ids.iter().any(|id| !t.permissions.iter().any(|p| p.id == *id)) {
            return Err(DomainError::validation("permission_ids", "The selected permission_ids is invalid."));
        }
        t.roles.push(role.clone());
        for permission_id in permission_ids {
            t.role_permissions.insert((role.id, *permission_id));
        }
        Ok(role.clone())
    }

    async fn update_with_permissions(
        &self,
        role: &Role,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<Role, DomainError> {
        let mut t = self.tables.write().await;
        if t.roles
            .iter()
            .any(|r| r.id != role.id && r.name == role.name && r.guard == role.guard)
        {
            return Err(DomainError::duplicate("name"));
        }
        if let Some(ids) = &permission_ids {
            if ids.iter().any(|id| !t.permissions.iter().any(|p| p.id == *id)) {
                return Err(DomainError::validation("permission_ids", "The selected permission_ids is invalid."));
            }
        }

        let stored = t
            .roles
            .iter_mut()
            .find(|r| r.id == role.id)
            .ok_or_else(|| DomainError::not_found("Role"))?;
        stored.name = role.name.clone();
        stored.timestamps.updated_at = Utc::now();
        let updated = stored.clone();

        if let Some(ids) = permission_ids {
            t.role_permissions.retain(|(r, _)| *r != role.id);
            for permission_id in ids {
                t.role_permissions.insert((role.id, permission_id));
            }
        }
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        let before = t.roles.len();
        t.roles.retain(|r| r.id != *id);
        if t.roles.len() == before {
            return Err(DomainError::not_found("Role"));
        }
        t.role_permissions.retain(|(r, _)| r != id);
        t.user_roles.retain(|(_, r)| r != id);
        Ok(())
    }

    async fn count_users(&self, id: &Uuid) -> Result<i64, DomainError> {
        let t = self.tables.read().await;
        Ok(t.user_roles.iter().filter(|(_, r)| r == id).count() as i64)
    }
}

#[async_trait]
impl ModuleRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Module>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.modules.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Module>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.modules.iter().find(|m| m.name == name).cloned())
    }

    async fn list(&self, search: Option<String>, is_active: Option<bool>) -> Result<Vec<Module>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Module> = t
            .modules
            .iter()
            .filter(|m| search.as_deref().map_or(true, |s| contains_ci(&m.name, s)))
            .filter(|m| is_active.map_or(true, |active| m.is_active == active))
            .cloned()
            .collect();
        found.sort_by_key(|m| m.order);
        Ok(found)
    }

    async fn create(&self, module: &Module) -> Result<Module, DomainError> {
        let mut t = self.tables.write().await;
        if t.modules.iter().any(|m| m.name == module.name) {
            return Err(DomainError::duplicate("name"));
        }
        t.modules.push(module.clone());
        Ok(module.clone())
    }

    async fn update(&self, module: &Module) -> Result<Module, DomainError> {
        let mut t = self.tables.write().await;
        if t.modules.iter().any(|m| m.id != module.id && m.name == module.name) {
            return Err(DomainError::duplicate("name"));
        }
        let stored = t
            .modules
            .iter_mut()
            .find(|m| m.id == module.id)
            .ok_or_else(|| DomainError::not_found("Module"))?;
        let created_at = stored.timestamps.created_at;
        *stored = module.clone();
        stored.timestamps.created_at = created_at;
        stored.timestamps.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        if t.menu_items.iter().any(|i| i.module_id == *id) {
            return Err(DomainError::Conflict(
                "Cannot complete deleting module: the record is still referenced".into(),
            ));
        }
        let before = t.modules.len();
        t.modules.retain(|m| m.id != *id);
        if t.modules.len() == before {
            return Err(DomainError::not_found("Module"));
        }
        Ok(())
    }

    async fn count_menu_items(&self, id: &Uuid) -> Result<i64, DomainError> {
        let t = self.tables.read().await;
        Ok(t.menu_items.iter().filter(|i| i.module_id == *id).count() as i64)
    }
}

#[async_trait]
impl MenuItemRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.menu_items.iter().find(|i| i.id == *id).cloned())
    }

    async fn list(&self, filter: &MenuItemFilter) -> Result<Vec<MenuItem>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.sorted_items(|i| filter.matches(i)).into_iter().cloned().collect())
    }

    async fn children_of(&self, id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.sorted_items(|i| i.parent_id == Some(*id)).into_iter().cloned().collect())
    }

    async fn permissions_of(&self, id: &Uuid) -> Result<Vec<Permission>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Permission> = t
            .permissions
            .iter()
            .filter(|p| t.menu_item_permissions.contains(&(*id, p.id)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn create_with_permissions(&self, item: &MenuItem, permission_ids: &[Uuid]) -> Result<MenuItem, DomainError> {
        let mut t = self.tables.write().await;
        if !t.modules.iter().any(|m| m.id == item.module_id) {
            return Err(DomainError::NotFound("Module not found".into()));
        }
        if let Some(parent_id) = item.parent_id {
            if !t.menu_items.iter().any(|i| i.id == parent_id) {
                return Err(DomainError::NotFound("Parent menu item not found".into()));
            }
        }
        t.menu_items.push(item.clone());
        for permission_id in permission_ids {
            t.menu_item_permissions.insert((item.id, *permission_id));
        }
        Ok(item.clone())
    }

    async fn update_with_permissions(
        &self,
        item: &MenuItem,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<MenuItem, DomainError> {
        let mut t = self.tables.write().await;
        let stored = t
            .menu_items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| DomainError::not_found("Menu item"))?;
        let created_at = stored.timestamps.created_at;
        *stored = item.clone();
        stored.timestamps.created_at = created_at;
        stored.timestamps.updated_at = Utc::now();
        let updated = stored.clone();

        if let Some(ids) = permission_ids {
            t.menu_item_permissions.retain(|(i, _)| *i != item.id);
            for permission_id in ids {
                t.menu_item_permissions.insert((item.id, permission_id));
            }
        }
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        if !t.menu_items.iter().any(|i| i.id == *id) {
            return Err(DomainError::not_found("Menu item"));
        }

        let mut doomed: HashSet<Uuid> = HashSet::from([*id]);
        let mut frontier = vec![*id];
        while let Some(parent) = frontier.pop() {
            for child in t.menu_items.iter().filter(|i| i.parent_id == Some(parent)) {
                if doomed.insert(child.id) {
                    frontier.push(child.id);
                }
            }
        }

        t.menu_items.retain(|i| !doomed.contains(&i.id));
        t.menu_item_permissions.retain(|(i, _)| !doomed.contains(i));
        Ok(())
    }

    async fn active_nodes(&self) -> Result<Vec<MenuItemNode>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.sorted_items(|i| i.is_active).into_iter().map(|i| t.node(i)).collect())
    }

    async fn nodes_matching_path(&self, path: &str) -> Result<Vec<MenuItemNode>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.sorted_items(|i| {
            i.url
                .as_deref()
                .is_some_and(|url| cms_core::services::path_guard::governs(url, path))
        })
        .into_iter()
        .map(|i| t.node(i))
        .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<User>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<User> = t
            .users
            .iter()
            .filter(|u| {
                search
                    .as_deref()
                    .map_or(true, |s| contains_ci(&u.name, s) || contains_ci(&u.email, s))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.name, &a.email).cmp(&(&b.name, &b.email)));
        Ok(found)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DomainError::duplicate("email"));
        }
        t.users.push(user.clone());
        Ok(user.clone())
    }

    async fn roles_of(&self, id: &Uuid) -> Result<Vec<Role>, DomainError> {
        let t = self.tables.read().await;
        let mut found: Vec<Role> = t
            .roles
            .iter()
            .filter(|r| t.user_roles.contains(&(*id, r.id)))
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.name, a.guard.as_str()).cmp(&(&b.name, b.guard.as_str())));
        Ok(found)
    }

    async fn role_names(&self, id: &Uuid, guard: Guard) -> Result<Vec<String>, DomainError> {
        let t = self.tables.read().await;
        let mut names: Vec<String> = t
            .roles
            .iter()
            .filter(|r| r.guard == guard && t.user_roles.contains(&(*id, r.id)))
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn permission_names(&self, id: &Uuid, guard: Guard) -> Result<Vec<String>, DomainError> {
        let t = self.tables.read().await;
        let held: HashSet<Uuid> = t
            .roles
            .iter()
            .filter(|r| r.guard == guard && t.user_roles.contains(&(*id, r.id)))
            .map(|r| r.id)
            .collect();
        let granted = t
            .role_permissions
            .iter()
            .filter(|(role_id, _)| held.contains(role_id))
            .map(|(_, permission_id)| *permission_id);
        Ok(t.permission_names(granted))
    }

    async fn sync_roles(&self, id: &Uuid, role_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        if role_ids.iter().any(|rid| !t.roles.iter().any(|r| r.id == *rid)) {
            return Err(DomainError::validation("role_ids", "The selected role_ids is invalid."));
        }
        t.user_roles.retain(|(u, _)| u != id);
        for role_id in role_ids {
            t.user_roles.insert((*id, *role_id));
        }
        Ok(())
    }

    async fn assign_role(&self, id: &Uuid, role_id: &Uuid) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        t.user_roles.insert((*id, *role_id));
        Ok(())
    }

    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or_else(|| DomainError::not_found("User"))?;
        user.password_hash = password_hash.to_string();
        user.timestamps.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cms_core::services::{AdminAccount, MenuComposer, PathGuard, RbacSeeder};
    use cms_core::domain::Principal;

    fn seeder(store: &Arc<InMemoryStore>) -> RbacSeeder {
        RbacSeeder::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            "admin".into(),
        )
    }

    fn admin_account() -> AdminAccount {
        AdminAccount {
            name: "Administrator".into(),
            email: "admin@example.com".into(),
            password: Some("password123".into()),
        }
    }

    async fn principal_for(store: &InMemoryStore, role: &str) -> Principal {
        let role = RoleRepository::find_by_name(store, role, Guard::Api).await.unwrap().unwrap();
        let user = User::new(format!("{} user", role.name), format!("{}@example.com", role.name), "hash".into()).unwrap();
        UserRepository::create(store, &user).await.unwrap();
        store.sync_roles(&user.id, &[role.id]).await.unwrap();
        Principal {
            user_id: user.id,
            name: user.name,
            email: user.email,
            guard: Guard::Api,
            roles: UserRepository::role_names(store, &user.id, Guard::Api).await.unwrap().into_iter().collect(),
            permissions: store.permission_names(&user.id, Guard::Api).await.unwrap().into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_seeding_twice_creates_nothing_new() {
        let store = Arc::new(InMemoryStore::new());
        let first = seeder(&store).run(Some(&admin_account())).await.unwrap();
        assert_eq!(first.modules_created, 5);
        assert_eq!(first.permissions_created, 22);
        assert_eq!(first.roles_created, 6);
        assert_eq!(first.menu_items_created, 16);
        assert!(first.admin_created);

        let second = seeder(&store).run(Some(&admin_account())).await.unwrap();
        assert_eq!(second.modules_created, 0);
        assert_eq!(second.permissions_created, 0);
        assert_eq!(second.roles_created, 0);
        assert_eq!(second.menu_items_created, 0);
        assert!(!second.admin_created);
        assert!(second.admin_assigned);

        let admin = store.find_by_email("admin@example.com").await.unwrap().unwrap();
        let web_roles = UserRepository::role_names(store.as_ref(), &admin.id, Guard::Web).await.unwrap();
        assert_eq!(web_roles, vec!["admin".to_string()]);
        assert_eq!(store.permission_names(&admin.id, Guard::Api).await.unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_seeded_editor_menu_hides_user_management() {
        let store = Arc::new(InMemoryStore::new());
        seeder(&store).run(None).await.unwrap();
        let editor = principal_for(&store, "editor").await;

        let composer = MenuComposer::new(store.clone(), store.clone());
        let menu = composer.compose(&editor).await.unwrap();
        let names: Vec<&str> = menu.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Dashboard", "Content Management", "Products"]);

        let content = &menu[1].menu_items[0];
        assert_eq!(content.name, "Content");
        assert_eq!(content.children.len(), 5);
    }

    #[tokio::test]
    async fn test_seeded_viewer_keeps_only_reachable_items() {
        let store = Arc::new(InMemoryStore::new());
        seeder(&store).run(None).await.unwrap();
        let viewer = principal_for(&store, "viewer").await;

        let menu = MenuComposer::new(store.clone(), store.clone()).compose(&viewer).await.unwrap();
        let names: Vec<&str> = menu.iter().map(|m| m.name.as_str()).collect();
        // "Content" needs manage-content, so its form submissions child is unreachable.
        assert_eq!(names, vec!["Dashboard"]);
    }

    #[tokio::test]
    async fn test_seeded_path_guard_decisions() {
        let store = Arc::new(InMemoryStore::new());
        seeder(&store).run(None).await.unwrap();
        let guard = PathGuard::new(store.clone(), "admin".into(), "api".into());
        let editor = principal_for(&store, "editor").await;
        let admin = principal_for(&store, "admin").await;

        assert!(matches!(
            guard.authorize(Some(&editor), "/api/admin/users").await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(guard.authorize(Some(&admin), "/api/admin/users").await.is_ok());
        assert!(guard.authorize(Some(&admin), "/api/admin/permissions/grouped").await.is_ok());
        assert!(guard.authorize(Some(&editor), "/api/admin/products/42").await.is_ok());
        assert!(matches!(
            guard.authorize(Some(&editor), "/api/admin/unmapped").await,
            Err(DomainError::NotFound(_))
        ));
        assert!(guard.authorize(Some(&admin), "/api/admin/unmapped").await.is_ok());
    }

    #[tokio::test]
    async fn test_root_link_does_not_govern_unmapped_paths() {
        let store = Arc::new(InMemoryStore::new());
        seeder(&store).run(None).await.unwrap();
        let dashboard = ModuleRepository::find_by_name(store.as_ref(), "Dashboard").await.unwrap().unwrap();
        let home = MenuItem::new(dashboard.id, None, "View site".into(), Some("/".into()), None, 9, true).unwrap();
        MenuItemRepository::create_with_permissions(store.as_ref(), &home, &[]).await.unwrap();

        let guard = PathGuard::new(store.clone(), "admin".into(), "api".into());
        let editor = principal_for(&store, "editor").await;
        let admin = principal_for(&store, "admin").await;
        assert!(matches!(
            guard.authorize(Some(&editor), "/api/admin/unmapped").await,
            Err(DomainError::NotFound(_))
        ));
        assert!(guard.authorize(Some(&admin), "/api/admin/unmapped").await.is_ok());
    }

    #[tokio::test]
    async fn test_permission_lists_gated_menu_items() {
        let store = Arc::new(InMemoryStore::new());
        seeder(&store).run(None).await.unwrap();
        let settings = PermissionRepository::find_by_name(store.as_ref(), "manage-settings", Guard::Web)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.menu_item_names(&settings.id).await.unwrap(), vec!["Settings".to_string()]);
    }

    #[tokio::test]
    async fn test_deleting_menu_item_removes_subtree() {
        let store = Arc::new(InMemoryStore::new());
        let module = Module::new("Content".into(), None, None, 1, true).unwrap();
        ModuleRepository::create(store.as_ref(), &module).await.unwrap();
        let root = MenuItem::new(module.id, None, "Root".into(), None, None, 1, true).unwrap();
        let child = MenuItem::new(module.id, Some(root.id), "Child".into(), None, None, 1, true).unwrap();
        let leaf = MenuItem::new(module.id, Some(child.id), "Leaf".into(), Some("/leaf".into()), None, 1, true).unwrap();
        for item in [&root, &child, &leaf] {
            MenuItemRepository::create_with_permissions(store.as_ref(), item, &[]).await.unwrap();
        }

        assert!(matches!(
            ModuleRepository::delete(store.as_ref(), &module.id).await,
            Err(DomainError::Conflict(_))
        ));
        MenuItemRepository::delete(store.as_ref(), &root.id).await.unwrap();
        assert!(store.active_nodes().await.unwrap().is_empty());
        ModuleRepository::delete(store.as_ref(), &module.id).await.unwrap();
    }
}

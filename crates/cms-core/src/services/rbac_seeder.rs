// ============================================================================
// CMS Core - RBAC Installer
// File: crates/cms-core/src/services/rbac_seeder.rs
// ============================================================================
//! Seeds the default modules, permissions, roles and admin menu. Existing
//! rows are looked up by their natural key and reused, so running the
//! installer twice leaves the data unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use cms_security::PasswordService;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Guard, MenuItem, MenuItemFilter, Module, Permission, Role, User};
use crate::error::DomainError;
use crate::repositories::{
    MenuItemRepository, ModuleRepository, PermissionRepository, RoleRepository, UserRepository,
};

struct SeedModule {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    order: i32,
}

struct SeedRole {
    name: &'static str,
    /// `None` grants every seeded permission.
    permissions: Option<&'static [&'static str]>,
}

struct SeedMenuItem {
    module: &'static str,
    parent_url: Option<&'static str>,
    name: &'static str,
    url: &'static str,
    icon: &'static str,
    order: i32,
    permission: &'static str,
}

const MODULES: &[SeedModule] = &[
    SeedModule { name: "Dashboard", description: "Dashboard and analytics", icon: "dashboard", order: 1 },
    SeedModule { name: "Content Management", description: "Manage website content", icon: "content_paste", order: 2 },
    SeedModule { name: "Products", description: "Manage products and categories", icon: "inventory_2", order: 3 },
    SeedModule { name: "User Management", description: "Manage users and roles", icon: "people", order: 4 },
    SeedModule { name: "Settings", description: "System settings and configuration", icon: "settings", order: 5 },
];

pub const PERMISSIONS: &[&str] = &[
    "view-dashboard",
    "manage-content",
    "manage-company-info",
    "manage-press-releases",
    "manage-partners",
    "view-form-submissions",
    "manage-products",
    "manage-users",
    "manage-roles",
    "manage-modules",
    "manage-settings",
];

const EDITOR_PERMISSIONS: &[&str] = &[
    "view-dashboard",
    "manage-content",
    "manage-company-info",
    "manage-press-releases",
    "manage-partners",
    "view-form-submissions",
    "manage-products",
];

const VIEWER_PERMISSIONS: &[&str] = &["view-dashboard", "view-form-submissions"];

const ROLES: &[SeedRole] = &[
    SeedRole { name: "admin", permissions: None },
    SeedRole { name: "editor", permissions: Some(EDITOR_PERMISSIONS) },
    SeedRole { name: "viewer", permissions: Some(VIEWER_PERMISSIONS) },
];

// Parents come before their children.
const MENU_ITEMS: &[SeedMenuItem] = &[
    SeedMenuItem { module: "Dashboard", parent_url: None, name: "Dashboard", url: "/admin/dashboard", icon: "dashboard", order: 1, permission: "view-dashboard" },
    SeedMenuItem { module: "Content Management", parent_url: None, name: "Content", url: "/admin/content", icon: "content_paste", order: 1, permission: "manage-content" },
    SeedMenuItem { module: "Content Management", parent_url: Some("/admin/content"), name: "Company Info", url: "/admin/company-info", icon: "business", order: 2, permission: "manage-company-info" },
    SeedMenuItem { module: "Content Management", parent_url: Some("/admin/content"), name: "Hero Slides", url: "/admin/hero-slides", icon: "slideshow", order: 3, permission: "manage-content" },
    SeedMenuItem { module: "Content Management", parent_url: Some("/admin/content"), name: "Press Releases", url: "/admin/press-releases", icon: "article", order: 4, permission: "manage-press-releases" },
    SeedMenuItem { module: "Content Management", parent_url: Some("/admin/content"), name: "Partners", url: "/admin/partners", icon: "handshake", order: 5, permission: "manage-partners" },
    SeedMenuItem { module: "Content Management", parent_url: Some("/admin/content"), name: "Form Submissions", url: "/admin/form-submissions", icon: "contact_mail", order: 6, permission: "view-form-submissions" },
    SeedMenuItem { module: "Products", parent_url: None, name: "Products", url: "/admin/products", icon: "inventory_2", order: 1, permission: "manage-products" },
    SeedMenuItem { module: "Products", parent_url: Some("/admin/products"), name: "Product Categories", url: "/admin/product-categories", icon: "category", order: 2, permission: "manage-products" },
    SeedMenuItem { module: "User Management", parent_url: None, name: "User Management", url: "/admin/users", icon: "people", order: 1, permission: "manage-users" },
    SeedMenuItem { module: "User Management", parent_url: Some("/admin/users"), name: "Users", url: "/admin/users", icon: "person", order: 1, permission: "manage-users" },
    SeedMenuItem { module: "User Management", parent_url: Some("/admin/users"), name: "Roles", url: "/admin/roles", icon: "admin_panel_settings", order: 2, permission: "manage-roles" },
    SeedMenuItem { module: "User Management", parent_url: Some("/admin/users"), name: "Permissions", url: "/admin/permissions", icon: "security", order: 3, permission: "manage-roles" },
    SeedMenuItem { module: "User Management", parent_url: Some("/admin/users"), name: "Modules", url: "/admin/modules", icon: "view_module", order: 4, permission: "manage-modules" },
    SeedMenuItem { module: "User Management", parent_url: Some("/admin/users"), name: "Menu Items", url: "/admin/menu-items", icon: "menu", order: 5, permission: "manage-modules" },
    SeedMenuItem { module: "Settings", parent_url: None, name: "Settings", url: "/admin/settings", icon: "settings", order: 1, permission: "manage-settings" },
];

/// Initial administrator account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    /// Required only when the account does not exist yet.
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub modules_created: usize,
    pub permissions_created: usize,
    pub roles_created: usize,
    pub menu_items_created: usize,
    pub admin_created: bool,
    pub admin_assigned: bool,
}

pub struct RbacSeeder {
    permissions: Arc<dyn PermissionRepository>,
    roles: Arc<dyn RoleRepository>,
    modules: Arc<dyn ModuleRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
    users: Arc<dyn UserRepository>,
    super_role: String,
}

impl RbacSeeder {
    pub fn new(
        permissions: Arc<dyn PermissionRepository>,
        roles: Arc<dyn RoleRepository>,
        modules: Arc<dyn ModuleRepository>,
        menu_items: Arc<dyn MenuItemRepository>,
        users: Arc<dyn UserRepository>,
        super_role: String,
    ) -> Self {
        Self {
            permissions,
            roles,
            modules,
            menu_items,
            users,
            super_role,
        }
    }

    pub async fn run(&self, admin: Option<&AdminAccount>) -> Result<SeedReport, DomainError> {
        let mut report = SeedReport::default();

        let modules = self.seed_modules(&mut report).await?;
        let permissions = self.seed_permissions(&mut report).await?;
        self.seed_roles(&permissions, &mut report).await?;
        self.seed_menu_items(&modules, &permissions, &mut report).await?;
        if let Some(admin) = admin {
            self.seed_admin(admin, &mut report).await?;
        }

        info!(
            "RBAC seed finished: {} modules, {} permissions, {} roles, {} menu items created",
            report.modules_created, report.permissions_created, report.roles_created, report.menu_items_created
        );
        Ok(report)
    }

    async fn seed_modules(&self, report: &mut SeedReport) -> Result<HashMap<&'static str, Uuid>, DomainError> {
        let mut ids = HashMap::new();
        for seed in MODULES {
            let module = match self.modules.find_by_name(seed.name).await? {
                Some(existing) => existing,
                None => {
                    let module = Module::new(
                        seed.name.to_string(),
                        Some(seed.description.to_string()),
                        Some(seed.icon.to_string()),
                        seed.order,
                        true,
                    )?;
                    report.modules_created += 1;
                    self.modules.create(&module).await?
                }
            };
            ids.insert(seed.name, module.id);
        }
        Ok(ids)
    }

    async fn seed_permissions(
        &self,
        report: &mut SeedReport,
    ) -> Result<HashMap<(Guard, &'static str), Uuid>, DomainError> {
        let mut ids = HashMap::new();
        for guard in Guard::ALL {
            for name in PERMISSIONS {
                let permission = match self.permissions.find_by_name(name, guard).await? {
                    Some(existing) => existing,
                    None => {
                        report.permissions_created += 1;
                        self.permissions.create(&Permission::new(name.to_string(), guard)?).await?
                    }
                };
                ids.insert((guard, *name), permission.id);
            }
        }
        Ok(ids)
    }

    async fn seed_roles(
        &self,
        permissions: &HashMap<(Guard, &'static str), Uuid>,
        report: &mut SeedReport,
    ) -> Result<(), DomainError> {
        for guard in Guard::ALL {
            for seed in ROLES {
                let names = seed.permissions.unwrap_or(PERMISSIONS);
                let permission_ids = lookup(permissions, guard, names)?;

                match self.roles.find_by_name(seed.name, guard).await? {
                    Some(existing) => {
                        self.roles.update_with_permissions(&existing, Some(permission_ids)).await?;
                    }
                    None => {
                        let role = Role::new(seed.name.to_string(), guard)?;
                        self.roles.create_with_permissions(&role, &permission_ids).await?;
                        report.roles_created += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Menu items link the web-guard permission; visibility compares names.
    async fn seed_menu_items(
        &self,
        modules: &HashMap<&'static str, Uuid>,
        permissions: &HashMap<(Guard, &'static str), Uuid>,
        report: &mut SeedReport,
    ) -> Result<(), DomainError> {
        let mut created: HashMap<(Uuid, &'static str), Uuid> = HashMap::new();

        for seed in MENU_ITEMS {
            let module_id = *modules
                .get(seed.module)
                .ok_or_else(|| DomainError::InternalError(format!("Unseeded module {}", seed.module)))?;
            let parent_id = match seed.parent_url {
                Some(url) => Some(*created.get(&(module_id, url)).ok_or_else(|| {
                    DomainError::InternalError(format!("Parent {} seeded after {}", url, seed.url))
                })?),
                None => None,
            };
            let permission_ids = lookup(permissions, Guard::Web, &[seed.permission])?;

            let filter = MenuItemFilter {
                module_id: Some(module_id),
                parent_id,
                top_level: parent_id.is_none(),
                ..Default::default()
            };
            let existing = self
                .menu_items
                .list(&filter)
                .await?
                .into_iter()
                .find(|item| item.url.as_deref() == Some(seed.url));

            let item = match existing {
                Some(item) => {
                    self.menu_items.update_with_permissions(&item, Some(permission_ids)).await?
                }
                None => {
                    let item = MenuItem::new(
                        module_id,
                        parent_id,
                        seed.name.to_string(),
                        Some(seed.url.to_string()),
                        Some(seed.icon.to_string()),
                        seed.order,
                        true,
                    )?;
                    report.menu_items_created += 1;
                    self.menu_items.create_with_permissions(&item, &permission_ids).await?
                }
            };

            // Top-level items are the only parents in the seed set.
            if parent_id.is_none() {
                created.insert((module_id, seed.url), item.id);
            }
        }
        Ok(())
    }

    async fn seed_admin(&self, admin: &AdminAccount, report: &mut SeedReport) -> Result<(), DomainError> {
        let email = admin.email.trim().to_lowercase();
        let user = match self.users.find_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                let Some(password) = admin.password.as_deref() else {
                    warn!("Admin {} does not exist and no password is configured, skipping", email);
                    return Ok(());
                };
                let hash = PasswordService::hash(password)
                    .map_err(|e| DomainError::validation("password", e.to_string()))?;
                report.admin_created = true;
                self.users.create(&User::new(admin.name.clone(), email, hash)?).await?
            }
        };

        for guard in Guard::ALL {
            let role = self
                .roles
                .find_by_name(&self.super_role, guard)
                .await?
                .ok_or_else(|| DomainError::InternalError(format!("Role {} ({}) missing", self.super_role, guard)))?;
            self.users.assign_role(&user.id, &role.id).await?;
        }
        report.admin_assigned = true;
        info!("Role {} assigned to {}", self.super_role, user.email);
        Ok(())
    }
}

fn lookup(
    permissions: &HashMap<(Guard, &'static str), Uuid>,
    guard: Guard,
    names: &[&'static str],
) -> Result<Vec<Uuid>, DomainError> {
    names
        .iter()
        .map(|name| {
            permissions
                .get(&(guard, *name))
                .copied()
                .ok_or_else(|| DomainError::InternalError(format!("Unseeded permission {}", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_and_menu_permissions_are_seeded() {
        for role in ROLES {
            for name in role.permissions.unwrap_or(PERMISSIONS) {
                assert!(PERMISSIONS.contains(name), "{} grants unknown {}", role.name, name);
            }
        }
        for item in MENU_ITEMS {
            assert!(PERMISSIONS.contains(&item.permission), "{} needs unknown {}", item.name, item.permission);
            assert!(MODULES.iter().any(|m| m.name == item.module));
        }
    }

    #[test]
    fn test_menu_parents_precede_children() {
        for (index, item) in MENU_ITEMS.iter().enumerate() {
            if let Some(parent) = item.parent_url {
                assert!(MENU_ITEMS[..index]
                    .iter()
                    .any(|p| p.parent_url.is_none() && p.module == item.module && p.url == parent));
            }
        }
    }
}

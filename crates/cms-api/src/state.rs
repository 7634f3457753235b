use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sqlx::PgPool;

use cms_core::domain::Guard;
use cms_core::repositories::{
    MenuItemRepository, ModuleRepository, PermissionRepository, RoleRepository, UserRepository,
};
use cms_core::services::{
    AuthService, MenuComposer, MenuItemService, ModuleService, PathGuard, PermissionService, RbacSeeder,
    RoleService, UserService,
};
use cms_infrastructure::{
    InMemoryStore, PgMenuItemRepository, PgModuleRepository, PgPermissionRepository, PgRoleRepository,
    PgUserRepository,
};
use cms_security::JwtService;
use cms_shared::config::AppConfig;
use cms_shared::AppError;

/// Login attempts per normalized email.
pub type LoginLimiter = DefaultKeyedRateLimiter<String>;

/// The persistence ports every service is built from.
#[derive(Clone)]
pub struct Repositories {
    pub permissions: Arc<dyn PermissionRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub modules: Arc<dyn ModuleRepository>,
    pub menu_items: Arc<dyn MenuItemRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            permissions: Arc::new(PgPermissionRepository::new(pool.clone())),
            roles: Arc::new(PgRoleRepository::new(pool.clone())),
            modules: Arc::new(PgModuleRepository::new(pool.clone())),
            menu_items: Arc::new(PgMenuItemRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            permissions: store.clone(),
            roles: store.clone(),
            modules: store.clone(),
            menu_items: store.clone(),
            users: store,
        }
    }

    pub fn seeder(&self, super_role: &str) -> RbacSeeder {
        RbacSeeder::new(
            self.permissions.clone(),
            self.roles.clone(),
            self.modules.clone(),
            self.menu_items.clone(),
            self.users.clone(),
            super_role.to_string(),
        )
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Absent when running on the in-memory store.
    pub db: Option<PgPool>,
    pub auth: Arc<AuthService>,
    pub path_guard: Arc<PathGuard>,
    pub menu: Arc<MenuComposer>,
    pub permissions: Arc<PermissionService>,
    pub roles: Arc<RoleService>,
    pub modules: Arc<ModuleService>,
    pub menu_items: Arc<MenuItemService>,
    pub users: Arc<UserService>,
    pub login_limiter: Arc<LoginLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories, db: Option<PgPool>) -> Result<Self, AppError> {
        let guard = Guard::from_str(&config.rbac.auth_guard)
            .ok_or_else(|| AppError::InternalError(format!("Unknown auth guard: {}", config.rbac.auth_guard)))?;

        let jwt = JwtService::new(config.jwt.secret.clone(), config.jwt.access_token_expiry);
        let per_minute = NonZeroU32::new(config.rate_limit.login_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            db,
            auth: Arc::new(AuthService::new(repos.users.clone(), jwt, guard)),
            path_guard: Arc::new(PathGuard::new(
                repos.menu_items.clone(),
                config.rbac.super_role.clone(),
                config.rbac.api_prefix.clone(),
            )),
            menu: Arc::new(MenuComposer::new(repos.modules.clone(), repos.menu_items.clone())),
            permissions: Arc::new(PermissionService::new(repos.permissions.clone())),
            roles: Arc::new(RoleService::new(repos.roles.clone(), repos.permissions.clone())),
            modules: Arc::new(ModuleService::new(repos.modules.clone(), repos.menu_items.clone())),
            menu_items: Arc::new(MenuItemService::new(
                repos.menu_items.clone(),
                repos.modules.clone(),
                repos.permissions.clone(),
            )),
            users: Arc::new(UserService::new(repos.users.clone(), repos.roles.clone())),
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            config: Arc::new(config),
        })
    }
}

//! Domain services

pub mod access;
pub mod auth_service;
pub mod menu_composer;
pub mod menu_item_service;
pub mod module_service;
pub mod path_guard;
pub mod permission_service;
pub mod rbac_seeder;
pub mod role_service;
pub mod user_service;

pub use access::AccessRequirement;
pub use auth_service::{AuthService, LoginResult};
pub use menu_composer::{ComposedMenuItem, ComposedModule, MenuComposer, MenuTree};
pub use menu_item_service::{MenuItemInput, MenuItemService};
pub use module_service::{ModuleInput, ModuleService};
pub use path_guard::PathGuard;
pub use permission_service::PermissionService;
pub use rbac_seeder::{AdminAccount, RbacSeeder, SeedReport};
pub use role_service::RoleService;
pub use user_service::UserService;

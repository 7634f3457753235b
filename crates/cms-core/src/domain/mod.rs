//! # CMS Core - Domain Module
//!
//! Domain entities for the RBAC and menu subsystem.

pub mod guard;
pub mod permission;
pub mod role;
pub mod module;
pub mod menu_item;
pub mod user;

// Re-export all entities and enums
pub use guard::Guard;
pub use permission::{group_by_prefix, Permission, PermissionDetail};
pub use role::{Role, RoleWithPermissions};
pub use module::{Module, ModuleWithMenuItems};
pub use menu_item::{MenuItem, MenuItemDetail, MenuItemFilter, MenuItemNode};
pub use user::{Principal, User, UserWithRoles};

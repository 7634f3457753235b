//! Repository traits (ports)

pub mod permission_repository;
pub mod role_repository;
pub mod module_repository;
pub mod menu_item_repository;
pub mod user_repository;

pub use permission_repository::PermissionRepository;
pub use role_repository::RoleRepository;
pub use module_repository::ModuleRepository;
pub use menu_item_repository::MenuItemRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use permission_repository::MockPermissionRepository;
#[cfg(test)]
pub use role_repository::MockRoleRepository;
#[cfg(test)]
pub use module_repository::MockModuleRepository;
#[cfg(test)]
pub use menu_item_repository::MockMenuItemRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

//! Request payloads and query strings.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use cms_core::domain::Guard;
use cms_core::services::{MenuItemInput, ModuleInput};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters."))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModuleQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PermissionRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    pub guard_name: Option<Guard>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoleRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    /// Only honoured on create; a role never changes guard.
    pub guard_name: Option<Guard>,

    pub permission_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ModuleRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[validate(length(max = 500, message = "The description may not be greater than 500 characters."))]
    pub description: Option<String>,

    #[validate(length(max = 50, message = "The icon may not be greater than 50 characters."))]
    pub icon: Option<String>,

    #[validate(range(min = 0, message = "The order must be at least 0."))]
    pub order: Option<i32>,

    pub is_active: Option<bool>,
}

impl From<ModuleRequest> for ModuleInput {
    fn from(req: ModuleRequest) -> Self {
        ModuleInput {
            name: req.name,
            description: req.description,
            icon: req.icon,
            order: req.order,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MenuItemRequest {
    pub module_id: Uuid,

    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[validate(length(max = 255, message = "The url may not be greater than 255 characters."))]
    pub url: Option<String>,

    #[validate(length(max = 50, message = "The icon may not be greater than 50 characters."))]
    pub icon: Option<String>,

    #[validate(range(min = 0, message = "The order must be at least 0."))]
    pub order: Option<i32>,

    pub is_active: Option<bool>,

    pub permission_ids: Option<Vec<Uuid>>,
}

impl From<MenuItemRequest> for MenuItemInput {
    fn from(req: MenuItemRequest) -> Self {
        MenuItemInput {
            module_id: req.module_id,
            parent_id: req.parent_id,
            name: req.name,
            url: req.url,
            icon: req.icon,
            order: req.order,
            is_active: req.is_active,
            permission_ids: req.permission_ids,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SyncRolesRequest {
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,

    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "The current password field is required."))]
    pub current_password: String,

    #[validate(
        length(min = 8, message = "The new password must be at least 8 characters."),
        must_match(other = "new_password_confirmation", message = "The new password confirmation does not match.")
    )]
    pub new_password: String,

    pub new_password_confirmation: String,
}

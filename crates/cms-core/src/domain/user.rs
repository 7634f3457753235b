// ============================================================================
// CMS Core - User Entity and Principal
// File: crates/cms-core/src/domain/user.rs
// Description: Admin console account and the resolved request caller
// ============================================================================

use std::collections::BTreeSet;

use cms_shared::{new_id, EntityId, Timestamps};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Guard, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: EntityId,

    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_active: bool,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Result<Self, validator::ValidationErrors> {
        let user = Self {
            id: new_id(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            is_active: true,
            timestamps: Timestamps::now(),
        };

        user.validate()?;
        Ok(user)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<Role>,
}

/// The authenticated caller, resolved for a single guard: held role names
/// and the union of those roles' permission names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: EntityId,
    pub name: String,
    pub email: String,
    pub guard: Guard,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// OR semantics: true when at least one of `permissions` is held.
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Visibility rule shared by the composer and the path guard: an empty
    /// requirement is open to every authenticated caller.
    pub fn satisfies<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.is_empty() || self.has_any_permission(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(permissions: &[&str]) -> Principal {
        Principal {
            user_id: new_id(),
            name: "Editor".into(),
            email: "editor@example.com".into(),
            guard: Guard::Api,
            roles: ["editor".to_string()].into_iter().collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_user_normalizes_email() {
        let user = User::new("Admin".into(), " Admin@Example.com ".into(), "hash".into()).unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert!(user.is_active);
        assert!(User::new("Admin".into(), "not-an-email".into(), "hash".into()).is_err());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new("Admin".into(), "admin@example.com".into(), "secret-hash".into()).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_satisfies_uses_or_semantics() {
        let p = principal(&["manage-products"]);
        assert!(p.satisfies::<&str>(&[]));
        assert!(p.satisfies(&["manage-press-releases", "manage-products"]));
        assert!(!p.satisfies(&["manage-press-releases"]));
        assert!(p.has_role("editor"));
        assert!(!p.has_role("admin"));
    }
}

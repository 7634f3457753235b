// ============================================================================
// CMS Core - Route Access Requirements
// File: crates/cms-core/src/services/access.rs
// ============================================================================
//! `a|b|c` requirements attached to route groups. Every variant is satisfied
//! by holding any one listed name.

use tracing::{debug, warn};

use crate::domain::Principal;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    Permissions(Vec<String>),
    Roles(Vec<String>),
    RolesOrPermissions(Vec<String>),
}

fn split_names(expression: &str) -> Vec<String> {
    expression
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl AccessRequirement {
    pub fn permissions(expression: &str) -> Self {
        AccessRequirement::Permissions(split_names(expression))
    }

    pub fn roles(expression: &str) -> Self {
        AccessRequirement::Roles(split_names(expression))
    }

    pub fn roles_or_permissions(expression: &str) -> Self {
        AccessRequirement::RolesOrPermissions(split_names(expression))
    }

    /// Parses `permission:a|b`, `role:a|b` or `role_or_permission:a|b`.
    pub fn parse(expression: &str) -> Result<Self, DomainError> {
        let (kind, names) = expression
            .split_once(':')
            .ok_or_else(|| DomainError::InternalError(format!("Invalid access requirement: {}", expression)))?;

        let requirement = match kind.trim() {
            "permission" => Self::permissions(names),
            "role" => Self::roles(names),
            "role_or_permission" => Self::roles_or_permissions(names),
            other => {
                return Err(DomainError::InternalError(format!(
                    "Unknown access requirement kind: {}",
                    other
                )))
            }
        };

        if requirement.names().is_empty() {
            return Err(DomainError::InternalError(format!("Empty access requirement: {}", expression)));
        }
        Ok(requirement)
    }

    pub fn names(&self) -> &[String] {
        match self {
            AccessRequirement::Permissions(names)
            | AccessRequirement::Roles(names)
            | AccessRequirement::RolesOrPermissions(names) => names,
        }
    }

    pub fn is_met_by(&self, principal: &Principal) -> bool {
        match self {
            AccessRequirement::Permissions(names) => principal.has_any_permission(names.as_slice()),
            AccessRequirement::Roles(names) => names.iter().any(|r| principal.has_role(r)),
            AccessRequirement::RolesOrPermissions(names) => names
                .iter()
                .any(|n| principal.has_role(n) || principal.has_permission(n)),
        }
    }

    pub fn check(&self, principal: &Principal) -> Result<(), DomainError> {
        if self.is_met_by(principal) {
            debug!("User {} meets {:?}", principal.user_id, self);
            return Ok(());
        }

        warn!("User {} denied, requires {:?}", principal.user_id, self);
        let kind = match self {
            AccessRequirement::Permissions(_) => "permissions",
            AccessRequirement::Roles(_) => "roles",
            AccessRequirement::RolesOrPermissions(_) => "roles or permissions",
        };
        Err(DomainError::Forbidden(format!(
            "User does not have the right {}. Necessary {} is {}",
            kind,
            kind,
            self.names().join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Guard;
    use uuid::Uuid;

    fn principal(roles: &[&str], permissions: &[&str]) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            name: "User".into(),
            email: "user@example.com".into(),
            guard: Guard::Api,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            AccessRequirement::parse("permission:manage-roles|manage-users").unwrap(),
            AccessRequirement::Permissions(vec!["manage-roles".into(), "manage-users".into()])
        );
        assert_eq!(
            AccessRequirement::parse("role:admin").unwrap(),
            AccessRequirement::Roles(vec!["admin".into()])
        );
        assert!(matches!(
            AccessRequirement::parse("role_or_permission:admin|manage-users").unwrap(),
            AccessRequirement::RolesOrPermissions(_)
        ));
        assert!(AccessRequirement::parse("group:admin").is_err());
        assert!(AccessRequirement::parse("permission:").is_err());
        assert!(AccessRequirement::parse("manage-users").is_err());
    }

    #[test]
    fn test_any_listed_permission_is_enough() {
        let requirement = AccessRequirement::permissions("manage-roles|manage-users");
        assert!(requirement.check(&principal(&[], &["manage-users"])).is_ok());
        assert!(matches!(
            requirement.check(&principal(&["admin"], &["manage-products"])),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_roles_and_mixed_requirements() {
        let editor = principal(&["editor"], &["manage-content"]);
        assert!(AccessRequirement::roles("admin|editor").is_met_by(&editor));
        assert!(!AccessRequirement::roles("admin").is_met_by(&editor));
        assert!(AccessRequirement::roles_or_permissions("admin|manage-content").is_met_by(&editor));
        assert!(!AccessRequirement::roles_or_permissions("admin|manage-users").is_met_by(&editor));
    }
}

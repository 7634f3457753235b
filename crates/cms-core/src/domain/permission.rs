// ============================================================================
// CMS Core - Permission Entity
// File: crates/cms-core/src/domain/permission.rs
// Description: Named capability scoped to a guard
// ============================================================================

use std::collections::BTreeMap;

use cms_shared::constants::{PERMISSION_GROUP_DELIMITER, PERMISSION_GROUP_FALLBACK};
use cms_shared::{new_id, EntityId, Timestamps};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Guard;

/// Permission entity, unique per `(name, guard)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Permission {
    pub id: EntityId,

    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[serde(rename = "guard_name")]
    pub guard: Guard,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Permission {
    pub fn new(name: String, guard: Guard) -> Result<Self, validator::ValidationErrors> {
        let permission = Self {
            id: new_id(),
            name: name.trim().to_string(),
            guard,
            timestamps: Timestamps::now(),
        };

        permission.validate()?;
        Ok(permission)
    }

    pub fn rename(&mut self, name: String, guard: Guard) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.guard = guard;
        self.timestamps.touch();
        self.validate()
    }

    /// Display category derived from the name: the text before the first
    /// `-`, or `"other"` for names without one.
    pub fn group(&self) -> &str {
        match self.name.split_once(PERMISSION_GROUP_DELIMITER) {
            Some((prefix, _)) => prefix,
            None => PERMISSION_GROUP_FALLBACK,
        }
    }
}

/// Permission together with the names of the roles holding it.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDetail {
    #[serde(flatten)]
    pub permission: Permission,
    pub roles: Vec<String>,
}

/// Buckets permissions by [`Permission::group`], preserving input order
/// inside each bucket.
pub fn group_by_prefix(permissions: Vec<Permission>) -> BTreeMap<String, Vec<Permission>> {
    let mut grouped: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for permission in permissions {
        grouped
            .entry(permission.group().to_string())
            .or_default()
            .push(permission);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(name: &str) -> Permission {
        Permission::new(name.to_string(), Guard::Web).unwrap()
    }

    #[test]
    fn test_create_permission_trims_name() {
        let p = permission("  manage-products ");
        assert_eq!(p.name, "manage-products");
        assert_eq!(p.guard, Guard::Web);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(Permission::new("   ".to_string(), Guard::Api).is_err());
    }

    #[test]
    fn test_group_splits_on_first_delimiter() {
        assert_eq!(permission("manage-products").group(), "manage");
        assert_eq!(permission("view-form-submissions").group(), "view");
        assert_eq!(permission("dashboard").group(), "other");
    }

    #[test]
    fn test_group_by_prefix_buckets_in_order() {
        let grouped = group_by_prefix(vec![
            permission("manage-products"),
            permission("view-dashboard"),
            permission("manage-roles"),
            permission("superpower"),
        ]);

        assert_eq!(grouped.len(), 3);
        let manage: Vec<_> = grouped["manage"].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(manage, vec!["manage-products", "manage-roles"]);
        assert_eq!(grouped["view"].len(), 1);
        assert_eq!(grouped["other"][0].name, "superpower");
    }
}

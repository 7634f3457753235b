// ============================================================================
// CMS Core - Role Entity
// File: crates/cms-core/src/domain/role.rs
// Description: Named bundle of permissions per guard
// ============================================================================

use cms_shared::{new_id, EntityId, Timestamps};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Guard, Permission};

/// Role entity, unique per `(name, guard)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Role {
    pub id: EntityId,

    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[serde(rename = "guard_name")]
    pub guard: Guard,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Role {
    pub fn new(name: String, guard: Guard) -> Result<Self, validator::ValidationErrors> {
        let role = Self {
            id: new_id(),
            name: name.trim().to_string(),
            guard,
            timestamps: Timestamps::now(),
        };

        role.validate()?;
        Ok(role)
    }

    pub fn rename(&mut self, name: String) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.timestamps.touch();
        self.validate()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

// ============================================================================
// CMS Core - Module Entity
// File: crates/cms-core/src/domain/module.rs
// Description: Top-level navigation grouping
// ============================================================================

use cms_shared::{new_id, EntityId, Timestamps};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::MenuItem;

/// Module entity. `order` is the display sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Module {
    pub id: EntityId,

    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[validate(length(max = 500, message = "The description may not be greater than 500 characters."))]
    pub description: Option<String>,

    #[validate(length(max = 50, message = "The icon may not be greater than 50 characters."))]
    pub icon: Option<String>,

    #[validate(range(min = 0, message = "The order must be at least 0."))]
    pub order: i32,

    pub is_active: bool,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Module {
    pub fn new(
        name: String,
        description: Option<String>,
        icon: Option<String>,
        order: i32,
        is_active: bool,
    ) -> Result<Self, validator::ValidationErrors> {
        let module = Self {
            id: new_id(),
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            icon: icon.map(|i| i.trim().to_string()),
            order,
            is_active,
            timestamps: Timestamps::now(),
        };

        module.validate()?;
        Ok(module)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithMenuItems {
    #[serde(flatten)]
    pub module: Module,
    pub menu_items: Vec<MenuItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_module() {
        let module = Module::new(
            "Content Management".to_string(),
            Some("Manage website content".to_string()),
            Some("content_paste".to_string()),
            2,
            true,
        )
        .unwrap();
        assert_eq!(module.order, 2);
        assert!(module.is_active);
    }

    #[test]
    fn test_negative_order_is_rejected() {
        assert!(Module::new("Settings".to_string(), None, None, -1, true).is_err());
    }
}

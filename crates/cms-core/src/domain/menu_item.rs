// ============================================================================
// CMS Core - Menu Item Entity
// File: crates/cms-core/src/domain/menu_item.rs
// Description: Node of the per-module navigation tree
// ============================================================================

use cms_shared::{new_id, EntityId, Timestamps};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Permission;

/// Menu item entity. `parent_id` is a plain foreign key into the same table;
/// an item without `url` is a pure folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MenuItem {
    pub id: EntityId,
    pub module_id: EntityId,
    pub parent_id: Option<EntityId>,

    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,

    #[validate(length(max = 255, message = "The url may not be greater than 255 characters."))]
    pub url: Option<String>,

    #[validate(length(max = 50, message = "The icon may not be greater than 50 characters."))]
    pub icon: Option<String>,

    #[validate(range(min = 0, message = "The order must be at least 0."))]
    pub order: i32,

    pub is_active: bool,

    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl MenuItem {
    pub fn new(
        module_id: EntityId,
        parent_id: Option<EntityId>,
        name: String,
        url: Option<String>,
        icon: Option<String>,
        order: i32,
        is_active: bool,
    ) -> Result<Self, validator::ValidationErrors> {
        let item = Self {
            id: new_id(),
            module_id,
            parent_id,
            name: name.trim().to_string(),
            url: normalize_url(url),
            icon: icon.map(|i| i.trim().to_string()),
            order,
            is_active,
            timestamps: Timestamps::now(),
        };

        item.validate()?;
        Ok(item)
    }

    pub fn has_url(&self) -> bool {
        self.url.is_some()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Blank urls are stored as "no url".
pub fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

/// Menu item with the names of the permissions required to see it. This is
/// the record the composer and the path guard work from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemNode {
    pub item: MenuItem,
    pub permissions: Vec<String>,
}

/// Menu item with its permissions and direct children, for admin views.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemDetail {
    #[serde(flatten)]
    pub item: MenuItem,
    pub permissions: Vec<Permission>,
    pub children: Vec<MenuItem>,
}

/// Listing filter. `parent_id` wins over `top_level` when both are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemFilter {
    pub module_id: Option<EntityId>,
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub top_level: bool,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl MenuItemFilter {
    pub fn matches(&self, item: &MenuItem) -> bool {
        if let Some(module_id) = self.module_id {
            if item.module_id != module_id {
                return false;
            }
        }
        match self.parent_id {
            Some(parent_id) if item.parent_id != Some(parent_id) => return false,
            None if self.top_level && item.parent_id.is_some() => return false,
            _ => {}
        }
        if let Some(search) = &self.search {
            if !item.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(is_active) = self.is_active {
            if item.is_active != is_active {
                return false;
            }
        }
        true
    }
}

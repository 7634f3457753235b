// ============================================================================
// CMS Core - Menu Composer
// File: crates/cms-core/src/services/menu_composer.rs
// ============================================================================
//! Builds the navigation a principal is allowed to see.
//!
//! Menu items live in an arena keyed by id with a parent-id index; the walk
//! descends through that index and decides each node's inclusion only after
//! its subtree is resolved, so folders without visible children drop out.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{MenuItemNode, Module, Principal};
use crate::error::DomainError;
use crate::repositories::{MenuItemRepository, ModuleRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedModule {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "menuItems")]
    pub menu_items: Vec<ComposedMenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMenuItem {
    pub id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub children: Vec<ComposedMenuItem>,
}

/// Arena of active menu items.
#[derive(Debug, Default)]
pub struct MenuTree {
    nodes: HashMap<Uuid, MenuItemNode>,
    roots: HashMap<Uuid, Vec<Uuid>>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl MenuTree {
    /// Indexes `nodes`; inactive entries are ignored. Sibling lists are kept
    /// in ascending `order`, ties in input order.
    pub fn new(nodes: Vec<MenuItemNode>) -> Self {
        let mut tree = MenuTree::default();

        for node in nodes.into_iter().filter(|n| n.item.is_active) {
            let id = node.item.id;
            match node.item.parent_id {
                None => tree.roots.entry(node.item.module_id).or_default().push(id),
                Some(parent_id) => tree.children.entry(parent_id).or_default().push(id),
            }
            tree.nodes.insert(id, node);
        }

        let nodes = &tree.nodes;
        for siblings in tree.roots.values_mut().chain(tree.children.values_mut()) {
            siblings.sort_by_key(|id| nodes.get(id).map(|n| n.item.order).unwrap_or_default());
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Composes every module in the given order, dropping those left
    /// without a surviving top-level item.
    pub fn compose(&self, modules: &[Module], principal: &Principal) -> Vec<ComposedModule> {
        modules
            .iter()
            .filter(|module| module.is_active)
            .filter_map(|module| {
                let roots = self.roots.get(&module.id)?;
                let mut visiting = HashSet::new();
                let menu_items = self.compose_level(roots, principal, &mut visiting);
                if menu_items.is_empty() {
                    debug!("Module {} has no visible menu items", module.name);
                    return None;
                }
                Some(ComposedModule {
                    id: module.id,
                    name: module.name.clone(),
                    description: module.description.clone(),
                    icon: module.icon.clone(),
                    menu_items,
                })
            })
            .collect()
    }

    fn compose_level(
        &self,
        ids: &[Uuid],
        principal: &Principal,
        visiting: &mut HashSet<Uuid>,
    ) -> Vec<ComposedMenuItem> {
        ids.iter()
            .filter_map(|id| self.compose_node(id, principal, visiting))
            .collect()
    }

    fn compose_node(
        &self,
        id: &Uuid,
        principal: &Principal,
        visiting: &mut HashSet<Uuid>,
    ) -> Option<ComposedMenuItem> {
        let node = self.nodes.get(id)?;
        if !principal.satisfies(node.permissions.as_slice()) {
            return None;
        }
        // Stored data is not trusted to be acyclic.
        if !visiting.insert(*id) {
            return None;
        }

        let children = match self.children.get(id) {
            Some(ids) => self.compose_level(ids, principal, visiting),
            None => Vec::new(),
        };
        visiting.remove(id);

        if !node.item.has_url() && children.is_empty() {
            return None;
        }

        Some(ComposedMenuItem {
            id: node.item.id,
            name: node.item.name.clone(),
            url: node.item.url.clone(),
            icon: node.item.icon.clone(),
            children,
        })
    }
}

pub struct MenuComposer {
    modules: Arc<dyn ModuleRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
}

impl MenuComposer {
    pub fn new(modules: Arc<dyn ModuleRepository>, menu_items: Arc<dyn MenuItemRepository>) -> Self {
        Self { modules, menu_items }
    }

    pub async fn compose(&self, principal: &Principal) -> Result<Vec<ComposedModule>, DomainError> {
        let modules = self.modules.list(None, Some(true)).await?;
        let tree = MenuTree::new(self.menu_items.active_nodes().await?);
        let menu = tree.compose(&modules, principal);
        debug!(
            "Composed menu for {}: {} of {} modules, {} active items",
            principal.email,
            menu.len(),
            modules.len(),
            tree.len()
        );
        Ok(menu)
    }
}

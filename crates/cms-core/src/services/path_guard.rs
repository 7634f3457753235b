// ============================================================================
// CMS Core - Path Authorization Guard
// File: crates/cms-core/src/services/path_guard.rs
// ============================================================================
//! Request-time gate: the menu item whose url best matches the request path
//! decides whether the caller may proceed.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{MenuItemNode, Principal};
use crate::error::DomainError;
use crate::repositories::MenuItemRepository;

pub const NO_MENU_ITEM_MESSAGE: &str = "Menu item not found for this path.";
pub const FORBIDDEN_MESSAGE: &str = "Unauthorized. You do not have the necessary permissions.";
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated.";

/// `api/admin/users` and `/api/admin/users/` both become `/admin/users`.
pub fn normalize_path(path: &str, api_prefix: &str) -> String {
    let mut rest = path.trim_start_matches('/');
    let prefix = api_prefix.trim_matches('/');
    if !prefix.is_empty() {
        if rest == prefix {
            rest = "";
        } else if let Some(stripped) = rest.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
            rest = stripped;
        }
    }
    format!("/{}", rest.trim_end_matches('/'))
}

/// Urls shallower than this only govern paths they contain, so `/` or
/// `/admin` never act as a catch-all.
pub const MIN_PREFIX_SEGMENTS: usize = 2;

fn segment_count(url: &str) -> usize {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        0
    } else {
        trimmed.split('/').count()
    }
}

/// True when `url` contains `path`, or `url` (at least
/// [`MIN_PREFIX_SEGMENTS`] deep) is a whole-segment prefix of it.
pub fn governs(url: &str, path: &str) -> bool {
    if url.contains(path) {
        return true;
    }
    if segment_count(url) < MIN_PREFIX_SEGMENTS {
        return false;
    }
    match path.strip_prefix(url) {
        Some(rest) => url.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Longest match wins: the largest matched length, then the shortest url,
/// then the lowest `order`, then the id.
pub fn select_governing_item<'a>(nodes: &'a [MenuItemNode], path: &str) -> Option<&'a MenuItemNode> {
    nodes
        .iter()
        .filter_map(|node| {
            let url = node.item.url.as_deref()?;
            governs(url, path).then_some((node, url))
        })
        .min_by_key(|(node, url)| {
            (
                Reverse(url.len().min(path.len())),
                url.len(),
                node.item.order,
                node.item.id,
            )
        })
        .map(|(node, _)| node)
}

pub struct PathGuard {
    menu_items: Arc<dyn MenuItemRepository>,
    super_role: String,
    api_prefix: String,
}

impl PathGuard {
    pub fn new(menu_items: Arc<dyn MenuItemRepository>, super_role: String, api_prefix: String) -> Self {
        Self {
            menu_items,
            super_role,
            api_prefix,
        }
    }

    pub async fn authorize(&self, principal: Option<&Principal>, request_path: &str) -> Result<(), DomainError> {
        let principal = principal.ok_or_else(|| DomainError::Unauthorized(UNAUTHENTICATED_MESSAGE.into()))?;
        let path = normalize_path(request_path, &self.api_prefix);

        let nodes = self.menu_items.nodes_matching_path(&path).await?;
        let Some(node) = select_governing_item(&nodes, &path) else {
            if principal.has_role(&self.super_role) {
                debug!("No menu item governs {}, allowed for {}", path, self.super_role);
                return Ok(());
            }
            warn!("No menu item governs {} for user {}", path, principal.user_id);
            return Err(DomainError::NotFound(NO_MENU_ITEM_MESSAGE.into()));
        };

        if principal.satisfies(node.permissions.as_slice()) {
            debug!("Path {} governed by menu item {}", path, node.item.name);
            return Ok(());
        }

        warn!(
            "User {} lacks {:?} for path {}",
            principal.user_id, node.permissions, path
        );
        Err(DomainError::Forbidden(FORBIDDEN_MESSAGE.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Guard, MenuItem};
    use crate::repositories::MockMenuItemRepository;
    use uuid::Uuid;

    fn node(url: &str, order: i32, permissions: &[&str]) -> MenuItemNode {
        MenuItemNode {
            item: MenuItem::new(
                Uuid::new_v4(),
                None,
                url.trim_start_matches('/').to_string(),
                Some(url.to_string()),
                None,
                order,
                true,
            )
            .unwrap(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

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

    fn guard_over(nodes: Vec<MenuItemNode>) -> PathGuard {
        let mut repo = MockMenuItemRepository::new();
        repo.expect_nodes_matching_path().returning(move |path| {
            Ok(nodes
                .iter()
                .filter(|n| n.item.url.as_deref().is_some_and(|u| governs(u, path)))
                .cloned()
                .collect())
        });
        PathGuard::new(Arc::new(repo), "admin".into(), "api".into())
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("api/admin/users", "api"), "/admin/users");
        assert_eq!(normalize_path("/api/admin/users/", "api"), "/admin/users");
        assert_eq!(normalize_path("/admin/roles", "api"), "/admin/roles");
        assert_eq!(normalize_path("/apiary/x", "api"), "/apiary/x");
        assert_eq!(normalize_path("/api", "api"), "/");
    }

    #[test]
    fn test_governs_contains_or_segment_prefix() {
        assert!(governs("/admin/users", "/admin/users"));
        assert!(governs("/admin/users", "/admin"));
        assert!(governs("/admin/users", "/admin/users/42"));
        assert!(!governs("/admin/users", "/admin/users-archive"));
        assert!(!governs("/admin/roles", "/admin/users"));
    }

    #[test]
    fn test_shallow_urls_do_not_govern_by_prefix() {
        assert!(!governs("/", "/admin/modules"));
        assert!(!governs("/admin", "/admin/modules"));
        assert!(!governs("/admin/", "/admin/modules"));
        assert!(governs("/admin/users/", "/admin/users/7"));
        assert!(governs("/admin", "/admin"));
    }

    #[test]
    fn test_longest_match_wins() {
        let nodes = vec![node("/admin", 0, &["a"]), node("/admin/users", 5, &["b"]), node("/admin/users/roles", 0, &["c"])];
        let winner = select_governing_item(&nodes, "/admin/users").unwrap();
        assert_eq!(winner.item.url.as_deref(), Some("/admin/users"));

        let winner = select_governing_item(&nodes, "/admin/users/7").unwrap();
        assert_eq!(winner.item.url.as_deref(), Some("/admin/users"));
    }

    #[test]
    fn test_ties_fall_back_to_order() {
        let first = node("/admin/partners", 2, &[]);
        let second = node("/admin/partners", 1, &[]);
        let expected = second.item.id;
        let nodes = vec![first, second];
        assert_eq!(select_governing_item(&nodes, "/admin/partners").unwrap().item.id, expected);
    }

    #[test]
    fn test_items_without_url_never_govern() {
        let mut folder = node("/admin", 0, &[]);
        folder.item.url = None;
        assert!(select_governing_item(&[folder], "/admin").is_none());
    }

    #[tokio::test]
    async fn test_unmatched_path_for_non_admin_is_not_found() {
        let guard = guard_over(vec![node("/admin/products", 1, &["manage-products"])]);
        let err = guard
            .authorize(Some(&principal(&["editor"], &["manage-products"])), "api/admin/unknown")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == NO_MENU_ITEM_MESSAGE));
    }

    #[tokio::test]
    async fn test_root_item_is_not_a_catch_all() {
        let mut home = node("/home", 0, &[]);
        home.item.url = Some("/".into());
        let guard = guard_over(vec![home]);

        let err = guard
            .authorize(Some(&principal(&["editor"], &[])), "api/admin/modules")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == NO_MENU_ITEM_MESSAGE));

        // Nothing governs the path, so the super role still gets through.
        assert!(guard.authorize(Some(&principal(&["admin"], &[])), "api/admin/modules").await.is_ok());
    }

    #[tokio::test]
    async fn test_unmatched_path_for_admin_is_allowed() {
        let guard = guard_over(vec![]);
        assert!(guard.authorize(Some(&principal(&["admin"], &[])), "api/admin/unknown").await.is_ok());
    }

    #[tokio::test]
    async fn test_matched_item_without_held_permission_is_forbidden() {
        let guard = guard_over(vec![node("/admin/users", 1, &["manage-users"])]);
        let editor = principal(&["editor"], &["manage-products"]);
        let err = guard.authorize(Some(&editor), "api/admin/users").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let admin = principal(&["admin"], &["manage-users"]);
        assert!(guard.authorize(Some(&admin), "api/admin/users").await.is_ok());
    }

    #[tokio::test]
    async fn test_super_role_alone_does_not_bypass_a_matched_item() {
        let guard = guard_over(vec![node("/admin/users", 1, &["manage-users"])]);
        let err = guard.authorize(Some(&principal(&["admin"], &[])), "/api/admin/users").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_open_item_allows_any_principal() {
        let guard = guard_over(vec![node("/admin/dashboard", 1, &[])]);
        assert!(guard.authorize(Some(&principal(&[], &[])), "api/admin/dashboard").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthorized() {
        let guard = PathGuard::new(Arc::new(MockMenuItemRepository::new()), "admin".into(), "api".into());
        let err = guard.authorize(None, "api/admin/users").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}

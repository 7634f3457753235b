// ============================================================================
// CMS Infrastructure - PostgreSQL Menu Item Repository
// File: crates/cms-infrastructure/src/database/postgres/menu_item_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use cms_core::domain::{MenuItem, MenuItemFilter, MenuItemNode, Permission};
use cms_core::error::DomainError;
use cms_core::repositories::MenuItemRepository;
use cms_core::services::path_guard::MIN_PREFIX_SEGMENTS;

use super::rows::{MenuItemNodeRow, MenuItemRow, PermissionRow};
use super::{db_error, like_pattern};

pub struct PgMenuItemRepository {
    pool: PgPool,
}

impl PgMenuItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn replace_permissions(
        tx: &mut Transaction<'_, Postgres>,
        item_id: &Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM menu_item_permissions WHERE menu_item_id = $1")
            .bind(item_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error("clearing menu item permissions", "permission_ids"))?;

        sqlx::query(
            r#"
            INSERT INTO menu_item_permissions (menu_item_id, permission_id)
            SELECT $1, UNNEST($2::UUID[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(item_id)
        .bind(permission_ids)
        .execute(&mut **tx)
        .await
        .map_err(db_error("linking menu item permissions", "permission_ids"))?;

        debug!("Menu item {} now requires {} permissions", item_id, permission_ids.len());
        Ok(())
    }
}

fn into_nodes(rows: Vec<MenuItemNodeRow>) -> Vec<MenuItemNode> {
    rows.into_iter()
        .map(|row| MenuItemNode {
            item: row.item.into(),
            permissions: row.permissions,
        })
        .collect()
}

#[async_trait]
impl MenuItemRepository for PgMenuItemRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT id, module_id, parent_id, name, url, icon, "order", is_active, created_at, updated_at
            FROM menu_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding menu item by id", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: &MenuItemFilter) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT id, module_id, parent_id, name, url, icon, "order", is_active, created_at, updated_at
            FROM menu_items
            WHERE ($1::UUID IS NULL OR module_id = $1)
              AND CASE
                    WHEN $2::UUID IS NOT NULL THEN parent_id = $2
                    WHEN $3 THEN parent_id IS NULL
                    ELSE TRUE
                  END
              AND ($4::TEXT IS NULL OR name ILIKE $4)
              AND ($5::BOOLEAN IS NULL OR is_active = $5)
            ORDER BY "order", created_at, id
            "#,
        )
        .bind(filter.module_id)
        .bind(filter.parent_id)
        .bind(filter.top_level)
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing menu items", "name"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn children_of(&self, id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT id, module_id, parent_id, name, url, icon, "order", is_active, created_at, updated_at
            FROM menu_items
            WHERE parent_id = $1
            ORDER BY "order", created_at, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing menu item children", "name"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn permissions_of(&self, id: &Uuid) -> Result<Vec<Permission>, DomainError> {
        let rows: Vec<PermissionRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, p.guard_name, p.created_at, p.updated_at
            FROM permissions p
            JOIN menu_item_permissions mip ON mip.permission_id = p.id
            WHERE mip.menu_item_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing menu item permissions", "permission_ids"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create_with_permissions(&self, item: &MenuItem, permission_ids: &[Uuid]) -> Result<MenuItem, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting menu item transaction", "name"))?;

        let row: MenuItemRow = sqlx::query_as(
            r#"
            INSERT INTO menu_items (
                id, module_id, parent_id, name, url, icon, "order", is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, module_id, parent_id, name, url, icon, "order", is_active, created_at, updated_at
            "#,
        )
        .bind(item.id)
        .bind(item.module_id)
        .bind(item.parent_id)
        .bind(&item.name)
        .bind(&item.url)
        .bind(&item.icon)
        .bind(item.order)
        .bind(item.is_active)
        .bind(item.timestamps.created_at)
        .bind(item.timestamps.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("creating menu item", "name"))?;

        Self::replace_permissions(&mut tx, &row.id, permission_ids).await?;
        tx.commit().await.map_err(db_error("committing menu item", "name"))?;

        info!("Menu item created: {}", row.name);
        Ok(row.into())
    }

    async fn update_with_permissions(
        &self,
        item: &MenuItem,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<MenuItem, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting menu item transaction", "name"))?;

        let row: Option<MenuItemRow> = sqlx::query_as(
            r#"
            UPDATE menu_items
            SET module_id = $2, parent_id = $3, name = $4, url = $5, icon = $6,
                "order" = $7, is_active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id, module_id, parent_id, name, url, icon, "order", is_active, created_at, updated_at
            "#,
        )
        .bind(item.id)
        .bind(item.module_id)
        .bind(item.parent_id)
        .bind(&item.name)
        .bind(&item.url)
        .bind(&item.icon)
        .bind(item.order)
        .bind(item.is_active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("updating menu item", "name"))?;

        let row = row.ok_or_else(|| DomainError::not_found("Menu item"))?;

        if let Some(ids) = permission_ids {
            Self::replace_permissions(&mut tx, &row.id, &ids).await?;
        }
        tx.commit().await.map_err(db_error("committing menu item", "name"))?;

        Ok(row.into())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        // Children and permission links go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting menu item", "name"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Menu item"));
        }
        info!("Menu item deleted: {}", id);
        Ok(())
    }

    async fn active_nodes(&self) -> Result<Vec<MenuItemNode>, DomainError> {
        let rows: Vec<MenuItemNodeRow> = sqlx::query_as(
            r#"
            SELECT
                mi.id, mi.module_id, mi.parent_id, mi.name, mi.url, mi.icon,
                mi."order", mi.is_active, mi.created_at, mi.updated_at,
                COALESCE(
                    ARRAY_AGG(DISTINCT p.name::TEXT) FILTER (WHERE p.id IS NOT NULL),
                    '{}'::TEXT[]
                ) AS permissions
            FROM menu_items mi
            LEFT JOIN menu_item_permissions mip ON mip.menu_item_id = mi.id
            LEFT JOIN permissions p ON p.id = mip.permission_id
            WHERE mi.is_active = TRUE
            GROUP BY mi.id
            ORDER BY mi."order", mi.created_at, mi.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading active menu tree", "name"))?;

        Ok(into_nodes(rows))
    }

    async fn nodes_matching_path(&self, path: &str) -> Result<Vec<MenuItemNode>, DomainError> {
        let rows: Vec<MenuItemNodeRow> = sqlx::query_as(
            r#"
            SELECT
                mi.id, mi.module_id, mi.parent_id, mi.name, mi.url, mi.icon,
                mi."order", mi.is_active, mi.created_at, mi.updated_at,
                COALESCE(
                    ARRAY_AGG(DISTINCT p.name::TEXT) FILTER (WHERE p.id IS NOT NULL),
                    '{}'::TEXT[]
                ) AS permissions
            FROM menu_items mi
            LEFT JOIN menu_item_permissions mip ON mip.menu_item_id = mi.id
            LEFT JOIN permissions p ON p.id = mip.permission_id
            WHERE mi.url IS NOT NULL
              AND (
                    STRPOS(mi.url, $1) > 0
                    OR (
                        COALESCE(ARRAY_LENGTH(STRING_TO_ARRAY(BTRIM(mi.url, '/'), '/'), 1), 0) >= $2
                        AND (
                            STARTS_WITH($1, mi.url || '/')
                            OR (RIGHT(mi.url, 1) = '/' AND STARTS_WITH($1, mi.url))
                        )
                    )
                  )
            GROUP BY mi.id
            ORDER BY mi."order", mi.created_at, mi.id
            "#,
        )
        .bind(path)
        .bind(MIN_PREFIX_SEGMENTS as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("matching menu items to path", "name"))?;

        Ok(into_nodes(rows))
    }
}

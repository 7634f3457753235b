// ============================================================================
// CMS Infrastructure - PostgreSQL Permission Repository
// File: crates/cms-infrastructure/src/database/postgres/permission_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use cms_core::domain::{Guard, Permission};
use cms_core::error::DomainError;
use cms_core::repositories::PermissionRepository;

use super::rows::PermissionRow;
use super::{db_error, like_pattern};

pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Permission>, DomainError> {
        let row: Option<PermissionRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding permission by id", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str, guard: Guard) -> Result<Option<Permission>, DomainError> {
        let row: Option<PermissionRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM permissions
            WHERE name = $1 AND guard_name = $2
            "#,
        )
        .bind(name)
        .bind(guard.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding permission by name", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Permission>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<PermissionRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM permissions
            WHERE id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("finding permissions by ids", "permission_ids"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Permission>, DomainError> {
        let rows: Vec<PermissionRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM permissions
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
            ORDER BY name, guard_name
            "#,
        )
        .bind(search.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing permissions", "name"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, permission: &Permission) -> Result<Permission, DomainError> {
        let row: PermissionRow = sqlx::query_as(
            r#"
            INSERT INTO permissions (id, name, guard_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, guard_name, created_at, updated_at
            "#,
        )
        .bind(permission.id)
        .bind(&permission.name)
        .bind(permission.guard.as_str())
        .bind(permission.timestamps.created_at)
        .bind(permission.timestamps.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating permission", "name"))?;

        info!("Permission created: {} ({})", row.name, row.guard_name);
        Ok(row.into())
    }

    async fn update(&self, permission: &Permission) -> Result<Permission, DomainError> {
        let row: Option<PermissionRow> = sqlx::query_as(
            r#"
            UPDATE permissions
            SET name = $2, guard_name = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, guard_name, created_at, updated_at
            "#,
        )
        .bind(permission.id)
        .bind(&permission.name)
        .bind(permission.guard.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating permission", "name"))?;

        row.map(|r| r.into())
            .ok_or_else(|| DomainError::not_found("Permission"))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting permission", "name"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Permission"));
        }
        Ok(())
    }

    async fn role_names(&self, id: &Uuid) -> Result<Vec<String>, DomainError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN role_has_permissions rhp ON rhp.role_id = r.id
            WHERE rhp.permission_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing roles of permission", "name"))?;

        Ok(names)
    }

    async fn menu_item_names(&self, id: &Uuid) -> Result<Vec<String>, DomainError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT mi.name
            FROM menu_items mi
            JOIN menu_item_permissions mip ON mip.menu_item_id = mi.id
            WHERE mip.permission_id = $1
            ORDER BY mi.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing menu items of permission", "name"))?;

        Ok(names)
    }
}

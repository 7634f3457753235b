// ============================================================================
// CMS Infrastructure - PostgreSQL Role Repository
// File: crates/cms-infrastructure/src/database/postgres/role_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use cms_core::domain::{Guard, Permission, Role};
use cms_core::error::DomainError;
use cms_core::repositories::RoleRepository;

use super::rows::{PermissionRow, RoleRow};
use super::{db_error, like_pattern};

pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn replace_permissions(
        tx: &mut Transaction<'_, Postgres>,
        role_id: &Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM role_has_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error("clearing role permissions", "permission_ids"))?;

        sqlx::query(
            r#"
            INSERT INTO role_has_permissions (permission_id, role_id)
            SELECT UNNEST($1::UUID[]), $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(permission_ids)
        .bind(role_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("linking role permissions", "permission_ids"))?;

        debug!("Role {} now holds {} permissions", role_id, permission_ids.len());
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding role by id", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str, guard: Guard) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM roles
            WHERE name = $1 AND guard_name = $2
            "#,
        )
        .bind(name)
        .bind(guard.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding role by name", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Role>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<RoleRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM roles
            WHERE id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("finding roles by ids", "role_ids"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<Role>, DomainError> {
        let rows: Vec<RoleRow> = sqlx::query_as(
            r#"
            SELECT id, name, guard_name, created_at, updated_at
            FROM roles
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
            ORDER BY name, guard_name
            "#,
        )
        .bind(search.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing roles", "name"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn permissions_of(&self, id: &Uuid) -> Result<Vec<Permission>, DomainError> {
        let rows: Vec<PermissionRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, p.guard_name, p.created_at, p.updated_at
            FROM permissions p
            JOIN role_has_permissions rhp ON rhp.permission_id = p.id
            WHERE rhp.role_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing role permissions", "permission_ids"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create_with_permissions(&self, role: &Role, permission_ids: &[Uuid]) -> Result<Role, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting role transaction", "name"))?;

        let row: RoleRow = sqlx::query_as(
            r#"
            INSERT INTO roles (id, name, guard_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, guard_name, created_at, updated_at
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(role.guard.as_str())
        .bind(role.timestamps.created_at)
        .bind(role.timestamps.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("creating role", "name"))?;

        Self::replace_permissions(&mut tx, &row.id, permission_ids).await?;
        tx.commit().await.map_err(db_error("committing role", "name"))?;

        info!("Role created: {} ({})", row.name, row.guard_name);
        Ok(row.into())
    }

    async fn update_with_permissions(
        &self,
        role: &Role,
        permission_ids: Option<Vec<Uuid>>,
    ) -> Result<Role, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting role transaction", "name"))?;

        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            UPDATE roles
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, guard_name, created_at, updated_at
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("updating role", "name"))?;

        let row = row.ok_or_else(|| DomainError::not_found("Role"))?;

        if let Some(ids) = permission_ids {
            Self::replace_permissions(&mut tx, &row.id, &ids).await?;
        }
        tx.commit().await.map_err(db_error("committing role", "name"))?;

        Ok(row.into())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting role", "name"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Role"));
        }
        Ok(())
    }

    async fn count_users(&self, id: &Uuid) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_has_roles WHERE role_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting role users", "name"))?;

        Ok(count)
    }
}

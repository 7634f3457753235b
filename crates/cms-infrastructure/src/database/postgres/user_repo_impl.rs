// ============================================================================
// CMS Infrastructure - PostgreSQL User Repository
// File: crates/cms-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use cms_core::domain::{Guard, Role, User};
use cms_core::error::DomainError;
use cms_core::repositories::UserRepository;

use super::rows::{RoleRow, UserRow};
use super::{db_error, like_pattern};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding user by id", "email"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding user by email", "email"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1)
            ORDER BY name, email
            "#,
        )
        .bind(search.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing users", "email"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, email, password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.timestamps.created_at)
        .bind(user.timestamps.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating user", "email"))?;

        info!("User created: {}", row.email);
        Ok(row.into())
    }

    async fn roles_of(&self, id: &Uuid) -> Result<Vec<Role>, DomainError> {
        let rows: Vec<RoleRow> = sqlx::query_as(
            r#"
            SELECT r.id, r.name, r.guard_name, r.created_at, r.updated_at
            FROM roles r
            JOIN user_has_roles uhr ON uhr.role_id = r.id
            WHERE uhr.user_id = $1
            ORDER BY r.name, r.guard_name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing user roles", "role_ids"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn role_names(&self, id: &Uuid, guard: Guard) -> Result<Vec<String>, DomainError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_has_roles uhr ON uhr.role_id = r.id
            WHERE uhr.user_id = $1 AND r.guard_name = $2
            ORDER BY r.name
            "#,
        )
        .bind(id)
        .bind(guard.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing user role names", "role_ids"))?;

        Ok(names)
    }

    async fn permission_names(&self, id: &Uuid, guard: Guard) -> Result<Vec<String>, DomainError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT p.name
            FROM permissions p
            JOIN role_has_permissions rhp ON rhp.permission_id = p.id
            JOIN roles r ON r.id = rhp.role_id
            JOIN user_has_roles uhr ON uhr.role_id = r.id
            WHERE uhr.user_id = $1 AND r.guard_name = $2
            ORDER BY p.name
            "#,
        )
        .bind(id)
        .bind(guard.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("resolving user permissions", "role_ids"))?;

        Ok(names)
    }

    async fn sync_roles(&self, id: &Uuid, role_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("starting role sync", "role_ids"))?;

        sqlx::query("DELETE FROM user_has_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("clearing user roles", "role_ids"))?;

        sqlx::query(
            r#"
            INSERT INTO user_has_roles (role_id, user_id)
            SELECT UNNEST($1::UUID[]), $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_ids)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("linking user roles", "role_ids"))?;

        tx.commit().await.map_err(db_error("committing role sync", "role_ids"))?;
        info!("User {} now holds {} roles", id, role_ids.len());
        Ok(())
    }

    async fn assign_role(&self, id: &Uuid, role_id: &Uuid) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_has_roles (role_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("assigning user role", "role_ids"))?;

        Ok(())
    }

    async fn update_password(&self, id: &Uuid, password_hash: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("updating user password", "password"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("User"));
        }
        Ok(())
    }
}

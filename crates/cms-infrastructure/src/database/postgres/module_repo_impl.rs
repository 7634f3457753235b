// ============================================================================
// CMS Infrastructure - PostgreSQL Module Repository
// File: crates/cms-infrastructure/src/database/postgres/module_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use cms_core::domain::Module;
use cms_core::error::DomainError;
use cms_core::repositories::ModuleRepository;

use super::rows::ModuleRow;
use super::{db_error, like_pattern};

pub struct PgModuleRepository {
    pool: PgPool,
}

impl PgModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModuleRepository for PgModuleRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Module>, DomainError> {
        let row: Option<ModuleRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, icon, "order", is_active, created_at, updated_at
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding module by id", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Module>, DomainError> {
        let row: Option<ModuleRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, icon, "order", is_active, created_at, updated_at
            FROM modules
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding module by name", "name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, search: Option<String>, is_active: Option<bool>) -> Result<Vec<Module>, DomainError> {
        let rows: Vec<ModuleRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, icon, "order", is_active, created_at, updated_at
            FROM modules
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            ORDER BY "order", created_at, id
            "#,
        )
        .bind(search.as_deref().map(like_pattern))
        .bind(is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing modules", "name"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, module: &Module) -> Result<Module, DomainError> {
        let row: ModuleRow = sqlx::query_as(
            r#"
            INSERT INTO modules (id, name, description, icon, "order", is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, icon, "order", is_active, created_at, updated_at
            "#,
        )
        .bind(module.id)
        .bind(&module.name)
        .bind(&module.description)
        .bind(&module.icon)
        .bind(module.order)
        .bind(module.is_active)
        .bind(module.timestamps.created_at)
        .bind(module.timestamps.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating module", "name"))?;

        info!("Module created: {}", row.name);
        Ok(row.into())
    }

    async fn update(&self, module: &Module) -> Result<Module, DomainError> {
        let row: Option<ModuleRow> = sqlx::query_as(
            r#"
            UPDATE modules
            SET name = $2, description = $3, icon = $4, "order" = $5, is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, icon, "order", is_active, created_at, updated_at
            "#,
        )
        .bind(module.id)
        .bind(&module.name)
        .bind(&module.description)
        .bind(&module.icon)
        .bind(module.order)
        .bind(module.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating module", "name"))?;

        row.map(|r| r.into()).ok_or_else(|| DomainError::not_found("Module"))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting module", "name"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Module"));
        }
        Ok(())
    }

    async fn count_menu_items(&self, id: &Uuid) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE module_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting module menu items", "name"))?;

        Ok(count)
    }
}

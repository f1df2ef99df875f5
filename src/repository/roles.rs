//! Roles repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::role::{CreateRole, Role, UpdateRole},
};

#[derive(Clone)]
pub struct RolesRepository {
    pool: Pool<Postgres>,
}

impl RolesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all roles
    pub async fn list(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    /// Get role by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Role> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role with id {} not found", id)))
    }

    /// Get role by name
    pub async fn get_by_name(&self, name: &str) -> AppResult<Role> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role \"{}\" not found", name)))
    }

    /// Check if a role name is taken
    pub async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM roles WHERE LOWER(name) = LOWER($1) AND id != $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE LOWER(name) = LOWER($1))")
                .bind(name)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new role
    pub async fn create(&self, role: &CreateRole, created_by: &str) -> AppResult<Role> {
        let created = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description, created_by, modified_by)
            VALUES ($1, $2, $3, $3)
            RETURNING *
            "#,
        )
        .bind(&role.name)
        .bind(&role.description)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a role
    pub async fn update(&self, id: Uuid, role: &UpdateRole, modified_by: &str) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                modified_at = NOW(),
                modified_by = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(modified_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role with id {} not found", id)))
    }

    /// Delete a role; refused while users still reference it
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Role with id {} is assigned to {} users",
                id, in_use
            )));
        }

        let deleted = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Role with id {} not found", id)));
        }

        Ok(())
    }
}

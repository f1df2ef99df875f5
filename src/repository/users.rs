//! Users repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterUser, UpdateUser, User, UserQuery, ValidUser},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.*, r.name AS role
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Look up login data by username or email
    pub async fn get_by_identifier(&self, identifier: &str) -> AppResult<Option<ValidUser>> {
        let user = sqlx::query_as::<_, ValidUser>(
            r#"
            SELECT u.id, u.username, u.email, u.password, r.name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE (LOWER(u.username) = LOWER($1) OR LOWER(u.email) = LOWER($1))
              AND u.status != 'deactivated'
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List users with optional filters and pagination
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE 1=1");
        Self::push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT u.*, r.name AS role FROM users u LEFT JOIN roles r ON r.id = u.role_id WHERE 1=1",
        );
        Self::push_filters(&mut builder, query);
        builder.push(" ORDER BY u.username LIMIT ");
        builder.push_bind(per_page);
        builder.push(" OFFSET ");
        builder.push_bind((page - 1) * per_page);

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
        if let Some(ref name) = query.name {
            let pattern = format!("%{}%", name.to_lowercase());
            builder.push(" AND (LOWER(u.username) LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR LOWER(u.first_name) LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR LOWER(u.last_name) LIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(ref status) = query.status {
            builder.push(" AND u.status = ");
            builder.push_bind(status.clone());
        }
    }

    /// Create a user with an already-hashed password
    pub async fn create(
        &self,
        user: &RegisterUser,
        password_hash: &str,
        role_id: Uuid,
        created_by: &str,
    ) -> AppResult<User> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password, first_name, last_name,
                               address, phone_number, role_id, created_by, modified_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone_number)
        .bind(role_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a user; only provided fields change
    pub async fn update(
        &self,
        id: Uuid,
        user: &UpdateUser,
        password_hash: Option<String>,
        modified_by: &str,
    ) -> AppResult<User> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                password = COALESCE($4, password),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                address = COALESCE($7, address),
                phone_number = COALESCE($8, phone_number),
                role_id = COALESCE($9, role_id),
                status = COALESCE($10, status),
                modified_at = NOW(),
                modified_by = $11
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone_number)
        .bind(user.role_id)
        .bind(user.status)
        .bind(modified_by)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Deactivate a user account. Borrow history must survive, so user rows
    /// are never physically deleted.
    pub async fn deactivate(&self, id: Uuid, modified_by: &str) -> AppResult<()> {
        let active_borrows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE user_id = $1 AND status = 'borrowed'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active_borrows > 0 {
            return Err(AppError::Conflict(format!(
                "User with id {} still has {} open borrows",
                id, active_borrows
            )));
        }

        let updated = sqlx::query(
            "UPDATE users SET status = 'deactivated', modified_at = NOW(), modified_by = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(modified_by)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND id != $2)",
            )
            .bind(username)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }
}

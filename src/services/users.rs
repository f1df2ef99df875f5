//! User management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateUser, User, UserQuery},
    repository::Repository,
    services::auth,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List users with optional filters and pagination
    pub async fn list_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.list(query).await
    }

    /// Get user by ID
    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update a user; hashes the password when one is provided
    pub async fn update_user(
        &self,
        id: Uuid,
        user: UpdateUser,
        modified_by: &str,
    ) -> AppResult<User> {
        if let Some(ref username) = user.username {
            if self.repository.users.username_exists(username, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Username \"{}\" is already taken",
                    username
                )));
            }
        }

        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Email \"{}\" is already registered",
                    email
                )));
            }
        }

        if let Some(role_id) = user.role_id {
            // Verify the role exists before pointing the user at it
            self.repository.roles.get_by_id(role_id).await?;
        }

        let password_hash = match user.password {
            Some(ref password) => Some(auth::hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(id, &user, password_hash, modified_by)
            .await
    }

    /// Deactivate a user account
    pub async fn deactivate_user(&self, id: Uuid, modified_by: &str) -> AppResult<()> {
        self.repository.users.deactivate(id, modified_by).await
    }
}

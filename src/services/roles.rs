//! Role management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::role::{CreateRole, Role, UpdateRole},
    repository::Repository,
};

#[derive(Clone)]
pub struct RolesService {
    repository: Repository,
}

impl RolesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all roles
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.roles.list().await
    }

    /// Get role by ID
    pub async fn get_role(&self, id: Uuid) -> AppResult<Role> {
        self.repository.roles.get_by_id(id).await
    }

    /// Create a new role
    pub async fn create_role(&self, role: CreateRole, created_by: &str) -> AppResult<Role> {
        if self.repository.roles.name_exists(&role.name, None).await? {
            return Err(AppError::Conflict(format!(
                "Role \"{}\" already exists",
                role.name
            )));
        }
        self.repository.roles.create(&role, created_by).await
    }

    /// Update an existing role
    pub async fn update_role(&self, id: Uuid, role: UpdateRole, modified_by: &str) -> AppResult<Role> {
        if let Some(ref name) = role.name {
            if self.repository.roles.name_exists(name, Some(id)).await? {
                return Err(AppError::Conflict(format!("Role \"{}\" already exists", name)));
            }
        }
        self.repository.roles.update(id, &role, modified_by).await
    }

    /// Delete a role
    pub async fn delete_role(&self, id: Uuid) -> AppResult<()> {
        self.repository.roles.delete(id).await
    }
}

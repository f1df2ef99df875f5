//! Role model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Role model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Option<String>,
}

/// Create role request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRole {
    #[validate(length(min = 1, message = "Role name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

/// Update role request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRole {
    #[validate(length(min = 1, message = "Role name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Well-known role slugs used for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleSlug {
    Admin,
    Librarian,
    Member,
}

impl RoleSlug {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleSlug::Admin => "admin",
            RoleSlug::Librarian => "librarian",
            RoleSlug::Member => "member",
        }
    }

    /// Staff roles may manage the catalog and circulation
    pub fn is_staff(&self) -> bool {
        matches!(self, RoleSlug::Admin | RoleSlug::Librarian)
    }
}

impl std::fmt::Display for RoleSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoleSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(RoleSlug::Admin),
            "librarian" => Ok(RoleSlug::Librarian),
            "member" => Ok(RoleSlug::Member),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl From<&str> for RoleSlug {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or(RoleSlug::Member)
    }
}

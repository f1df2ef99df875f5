//! Role endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::role::{CreateRole, Role, UpdateRole},
};

use super::{validate_request, AuthenticatedUser};

/// List all roles
#[utoipa::path(
    get,
    path = "/roles",
    tag = "roles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All roles", body = Vec<Role>),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_roles(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Role>>> {
    claims.require_admin()?;

    let roles = state.services.roles.list_roles().await?;
    Ok(Json(roles))
}

/// Get role by ID
#[utoipa::path(
    get,
    path = "/roles/{id}",
    tag = "roles",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = Role),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Role>> {
    claims.require_admin()?;

    let role = state.services.roles.get_role(id).await?;
    Ok(Json(role))
}

/// Create a new role
#[utoipa::path(
    post,
    path = "/roles",
    tag = "roles",
    security(("bearer_auth" = [])),
    request_body = CreateRole,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 409, description = "Role already exists")
    )
)]
pub async fn create_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<Role>)> {
    claims.require_admin()?;
    validate_request(&request)?;

    let created = state
        .services
        .roles
        .create_role(request, &claims.data_modifier())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing role
#[utoipa::path(
    put,
    path = "/roles/{id}",
    tag = "roles",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already exists")
    )
)]
pub async fn update_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRole>,
) -> AppResult<Json<Role>> {
    claims.require_admin()?;
    validate_request(&request)?;

    let updated = state
        .services
        .roles
        .update_role(id, request, &claims.data_modifier())
        .await?;

    Ok(Json(updated))
}

/// Delete a role
#[utoipa::path(
    delete,
    path = "/roles/{id}",
    tag = "roles",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is still assigned to users")
    )
)]
pub async fn delete_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.roles.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

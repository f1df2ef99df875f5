//! Circulation endpoints: borrow and return

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowDetails, CreateBorrow, Penalty},
};

use super::AuthenticatedUser;

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct CreateBorrowRequest {
    /// Borrowing user
    pub user_id: Uuid,
    /// Books to borrow, at least one
    pub book_ids: Vec<Uuid>,
}

/// Borrow books for a user
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow created", body = BorrowDetails),
        (status = 400, description = "Empty book list"),
        (status = 403, description = "Borrower is penalized"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Cap exceeded, duplicate borrow or insufficient stock")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowDetails>)> {
    claims.require_staff()?;

    if request.book_ids.is_empty() {
        return Err(AppError::Validation(
            "Please provide at least one book id to borrow".to_string(),
        ));
    }

    let borrow = state
        .services
        .borrows
        .borrow_books(CreateBorrow {
            user_id: request.user_id,
            book_ids: request.book_ids,
            created_by: claims.data_modifier(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrow
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Books returned", body = BorrowDetails),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowDetails>> {
    claims.require_staff()?;

    let borrow = state.services.borrows.return_borrow(id).await?;
    Ok(Json(borrow))
}

/// Get borrow history for a user
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's borrows", body = Vec<BorrowDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    claims.require_staff()?;

    let borrows = state.services.borrows.get_user_borrows(user_id).await?;
    Ok(Json(borrows))
}

/// Get penalties accrued by a user
#[utoipa::path(
    get,
    path = "/users/{id}/penalties",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's penalties", body = Vec<Penalty>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_penalties(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<Penalty>>> {
    claims.require_staff()?;

    let penalties = state.services.borrows.get_user_penalties(user_id).await?;
    Ok(Json(penalties))
}

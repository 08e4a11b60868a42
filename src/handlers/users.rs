// src/handlers/users.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    crud::{CrudBase, CrudUpdate, Users},
    error::AppError,
    handlers::deps::{current_user, require_superuser},
    models::{
        pagination::Pagination,
        user::{ProfileUpdate, UserCreate, UserUpdate},
    },
    utils::jwt::Claims,
};

/// Returns the current user.
pub async fn read_profile(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    Ok(Json(user))
}

/// Updates the current user's names, email or password.
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = current_user(&pool, &claims).await?;
    let updated = Users
        .update(&pool, user.id, &UserUpdate::from(payload))
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(updated))
}

/// Lists users page by page.
/// Superuser only.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    require_superuser(&current_user(&pool, &claims).await?)?;

    let users = Users.get_multi(&pool, &page).await?;
    Ok(Json(users))
}

/// Creates a user with any combination of role flags.
/// Superuser only.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UserCreate>,
) -> Result<impl IntoResponse, AppError> {
    require_superuser(&current_user(&pool, &claims).await?)?;
    payload.validate()?;

    let user = Users.create(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Reads a user by ID.
/// Superuser only.
pub async fn read_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_superuser(&current_user(&pool, &claims).await?)?;

    let user = Users
        .get(&pool, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Updates user information.
/// Superuser only.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> Result<impl IntoResponse, AppError> {
    require_superuser(&current_user(&pool, &claims).await?)?;
    payload.validate()?;

    let user = Users
        .update(&pool, id, &payload)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Deletes a user by ID.
/// Superuser only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let current = current_user(&pool, &claims).await?;
    require_superuser(&current)?;

    if id == current.id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    Users
        .remove(&pool, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    tracing::info!("User {} deleted by {}", id, current.username);
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{AUTH_COOKIE_NAME, Config},
    crud::{CrudBase, Users},
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, UserCreate},
    utils::jwt::sign_jwt,
};

/// Registers a new student, or a teacher when `is_teacher` is set.
///
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = Users.create(&pool, &UserCreate::from(payload)).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// The token is returned in the body and also set as an HTTP-only cookie.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = Users
        .authenticate(&pool, &payload.username, &payload.password)
        .await?
        .ok_or(AppError::AuthError("Incorrect username or password".to_string()))?;

    let token = sign_jwt(user.id, user.role(), &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!("User {} logged in", user.username);

    let cookie = Cookie::build((AUTH_COOKIE_NAME, token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/");

    Ok((
        jar.add(cookie),
        Json(json!({
            "token": token,
            "type": "Bearer",
            "role": user.role(),
        })),
    ))
}

/// Clears the access-token cookie.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(AUTH_COOKIE_NAME).path("/")),
        StatusCode::NO_CONTENT,
    )
}

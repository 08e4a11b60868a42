// src/handlers/choice.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    crud::{Choices, CrudBase, CrudUpdate},
    error::AppError,
    handlers::deps::{
        can_manage, choice_in_question, current_user, question_in_quiz, quiz_by_index,
        require_author,
    },
    models::choice::{ChoiceCreate, CreateChoiceRequest, PublicChoice, UpdateChoiceRequest},
    utils::{html::clean_html, jwt::Claims},
};

/// Lists the choices of a question.
pub async fn list_choices(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    let reveal = can_manage(&pool, &user, &quiz).await?;

    let choices: Vec<PublicChoice> = Choices
        .get_multi_by_question(&pool, question.id)
        .await?
        .into_iter()
        .map(|choice| PublicChoice::from_choice(choice, reveal))
        .collect();

    Ok(Json(choices))
}

/// Adds a choice to a question.
/// Author or superuser only.
pub async fn create_choice(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id)): Path<(String, i64)>,
    Json(payload): Json<CreateChoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;
    payload.validate()?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;

    let choice = Choices
        .create(
            &pool,
            &ChoiceCreate {
                question_id: question.id,
                content: clean_html(&payload.content),
                is_correct: payload.is_correct,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(choice)))
}

/// Reads one choice.
pub async fn read_choice(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id, choice_id)): Path<(String, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    let reveal = can_manage(&pool, &user, &quiz).await?;

    let choice = choice_in_question(&pool, &question, choice_id).await?;
    Ok(Json(PublicChoice::from_choice(choice, reveal)))
}

/// Updates a choice.
/// Author or superuser only.
pub async fn update_choice(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id, choice_id)): Path<(String, i64, i64)>,
    Json(payload): Json<UpdateChoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;
    payload.validate()?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    let choice = choice_in_question(&pool, &question, choice_id).await?;

    let update = UpdateChoiceRequest {
        content: payload.content.as_deref().map(clean_html),
        ..payload
    };

    let choice = Choices
        .update(&pool, choice.id, &update)
        .await?
        .ok_or(AppError::NotFound("Choice not found".to_string()))?;

    Ok(Json(choice))
}

/// Deletes a choice.
/// Author or superuser only.
pub async fn delete_choice(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id, choice_id)): Path<(String, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    let choice = choice_in_question(&pool, &question, choice_id).await?;
    Choices.remove(&pool, choice.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/question.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    crud::{CrudBase, CrudUpdate, Questions},
    error::AppError,
    handlers::deps::{current_user, question_in_quiz, quiz_by_index, require_author},
    models::question::{CreateQuestionRequest, QuestionCreate, UpdateQuestionRequest},
    utils::{html::clean_html, jwt::Claims},
};

/// Lists the questions of a quiz in display order.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;

    let questions = Questions.get_multi_by_quiz(&pool, quiz.id).await?;
    Ok(Json(questions))
}

/// Adds a question to a quiz, up to its `number_of_questions`.
/// Author or superuser only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;
    payload.validate()?;

    if Questions.count_by_quiz(&pool, quiz.id).await? >= quiz.number_of_questions {
        return Err(AppError::BadRequest(format!(
            "Quiz already has {} questions",
            quiz.number_of_questions
        )));
    }

    let question = Questions
        .create(
            &pool,
            &QuestionCreate {
                quiz_id: quiz.id,
                content: clean_html(&payload.content),
                position: payload.position,
                points: payload.points,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Reads one question of a quiz.
pub async fn read_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    Ok(Json(question))
}

/// Updates a question.
/// Author or superuser only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id)): Path<(String, i64)>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;
    payload.validate()?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;

    let update = UpdateQuestionRequest {
        content: payload.content.as_deref().map(clean_html),
        ..payload
    };

    let question = Questions
        .update(&pool, question.id, &update)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Deletes a question and its choices.
/// Author or superuser only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    Questions.remove(&pool, question.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    crud::{Attempts, Choices, CrudBase, CrudUpdate, Questions, Quizzes, Users},
    error::AppError,
    handlers::deps::{can_manage, current_user, quiz_by_index, require_author, require_teacher},
    models::{
        choice::PublicChoice,
        pagination::Pagination,
        question::QuestionDetail,
        quiz::{CreateQuizRequest, QuizCreate, QuizDetail, QuizListParams, QuizScore, UpdateQuizRequest},
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Lists quizzes relevant to the caller.
///
/// * Superuser: every quiz (optionally filtered by exact name).
/// * Teacher: quizzes they authored.
/// * Student: quizzes they submitted, with their latest score.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<Pagination>,
    Query(params): Query<QuizListParams>,
) -> Result<Response, AppError> {
    let user = current_user(&pool, &claims).await?;

    let response = if Users::is_superuser(&user) {
        let quizzes = match params.name {
            Some(name) => Quizzes.get_multi_by_name(&pool, &name, &page).await?,
            None => Quizzes.get_multi(&pool, &page).await?,
        };
        Json(quizzes).into_response()
    } else if Users::is_teacher(&user) {
        Json(Quizzes.get_multi_by_author(&pool, user.id, &page).await?).into_response()
    } else {
        Json(Quizzes.get_multi_by_participant(&pool, user.id, &page).await?).into_response()
    };

    Ok(response)
}

/// Creates a quiz authored by the caller. The quiz code is generated.
/// Teacher or superuser only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    require_teacher(&user)?;
    payload.validate()?;

    let quiz = Quizzes
        .create(
            &pool,
            &QuizCreate {
                name: clean_html(&payload.name),
                description: clean_html(&payload.description),
                number_of_questions: payload.number_of_questions,
                due_date: payload.due_date,
                teacher_id: user.id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Reads a quiz by id or code, with its questions and choices.
/// Choice correctness is only shown to the author and superusers.
pub async fn read_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    let reveal = can_manage(&pool, &user, &quiz).await?;

    let mut questions = Vec::new();
    for question in Questions.get_multi_by_quiz(&pool, quiz.id).await? {
        let choices = Choices
            .get_multi_by_question(&pool, question.id)
            .await?
            .into_iter()
            .map(|choice| PublicChoice::from_choice(choice, reveal))
            .collect();
        questions.push(QuestionDetail { question, choices });
    }

    Ok(Json(QuizDetail { quiz, questions }))
}

/// Updates a quiz.
/// Author or superuser only.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;
    payload.validate()?;

    let update = UpdateQuizRequest {
        name: payload.name.as_deref().map(clean_html),
        description: payload.description.as_deref().map(clean_html),
        ..payload
    };

    let quiz = Quizzes
        .update(&pool, quiz.id, &update)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

/// Deletes a quiz with its questions, choices, attempts and answers.
/// Author or superuser only.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;

    Quizzes
        .remove(&pool, quiz.id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!("Quiz {} deleted by {}", quiz.quiz_code, user.username);
    Ok(StatusCode::NO_CONTENT)
}

/// Score of each participant's latest attempt.
/// Author or superuser only.
pub async fn read_quiz_scores(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;

    let mut scores = Vec::new();
    for attempt in Attempts.get_multi_latest_by_quiz_id(&pool, quiz.id).await? {
        let Some(participant) = Users.get(&pool, attempt.student_id).await? else {
            continue;
        };
        scores.push(QuizScore {
            id: participant.id,
            username: participant.username,
            score: Attempts.get_score(&pool, attempt.id).await?,
        });
    }

    Ok(Json(scores))
}

/// Latest attempt of every participant, with answers.
/// Author or superuser only.
pub async fn read_quiz_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    let quiz = quiz_by_index(&pool, &index).await?;
    require_author(&pool, &user, &quiz).await?;

    let results = Quizzes.get_multi_results_by_quiz_id(&pool, quiz.id).await?;
    Ok(Json(results))
}

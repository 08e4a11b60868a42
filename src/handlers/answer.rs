// src/handlers/answer.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    crud::{Answers, Attempts, Questions, Quizzes},
    error::AppError,
    handlers::deps::{current_user, question_in_quiz, quiz_by_index, require_student},
    models::{
        answer::{AnswerRequest, SubmitQuizRequest},
        attempt::{AttemptSummary, SubmitQuizResponse},
        quiz::Quiz,
    },
    utils::jwt::Claims,
};

fn ensure_open(quiz: &Quiz) -> Result<(), AppError> {
    if quiz.is_past_due(Utc::now()) {
        return Err(AppError::BadRequest("Quiz is past its due date".to_string()));
    }
    Ok(())
}

/// Checks that the question is in the quiz and the choice in the question.
async fn ensure_valid_choice(
    pool: &SqlitePool,
    quiz: &Quiz,
    question_id: i64,
    choice_id: i64,
) -> Result<(), AppError> {
    if !Quizzes.has_question(pool, quiz.id, question_id).await? {
        return Err(AppError::BadRequest(format!(
            "Question {} does not belong to this quiz",
            question_id
        )));
    }
    if !Questions.has_choice(pool, question_id, choice_id).await? {
        return Err(AppError::BadRequest(format!(
            "Choice {} does not belong to question {}",
            choice_id, question_id
        )));
    }
    Ok(())
}

/// Records the caller's choice for a question, replacing any earlier
/// unsubmitted choice.
/// Students only.
pub async fn answer_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((index, question_id)): Path<(String, i64)>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    require_student(&user)?;

    let quiz = quiz_by_index(&pool, &index).await?;
    ensure_open(&quiz)?;

    let question = question_in_quiz(&pool, &quiz, question_id).await?;
    ensure_valid_choice(&pool, &quiz, question.id, payload.choice_id).await?;

    let answer = Answers
        .upsert_pending(&pool, user.id, question.id, payload.choice_id)
        .await?;

    Ok(Json(answer))
}

/// The caller's answers in a quiz, pending and submitted.
/// Students only.
pub async fn list_answers(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    require_student(&user)?;
    let quiz = quiz_by_index(&pool, &index).await?;

    let answers = Answers
        .get_all_by_quiz_and_student_ids(&pool, quiz.id, user.id)
        .await?;

    Ok(Json(answers))
}

/// Groups the caller's pending answers into a new attempt and scores it.
///
/// * Answers in the body are validated, then stored in the same transaction
///   that creates the attempt.
/// * Fails with 400 when the quiz is past due or nothing is pending.
///
/// Students only.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
    payload: Option<Json<SubmitQuizRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    require_student(&user)?;

    let quiz = quiz_by_index(&pool, &index).await?;
    ensure_open(&quiz)?;

    let payload = payload.map(|Json(body)| body).unwrap_or_default();

    let mut answers = Vec::with_capacity(payload.answers.len());
    for (&question_id, &choice_id) in &payload.answers {
        ensure_valid_choice(&pool, &quiz, question_id, choice_id).await?;
        answers.push((question_id, choice_id));
    }

    let attempt = Attempts.submit(&pool, quiz.id, user.id, &answers).await?;
    let score = Attempts.get_score(&pool, attempt.id).await?;
    let total_questions = Questions.count_by_quiz(&pool, quiz.id).await?;

    Ok(Json(SubmitQuizResponse {
        attempt_id: attempt.id,
        score,
        total_questions,
        message: "Quiz submitted successfully".to_string(),
    }))
}

/// The caller's attempts at a quiz with their scores, oldest first.
/// Students only.
pub async fn list_attempts(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&pool, &claims).await?;
    require_student(&user)?;
    let quiz = quiz_by_index(&pool, &index).await?;

    let total_questions = Questions.count_by_quiz(&pool, quiz.id).await?;

    let mut summaries = Vec::new();
    for attempt in Attempts
        .get_multi_by_quiz_and_student(&pool, quiz.id, user.id)
        .await?
    {
        let score = Attempts.get_score(&pool, attempt.id).await?;
        summaries.push(AttemptSummary {
            attempt,
            score,
            total_questions,
        });
    }

    Ok(Json(summaries))
}

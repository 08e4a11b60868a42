// src/handlers/deps.rs

//! Lookups and permission checks shared by the route handlers.

use sqlx::SqlitePool;

use crate::{
    crud::{Choices, CrudBase, Questions, Quizzes, Users},
    error::AppError,
    models::{
        choice::Choice,
        question::Question,
        quiz::{Quiz, QuizIndex},
        user::User,
    },
    utils::jwt::Claims,
};

/// Loads the user behind the token. Role flags are read fresh from the
/// database rather than trusted from the claims.
pub async fn current_user(pool: &SqlitePool, claims: &Claims) -> Result<User, AppError> {
    let user_id = claims.user_id()?;

    Users
        .get(pool, user_id)
        .await?
        .ok_or(AppError::AuthError("User no longer exists".to_string()))
}

pub fn require_superuser(user: &User) -> Result<(), AppError> {
    if Users::is_superuser(user) {
        Ok(())
    } else {
        Err(AppError::not_enough_permissions())
    }
}

pub fn require_teacher(user: &User) -> Result<(), AppError> {
    if Users::is_superuser(user) || Users::is_teacher(user) {
        Ok(())
    } else {
        Err(AppError::not_enough_permissions())
    }
}

/// Only students answer quizzes; superusers and teachers are refused.
pub fn require_student(user: &User) -> Result<(), AppError> {
    if Users::is_student(user) && !Users::is_superuser(user) && !Users::is_teacher(user) {
        Ok(())
    } else {
        Err(AppError::not_enough_permissions())
    }
}

/// Whether the user may see answer keys and results of the quiz.
pub async fn can_manage(pool: &SqlitePool, user: &User, quiz: &Quiz) -> Result<bool, AppError> {
    if Users::is_superuser(user) {
        return Ok(true);
    }
    Quizzes.is_author(pool, user.id, quiz.id).await
}

/// Quiz author or superuser.
pub async fn require_author(pool: &SqlitePool, user: &User, quiz: &Quiz) -> Result<(), AppError> {
    if can_manage(pool, user, quiz).await? {
        Ok(())
    } else {
        Err(AppError::not_enough_permissions())
    }
}

pub async fn quiz_by_index(pool: &SqlitePool, index: &str) -> Result<Quiz, AppError> {
    Quizzes
        .get_by_index(pool, &QuizIndex::parse(index))
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Loads a question, 404 if it is missing or belongs to another quiz.
pub async fn question_in_quiz(
    pool: &SqlitePool,
    quiz: &Quiz,
    question_id: i64,
) -> Result<Question, AppError> {
    if !Quizzes.has_question(pool, quiz.id, question_id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Questions
        .get(pool, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))
}

/// Loads a choice, 404 if it is missing or belongs to another question.
pub async fn choice_in_question(
    pool: &SqlitePool,
    question: &Question,
    choice_id: i64,
) -> Result<Choice, AppError> {
    if !Questions.has_choice(pool, question.id, choice_id).await? {
        return Err(AppError::NotFound("Choice not found".to_string()));
    }

    Choices
        .get(pool, choice_id)
        .await?
        .ok_or(AppError::NotFound("Choice not found".to_string()))
}

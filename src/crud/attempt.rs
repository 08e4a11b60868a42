// src/crud/attempt.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    crud::{answer::Answers, base::CrudBase},
    error::AppError,
    models::{
        attempt::{Attempt, AttemptCreate},
        pagination::Pagination,
    },
};

const COLUMNS: &str = "id, quiz_id, student_id, created_at";

/// Data access for the 'quiz_attempts' table.
pub struct Attempts;

impl Attempts {
    /// Stores `answers` (question id, choice id) as pending, then creates an
    /// attempt and attaches the student's pending answers for the quiz to it,
    /// all in one transaction. Fails if there is nothing to submit.
    pub async fn submit(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
        student_id: i64,
        answers: &[(i64, i64)],
    ) -> Result<Attempt, AppError> {
        let mut tx = pool.begin().await?;

        for &(question_id, choice_id) in answers {
            Answers::store_pending(&mut *tx, student_id, question_id, choice_id).await?;
        }

        let pending: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM quiz_answers a
            JOIN quiz_questions q ON a.question_id = q.id
            WHERE q.quiz_id = ? AND a.student_id = ? AND a.attempt_id IS NULL
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        if pending == 0 {
            return Err(AppError::BadRequest("No answers to submit".to_string()));
        }

        let attempt = sqlx::query_as::<_, Attempt>(&format!(
            "INSERT INTO quiz_attempts (quiz_id, student_id, created_at) VALUES (?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(quiz_id)
        .bind(student_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE quiz_answers SET attempt_id = ?
            WHERE student_id = ? AND attempt_id IS NULL
              AND question_id IN (SELECT id FROM quiz_questions WHERE quiz_id = ?)
            "#,
        )
        .bind(attempt.id)
        .bind(student_id)
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Student {} submitted attempt {} for quiz {} ({} answers)",
            student_id,
            attempt.id,
            quiz_id,
            pending
        );
        Ok(attempt)
    }

    /// Number of answers in the attempt whose choice is correct.
    pub async fn get_score(&self, pool: &SqlitePool, attempt_id: i64) -> Result<i64, AppError> {
        let score = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM quiz_answers a
            JOIN quiz_choices c ON a.choice_id = c.id
            WHERE a.attempt_id = ? AND c.is_correct = 1
            "#,
        )
        .bind(attempt_id)
        .fetch_one(pool)
        .await?;

        Ok(score)
    }

    /// The latest attempt per quiz for a student, newest first.
    pub async fn get_multi_latest_by_student_id(
        &self,
        pool: &SqlitePool,
        student_id: i64,
        page: &Pagination,
    ) -> Result<Vec<Attempt>, AppError> {
        let attempts = sqlx::query_as::<_, Attempt>(&format!(
            r#"
            SELECT {COLUMNS} FROM quiz_attempts
            WHERE id IN (
                SELECT MAX(id) FROM quiz_attempts WHERE student_id = ? GROUP BY quiz_id
            )
            ORDER BY id DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(student_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(attempts)
    }

    /// The latest attempt per participant of a quiz.
    pub async fn get_multi_latest_by_quiz_id(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
    ) -> Result<Vec<Attempt>, AppError> {
        let attempts = sqlx::query_as::<_, Attempt>(&format!(
            r#"
            SELECT {COLUMNS} FROM quiz_attempts
            WHERE id IN (
                SELECT MAX(id) FROM quiz_attempts WHERE quiz_id = ? GROUP BY student_id
            )
            ORDER BY student_id
            "#
        ))
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;

        Ok(attempts)
    }

    pub async fn get_multi_by_quiz_and_student(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Vec<Attempt>, AppError> {
        let attempts = sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {COLUMNS} FROM quiz_attempts WHERE quiz_id = ? AND student_id = ? ORDER BY id"
        ))
        .bind(quiz_id)
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        Ok(attempts)
    }
}

#[async_trait]
impl CrudBase for Attempts {
    type Model = Attempt;
    type Create = AttemptCreate;

    const TABLE: &'static str = "quiz_attempts";
    const COLUMNS: &'static str = COLUMNS;

    async fn create(&self, pool: &SqlitePool, obj_in: &AttemptCreate) -> Result<Attempt, AppError> {
        let attempt = sqlx::query_as::<_, Attempt>(&format!(
            "INSERT INTO quiz_attempts (quiz_id, student_id, created_at) VALUES (?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(obj_in.quiz_id)
        .bind(obj_in.student_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(attempt)
    }
}

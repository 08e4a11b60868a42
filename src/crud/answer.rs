// src/crud/answer.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    crud::base::{CrudBase, CrudUpdate, SetClause},
    error::AppError,
    models::answer::{Answer, AnswerCreate, AnswerUpdate},
};

const COLUMNS: &str = "id, attempt_id, student_id, question_id, choice_id, created_at";

/// Data access for the 'quiz_answers' table.
pub struct Answers;

impl Answers {
    /// The student's pending answer pointing at this choice, if any.
    pub async fn get_by_choice_and_user(
        &self,
        pool: &SqlitePool,
        choice_id: i64,
        student_id: i64,
    ) -> Result<Option<Answer>, AppError> {
        let answer = sqlx::query_as::<_, Answer>(&format!(
            r#"
            SELECT {COLUMNS} FROM quiz_answers
            WHERE choice_id = ? AND student_id = ? AND attempt_id IS NULL
            "#
        ))
        .bind(choice_id)
        .bind(student_id)
        .fetch_optional(pool)
        .await?;

        Ok(answer)
    }

    /// Every answer (pending or submitted) the student gave in a quiz.
    pub async fn get_all_by_quiz_and_student_ids(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Vec<Answer>, AppError> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT a.id, a.attempt_id, a.student_id, a.question_id, a.choice_id, a.created_at
            FROM quiz_answers a
            JOIN quiz_questions q ON a.question_id = q.id
            WHERE q.quiz_id = ? AND a.student_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_all(pool)
        .await?;

        Ok(answers)
    }

    pub async fn get_all_by_attempt(
        &self,
        pool: &SqlitePool,
        attempt_id: i64,
    ) -> Result<Vec<Answer>, AppError> {
        let answers = sqlx::query_as::<_, Answer>(&format!(
            "SELECT {COLUMNS} FROM quiz_answers WHERE attempt_id = ? ORDER BY question_id"
        ))
        .bind(attempt_id)
        .fetch_all(pool)
        .await?;

        Ok(answers)
    }

    /// Stores the student's choice for a question, replacing an earlier
    /// pending answer. Submitted answers are never touched.
    pub async fn upsert_pending(
        &self,
        pool: &SqlitePool,
        student_id: i64,
        question_id: i64,
        choice_id: i64,
    ) -> Result<Answer, AppError> {
        if let Some(existing) = self.get_by_choice_and_user(pool, choice_id, student_id).await? {
            return Ok(existing);
        }

        let mut conn = pool.acquire().await?;
        Ok(Self::store_pending(&mut *conn, student_id, question_id, choice_id).await?)
    }

    /// Inserts or replaces the pending answer in one statement, so concurrent
    /// writers for the same question end with a single pending row.
    /// Takes a connection so it can run inside a caller's transaction.
    pub async fn store_pending(
        conn: &mut SqliteConnection,
        student_id: i64,
        question_id: i64,
        choice_id: i64,
    ) -> Result<Answer, sqlx::Error> {
        sqlx::query_as::<_, Answer>(&format!(
            r#"
            INSERT INTO quiz_answers (attempt_id, student_id, question_id, choice_id, created_at)
            VALUES (NULL, ?, ?, ?, ?)
            ON CONFLICT (student_id, question_id) WHERE attempt_id IS NULL
            DO UPDATE SET choice_id = excluded.choice_id
            RETURNING {COLUMNS}
            "#
        ))
        .bind(student_id)
        .bind(question_id)
        .bind(choice_id)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
    }
}

#[async_trait]
impl CrudBase for Answers {
    type Model = Answer;
    type Create = AnswerCreate;

    const TABLE: &'static str = "quiz_answers";
    const COLUMNS: &'static str = COLUMNS;

    async fn create(&self, pool: &SqlitePool, obj_in: &AnswerCreate) -> Result<Answer, AppError> {
        let answer = sqlx::query_as::<_, Answer>(&format!(
            r#"
            INSERT INTO quiz_answers (attempt_id, student_id, question_id, choice_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(obj_in.attempt_id)
        .bind(obj_in.student_id)
        .bind(obj_in.question_id)
        .bind(obj_in.choice_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(answer)
    }
}

#[async_trait]
impl CrudUpdate for Answers {
    type Update = AnswerUpdate;

    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        obj_in: &AnswerUpdate,
    ) -> Result<Option<Answer>, AppError> {
        let mut clause = SetClause::new(Self::TABLE);
        clause.set("choice_id", obj_in.choice_id);

        if clause.is_empty() {
            return self.get(pool, id).await;
        }

        Ok(clause.execute(pool, id, COLUMNS).await?)
    }
}
